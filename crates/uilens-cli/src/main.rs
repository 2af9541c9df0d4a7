use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uilens_contracts::events::EventWriter;
use uilens_contracts::findings::CollaboratorFindings;
use uilens_contracts::models::{ModelSelector, DEFAULT_VISION_MODEL};
use uilens_contracts::regions::Region;
use uilens_engine::{
    AnalysisOptions, GenerativeClient, GenerativeConfig, ImageInput, NoRegions, RegionDetector,
    ReportAssembler, StaticRegions, VISION_CAPABILITY,
};

const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "uilens", version, about = "Accessibility and design analysis for UI screenshots")]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    /// List the registered vision models.
    Models,
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    #[arg(long)]
    image: PathBuf,
    /// Skip the generative model and report heuristics only.
    #[arg(long)]
    no_ai: bool,
    /// Also ask the model for design-system and accessibility insights.
    #[arg(long)]
    insights: bool,
    /// JSON array of `{element, bbox: {x0, y0, x1, y1}}` regions.
    #[arg(long)]
    regions: Option<PathBuf>,
    /// JSON object with wcag/contrast/typography/hierarchy findings.
    #[arg(long)]
    findings: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    events: Option<PathBuf>,
    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("uilens error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;
    match cli.command {
        Command::Analyze(args) => run_analyze(args).await,
        Command::Models => {
            print_models();
            Ok(0)
        }
    }
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter '{default_filter}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run_analyze(args: AnalyzeArgs) -> Result<i32> {
    let bytes = fs::read(&args.image)
        .with_context(|| format!("failed to read image {}", args.image.display()))?;
    let image = ImageInput::from_bytes_sniffed(bytes);

    let detector: Arc<dyn RegionDetector> = match &args.regions {
        Some(path) => Arc::new(StaticRegions(load_regions(path)?)),
        None => Arc::new(NoRegions),
    };
    let findings = match &args.findings {
        Some(path) => load_findings(path)?,
        None => CollaboratorFindings::default(),
    };

    let generative = if args.no_ai {
        None
    } else {
        let config = resolve_config(GenerativeConfig::from_env(), args.model.as_deref())?;
        if !config.has_credentials() {
            warn!("no Gemini API key configured; generative analysis will use the neutral fallback");
        }
        info!(
            model = %config.model,
            attempts = config.retry.max_attempts,
            worst_case_ms = config.retry.worst_case(config.request_timeout).as_millis() as u64,
            "generative analysis configured"
        );
        Some(GenerativeClient::new(&config))
    };

    let mut assembler = ReportAssembler::new(detector, generative);
    if let Some(path) = &args.events {
        assembler = assembler.with_events(EventWriter::new(path, ""));
    }
    let options = AnalysisOptions {
        use_generative: !args.no_ai,
        extended_insights: args.insights,
        findings,
    };

    let report = tokio::select! {
        result = assembler.analyze(&image, &options) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; analysis cancelled");
            return Ok(EXIT_INTERRUPTED);
        }
    };

    let rendered = serde_json::to_string_pretty(&report)?;
    match &args.out {
        Some(path) => {
            write_output(path, &rendered)?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}

/// Applies `--model` on top of the environment, falling back to the
/// registry default when the requested model cannot read images.
fn resolve_config(mut config: GenerativeConfig, requested: Option<&str>) -> Result<GenerativeConfig> {
    let requested = requested.or(Some(config.model.as_str())).map(str::to_string);
    let selection = ModelSelector::new(None)
        .select(requested.as_deref(), VISION_CAPABILITY)
        .map_err(anyhow::Error::msg)?;
    if let Some(reason) = &selection.fallback_reason {
        warn!(model = %selection.model.name, "{reason}");
    }
    config.model = selection.model.name;
    Ok(config)
}

fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read regions {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid regions JSON in {}", path.display()))
}

fn load_findings(path: &Path) -> Result<CollaboratorFindings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read findings {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid findings JSON in {}", path.display()))
}

fn write_output(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{rendered}\n"))
        .with_context(|| format!("failed to write report {}", path.display()))
}

fn print_models() {
    let selector = ModelSelector::new(None);
    for model in selector.registry.by_capability(VISION_CAPABILITY) {
        let marker = if model.name == DEFAULT_VISION_MODEL { "*" } else { " " };
        println!(
            "{marker} {:<24} {:<8} max_output_tokens={}",
            model.name, model.provider, model.max_output_tokens
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_analyze_flags() {
        let cli = Cli::parse_from([
            "uilens",
            "analyze",
            "--image",
            "shot.png",
            "--no-ai",
            "--insights",
            "--out",
            "report.json",
            "--log",
            "debug",
        ]);
        assert_eq!(cli.log, "debug");
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.image, PathBuf::from("shot.png"));
                assert!(args.no_ai);
                assert!(args.insights);
                assert_eq!(args.out, Some(PathBuf::from("report.json")));
                assert!(args.model.is_none());
            }
            Command::Models => panic!("expected analyze"),
        }
    }

    #[test]
    fn unknown_model_falls_back_to_default() -> Result<()> {
        let config = resolve_config(GenerativeConfig::default(), Some("gpt-image-1"))?;
        assert_eq!(config.model, DEFAULT_VISION_MODEL);

        let config = resolve_config(GenerativeConfig::default(), Some("models/gemini-2.5-pro"))?;
        assert_eq!(config.model, "gemini-2.5-pro");
        Ok(())
    }

    #[test]
    fn region_and_findings_files_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let regions_path = temp.path().join("regions.json");
        fs::write(
            &regions_path,
            r#"[{"element": "Buy", "bbox": {"x0": 0, "y0": 0, "x1": 120, "y1": 48}}]"#,
        )?;
        let regions = load_regions(&regions_path)?;
        assert_eq!(regions[0].element, "Buy");
        assert_eq!(regions[0].bbox.height(), 48.0);

        let findings_path = temp.path().join("findings.json");
        fs::write(&findings_path, r#"{"typography": {"readabilityScore": 72}}"#)?;
        let findings = load_findings(&findings_path)?;
        assert_eq!(findings.typography.map(|t| t.readability_score), Some(72));
        assert!(findings.wcag.is_none());

        fs::write(&findings_path, "not json")?;
        assert!(load_findings(&findings_path).is_err());
        Ok(())
    }

    #[test]
    fn output_creates_parent_directories() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested/out/report.json");
        write_output(&path, "{}")?;
        assert_eq!(fs::read_to_string(&path)?, "{}\n");
        Ok(())
    }
}
