use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};
use uilens_contracts::events::{EventPayload, EventWriter};
use uilens_contracts::findings::CollaboratorFindings;
use uilens_contracts::reports::{CompositeReport, InsightsSection};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::detector::RegionDetector;
use crate::error::AnalysisError;
use crate::fallback::{accessibility_fallback, design_system_fallback};
use crate::generative::{GenerativeAnalysis, GenerativeClient};
use crate::heuristics::{analyze_keyboard, analyze_sizing};
use crate::image_input::ImageInput;

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub use_generative: bool,
    pub extended_insights: bool,
    pub findings: CollaboratorFindings,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            use_generative: true,
            extended_insights: false,
            findings: CollaboratorFindings::default(),
        }
    }
}

/// Runs one screenshot through heuristics, the optional generative branch and
/// the aggregator. Holds no per-request state; one assembler serves any
/// number of sequential or concurrent requests.
pub struct ReportAssembler {
    detector: Arc<dyn RegionDetector>,
    generative: Option<GenerativeClient>,
    events: EventWriter,
}

impl ReportAssembler {
    pub fn new(detector: Arc<dyn RegionDetector>, generative: Option<GenerativeClient>) -> Self {
        Self {
            detector,
            generative,
            events: EventWriter::disabled(""),
        }
    }

    pub fn with_events(mut self, events: EventWriter) -> Self {
        self.events = events;
        self
    }

    pub async fn analyze(
        &self,
        image: &ImageInput,
        options: &AnalysisOptions,
    ) -> Result<CompositeReport, AnalysisError> {
        let request_id = Uuid::new_v4().to_string();
        let events = self.events.for_request(request_id.clone());
        emit(
            &events,
            "analysis_started",
            json!({
                "bytes": image.len(),
                "mime_type": image.mime_type(),
                "use_generative": options.use_generative,
                "extended_insights": options.extended_insights,
            }),
        );

        let regions = self.detector.detect(image);
        let sizing = analyze_sizing(&regions)?;
        let keyboard = analyze_keyboard(&regions)?;
        info!(
            request_id = %request_id,
            regions = regions.len(),
            problem_areas = sizing.problem_areas.len(),
            "heuristics completed"
        );
        emit(
            &events,
            "heuristics_completed",
            json!({
                "regions": regions.len(),
                "feasibility": sizing.feasibility,
                "problem_areas": sizing.problem_areas.len(),
                "pass_or_warn": keyboard.pass_or_warn,
            }),
        );

        let generative = if options.use_generative {
            let analysis = match &self.generative {
                Some(client) => client.analyze(image).await,
                None => GenerativeAnalysis::not_configured(),
            };
            record_generative(&events, &analysis);
            Some(analysis)
        } else {
            None
        };

        let insights = if options.use_generative && options.extended_insights {
            Some(self.insights(image).await)
        } else {
            None
        };

        let scored = aggregate(
            &sizing,
            &options.findings,
            generative.as_ref().map(|analysis| &analysis.outcome),
        );
        info!(
            request_id = %request_id,
            score = scored.overall_score.score,
            label = ?scored.overall_score.label,
            "analysis completed"
        );
        emit(
            &events,
            "analysis_completed",
            json!({
                "score": scored.overall_score.score,
                "label": scored.overall_score.label,
                "suggestions": scored.suggestions.len(),
            }),
        );

        Ok(CompositeReport {
            request_id,
            image_sha256: image.sha256(),
            mime_type: image.mime_type().to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            sizing,
            keyboard,
            generative: generative.as_ref().map(GenerativeAnalysis::to_section),
            insights,
            overall_score: scored.overall_score,
            suggestions: scored.suggestions,
        })
    }

    async fn insights(&self, image: &ImageInput) -> InsightsSection {
        let Some(client) = &self.generative else {
            return InsightsSection {
                design_systems: design_system_fallback(),
                accessibility_recommendations: accessibility_fallback(),
            };
        };
        let (design_systems, accessibility_recommendations) = tokio::join!(
            client.recommend_design_systems(image),
            client.recommend_accessibility(image),
        );
        InsightsSection {
            design_systems,
            accessibility_recommendations,
        }
    }
}

fn record_generative(events: &EventWriter, analysis: &GenerativeAnalysis) {
    for (index, wait) in analysis.waits.iter().enumerate() {
        emit(
            events,
            "generative_retry",
            json!({
                "model": analysis.model,
                "attempt": index + 1,
                "delay_ms": wait.as_millis() as u64,
            }),
        );
    }
    if !analysis.outcome.is_ok() {
        emit(
            events,
            "generative_fallback",
            json!({
                "model": analysis.model,
                "status": analysis.outcome.status(),
                "attempts": analysis.attempts,
                "reason": analysis.outcome.reason(),
            }),
        );
    }
}

/// Event sinks are best effort: a failed write is logged, never surfaced.
fn emit(events: &EventWriter, event_type: &str, payload: Value) {
    if let Err(err) = events.emit(event_type, map_object(payload)) {
        warn!(event_type, error = %err, "failed to write pipeline event");
    }
}

fn map_object(value: Value) -> EventPayload {
    match value {
        Value::Object(map) => map,
        _ => EventPayload::new(),
    }
}
