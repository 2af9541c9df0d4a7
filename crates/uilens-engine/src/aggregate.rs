use indexmap::IndexMap;
use uilens_contracts::findings::{CollaboratorFindings, ContrastFindings};
use uilens_contracts::reports::{
    Feasibility, OverallScore, ScoreCategory, ScoreLabel, SizingReport,
};

use crate::fallback::NEUTRAL_SCORE;
use crate::generative::GenerativeOutcome;

pub const MAX_SUGGESTIONS: usize = 12;
const MAX_CONTRAST_SUGGESTIONS: usize = 3;
const MAX_AI_SUGGESTIONS: usize = 5;

const SIZING_POSSIBLE_SCORE: u8 = 90;
const SIZING_ADJUST_SCORE: u8 = 65;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub overall_score: OverallScore,
    pub suggestions: Vec<String>,
}

pub fn aggregate(
    sizing: &SizingReport,
    findings: &CollaboratorFindings,
    generative: Option<&GenerativeOutcome>,
) -> Aggregate {
    // Only a successful analysis may stand in for a missing collaborator.
    let trusted = generative.filter(|outcome| outcome.is_ok());
    let breakdown = category_scores(sizing, findings, trusted);
    Aggregate {
        overall_score: overall_from_breakdown(breakdown),
        suggestions: collect_suggestions(sizing, findings, trusted),
    }
}

pub fn category_scores(
    sizing: &SizingReport,
    findings: &CollaboratorFindings,
    trusted: Option<&GenerativeOutcome>,
) -> IndexMap<ScoreCategory, u8> {
    let ai = trusted.map(GenerativeOutcome::report);
    ScoreCategory::ALL
        .into_iter()
        .map(|category| {
            let score = match category {
                ScoreCategory::Wcag => findings
                    .wcag
                    .as_ref()
                    .map(|wcag| wcag.level.compliance_score())
                    .or(ai.map(|report| report.wcag_compliance_score))
                    .unwrap_or(NEUTRAL_SCORE),
                ScoreCategory::Contrast => findings
                    .contrast
                    .as_ref()
                    .map(contrast_score)
                    .or(ai.map(|report| report.contrast_score))
                    .unwrap_or(NEUTRAL_SCORE),
                ScoreCategory::Typography => findings
                    .typography
                    .as_ref()
                    .map(|typography| clamp_score(typography.readability_score))
                    .unwrap_or(NEUTRAL_SCORE),
                ScoreCategory::Hierarchy => findings
                    .hierarchy
                    .as_ref()
                    .map(|hierarchy| clamp_score(hierarchy.priority_score))
                    .unwrap_or(NEUTRAL_SCORE),
                ScoreCategory::Sizing => match sizing.feasibility {
                    Feasibility::Possible => SIZING_POSSIBLE_SCORE,
                    Feasibility::NeedsAdjustments => SIZING_ADJUST_SCORE,
                },
            };
            (category, score)
        })
        .collect()
}

/// Unweighted mean of the categories, rounded half away from zero.
pub fn overall_from_breakdown(breakdown: IndexMap<ScoreCategory, u8>) -> OverallScore {
    let total: u32 = breakdown.values().map(|score| u32::from(*score)).sum();
    let count = breakdown.len().max(1) as f64;
    let score = (f64::from(total) / count).round().clamp(0.0, 100.0) as u8;
    OverallScore {
        score,
        label: ScoreLabel::for_score(score),
        breakdown,
    }
}

pub fn collect_suggestions(
    sizing: &SizingReport,
    findings: &CollaboratorFindings,
    trusted: Option<&GenerativeOutcome>,
) -> Vec<String> {
    let mut suggestions = Vec::new();
    if let Some(hierarchy) = &findings.hierarchy {
        suggestions.extend(hierarchy.suggestions.iter().cloned());
    }
    if let Some(wcag) = &findings.wcag {
        suggestions.extend(wcag.errors.iter().map(|err| format!("WCAG: {err}")));
        suggestions.extend(wcag.warnings.iter().map(|warn| format!("Warning: {warn}")));
    }
    suggestions.extend(
        sizing
            .problem_areas
            .iter()
            .map(|area| format!("Sizing: {area}")),
    );
    if let Some(contrast) = &findings.contrast {
        suggestions.extend(
            contrast
                .recommendations
                .iter()
                .take(MAX_CONTRAST_SUGGESTIONS)
                .map(|rec| format!("Improve contrast for color {}", rec.color)),
        );
    }
    if let Some(outcome) = trusted {
        suggestions.extend(
            outcome
                .report()
                .recommendations
                .iter()
                .take(MAX_AI_SUGGESTIONS)
                .cloned(),
        );
    }

    suggestions.retain(|item| !item.trim().is_empty());
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn contrast_score(contrast: &ContrastFindings) -> u8 {
    let total = contrast.light_mode.len().max(1) as f64;
    let passing = contrast.passing_pairs() as f64;
    (100.0 * passing / total).round() as u8
}

fn clamp_score(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}
