//! Reports returned in place of a real analysis. Their scores are sentinels:
//! 0 means the analysis never ran (rate limited), 50 means there was not
//! enough information to judge.

use uilens_contracts::reports::{ColorPalette, DesignSystemGuess, GenerativeReport};

pub const NEUTRAL_SCORE: u8 = 50;
pub const RATE_LIMITED_SCORE: u8 = 0;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

pub fn rate_limited_report() -> GenerativeReport {
    let unavailable = "Rate limit exceeded - analysis unavailable".to_string();
    GenerativeReport {
        ui_type: "Rate Limit Exceeded".to_string(),
        design_system: "Unable to analyze".to_string(),
        strengths: strings(&["Analysis temporarily unavailable due to API rate limits"]),
        weaknesses: strings(&["Please try again in a few minutes"]),
        accessibility_issues: strings(&["API quota exceeded - unable to perform analysis"]),
        recommendations: strings(&[
            "Wait 60 seconds before analyzing another image",
            "Consider upgrading to Gemini API paid tier for higher limits",
            "Reduce analysis frequency",
            "Use batch processing with delays between requests",
            "Monitor usage at https://ai.dev/usage",
        ]),
        color_scheme_analysis: unavailable.clone(),
        layout_analysis: unavailable.clone(),
        typography_analysis: unavailable.clone(),
        user_experience: unavailable,
        target_audience_match: "Unable to determine due to rate limits".to_string(),
        overall_quality: RATE_LIMITED_SCORE,
        contrast_score: RATE_LIMITED_SCORE,
        wcag_compliance_score: RATE_LIMITED_SCORE,
        color_palette: ColorPalette::default(),
    }
}

pub fn neutral_report() -> GenerativeReport {
    let unavailable = "Unable to analyze due to processing error".to_string();
    GenerativeReport {
        ui_type: "Unknown".to_string(),
        design_system: "Custom".to_string(),
        strengths: strings(&["Modern appearance", "Functional layout"]),
        weaknesses: strings(&["AI analysis unavailable", "Manual review recommended"]),
        accessibility_issues: strings(&["Unable to perform automated analysis"]),
        recommendations: manual_audit_recommendations(),
        color_scheme_analysis: unavailable.clone(),
        layout_analysis: unavailable.clone(),
        typography_analysis: unavailable,
        user_experience: "Unable to assess due to processing error".to_string(),
        target_audience_match: "General audience - manual evaluation needed".to_string(),
        overall_quality: NEUTRAL_SCORE,
        contrast_score: NEUTRAL_SCORE,
        wcag_compliance_score: NEUTRAL_SCORE,
        color_palette: ColorPalette::default(),
    }
}

fn manual_audit_recommendations() -> Vec<String> {
    strings(&[
        "Perform manual accessibility audit",
        "Test with screen readers (NVDA, JAWS)",
        "Verify color contrast ratios manually",
        "Check keyboard navigation",
        "Validate WCAG 2.1 AA compliance",
    ])
}

pub fn design_system_fallback() -> Vec<DesignSystemGuess> {
    vec![DesignSystemGuess {
        name: "Custom".to_string(),
        confidence: NEUTRAL_SCORE,
        reasoning: "Unable to detect - rate limit or processing error".to_string(),
    }]
}

pub fn accessibility_fallback() -> Vec<String> {
    strings(&[
        "Manual WCAG 2.1 AA audit required",
        "Test with screen readers",
        "Verify 44px touch targets",
        "Check 4.5:1 contrast ratios",
        "Test keyboard navigation",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_report_zeroes_every_score() {
        let report = rate_limited_report();
        assert_eq!(report.overall_quality, 0);
        assert_eq!(report.contrast_score, 0);
        assert_eq!(report.wcag_compliance_score, 0);
        assert!(report.color_palette.is_empty());
        assert!(report.layout_analysis.contains("Rate limit exceeded"));
    }

    #[test]
    fn rate_limited_report_lists_every_recovery_step() {
        let report = rate_limited_report();
        assert_eq!(report.recommendations.len(), 5);
        assert_eq!(
            report.recommendations[1],
            "Consider upgrading to Gemini API paid tier for higher limits"
        );
        assert_eq!(
            report.recommendations.last().map(String::as_str),
            Some("Monitor usage at https://ai.dev/usage")
        );
    }

    #[test]
    fn neutral_report_uses_fifty_and_says_unavailable() {
        let report = neutral_report();
        assert_eq!(
            [report.overall_quality, report.contrast_score, report.wcag_compliance_score],
            [50, 50, 50]
        );
        assert!(report.color_palette.is_empty());
        assert!(report.weaknesses.iter().any(|item| item == "AI analysis unavailable"));
        assert_ne!(report, rate_limited_report());
    }
}
