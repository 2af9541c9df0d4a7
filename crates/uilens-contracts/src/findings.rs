//! Results produced outside the pipeline (WCAG checker, contrast checker,
//! typography and hierarchy scorers) and handed to the aggregator as-is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollaboratorFindings {
    pub wcag: Option<WcagFindings>,
    pub contrast: Option<ContrastFindings>,
    pub typography: Option<TypographyFindings>,
    pub hierarchy: Option<HierarchyFindings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    A,
    Fail,
}

impl WcagLevel {
    pub fn compliance_score(self) -> u8 {
        match self {
            Self::Aaa => 100,
            Self::Aa => 85,
            Self::A | Self::Fail => 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WcagFindings {
    pub level: WcagLevel,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContrastFindings {
    pub light_mode: Vec<ContrastPair>,
    pub recommendations: Vec<ContrastRecommendation>,
}

impl ContrastFindings {
    pub fn passing_pairs(&self) -> usize {
        self.light_mode.iter().filter(|pair| pair.passes_aa).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastPair {
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub passes_aa: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastRecommendation {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyFindings {
    pub readability_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyFindings {
    pub priority_score: i64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wcag_levels_map_to_three_step_score() {
        assert_eq!(WcagLevel::Aaa.compliance_score(), 100);
        assert_eq!(WcagLevel::Aa.compliance_score(), 85);
        assert_eq!(WcagLevel::A.compliance_score(), 50);
        assert_eq!(WcagLevel::Fail.compliance_score(), 50);
    }

    #[test]
    fn partial_findings_file_deserializes() -> anyhow::Result<()> {
        let findings: CollaboratorFindings = serde_json::from_str(
            r##"{
                "wcag": {"level": "AA", "errors": ["Missing alt text"]},
                "contrast": {"lightMode": [
                    {"foreground": "#000000", "background": "#ffffff", "ratio": 21.0, "passesAa": true},
                    {"foreground": "#999999", "background": "#ffffff", "ratio": 2.8, "passesAa": false}
                ]}
            }"##,
        )?;
        let wcag = findings.wcag.as_ref().map(|wcag| wcag.level);
        assert_eq!(wcag, Some(WcagLevel::Aa));
        assert_eq!(findings.contrast.as_ref().map(|c| c.passing_pairs()), Some(1));
        assert!(findings.typography.is_none());
        assert!(findings.hierarchy.is_none());
        Ok(())
    }
}
