use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickTarget {
    pub element: String,
    pub size: i64,
    #[serde(rename = "meets44px")]
    pub meets_44px: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizeCheck {
    pub element: String,
    pub size: i64,
    pub acceptable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feasibility {
    Possible,
    #[serde(rename = "Needs Adjustments")]
    NeedsAdjustments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingReport {
    pub click_targets: Vec<ClickTarget>,
    pub font_sizes: Vec<FontSizeCheck>,
    pub padding_issues: Vec<String>,
    pub feasibility: Feasibility,
    pub problem_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusEntry {
    pub element: String,
    pub tab_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveElement {
    pub element: String,
    pub accessible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassOrWarn {
    Pass,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardReport {
    pub focus_order: Vec<FocusEntry>,
    pub focus_visibility: bool,
    pub interactive_elements: Vec<InteractiveElement>,
    pub missing_labels: Vec<String>,
    pub pass_or_warn: PassOrWarn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub accent: Vec<String>,
    pub text: Vec<String>,
    pub background: Vec<String>,
}

impl ColorPalette {
    pub fn is_empty(&self) -> bool {
        self.buckets().iter().all(|(_, colors)| colors.is_empty())
    }

    pub fn buckets(&self) -> [(&'static str, &[String]); 5] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("text", &self.text),
            ("background", &self.background),
        ]
    }
}

/// The model's structured critique. Every field is always populated; a
/// degraded analysis carries fallback text and sentinel scores instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeReport {
    pub ui_type: String,
    pub design_system: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub accessibility_issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub color_scheme_analysis: String,
    pub layout_analysis: String,
    pub typography_analysis: String,
    pub user_experience: String,
    pub target_audience_match: String,
    pub overall_quality: u8,
    pub contrast_score: u8,
    pub wcag_compliance_score: u8,
    pub color_palette: ColorPalette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerativeStatus {
    Ok,
    RateLimited,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeSection {
    pub status: GenerativeStatus,
    pub model: String,
    pub attempts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub report: GenerativeReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSystemGuess {
    pub name: String,
    pub confidence: u8,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSection {
    pub design_systems: Vec<DesignSystemGuess>,
    pub accessibility_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    Wcag,
    Contrast,
    Typography,
    Hierarchy,
    Sizing,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 5] = [
        Self::Wcag,
        Self::Contrast,
        Self::Typography,
        Self::Hierarchy,
        Self::Sizing,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreLabel {
    pub fn for_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            75..=89 => Self::Good,
            60..=74 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: u8,
    pub label: ScoreLabel,
    pub breakdown: IndexMap<ScoreCategory, u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeReport {
    pub request_id: String,
    pub image_sha256: String,
    pub mime_type: String,
    pub generated_at: String,
    pub sizing: SizingReport,
    pub keyboard: KeyboardReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative: Option<GenerativeSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<InsightsSection>,
    pub overall_score: OverallScore,
    pub suggestions: Vec<String>,
}
