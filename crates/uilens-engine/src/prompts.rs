/// Sampling settings sent with each prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f64,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub max_output_tokens: u32,
}

pub const UI_ANALYSIS_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.4,
    top_p: Some(0.95),
    top_k: Some(40),
    max_output_tokens: 8192,
};

pub const DESIGN_SYSTEM_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.3,
    top_p: None,
    top_k: None,
    max_output_tokens: 2048,
};

pub const ACCESSIBILITY_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.4,
    top_p: None,
    top_k: None,
    max_output_tokens: 3072,
};

pub const UI_ANALYSIS_PROMPT: &str = r##"You are a UI/UX and accessibility expert. Analyze this UI screenshot and provide a comprehensive analysis in JSON format with the following structure:
{
  "uiType": "type of UI (e.g., Dashboard, Landing Page, Mobile App, etc.)",
  "designSystem": "identified design system (e.g., Material Design, iOS, Fluent, Custom)",
  "strengths": ["list of 3-5 strong points about the design"],
  "weaknesses": ["list of 3-5 areas that need improvement"],
  "accessibilityIssues": ["list of potential WCAG and accessibility concerns"],
  "recommendations": ["list of 5-7 specific actionable recommendations"],
  "colorSchemeAnalysis": "brief analysis of the color scheme effectiveness",
  "layoutAnalysis": "analysis of information hierarchy and layout structure",
  "typographyAnalysis": "analysis of font choices, sizes, and readability",
  "userExperience": "overall user experience assessment",
  "targetAudienceMatch": "who this UI is best suited for",
  "overallQuality": "score from 0-100 representing overall UI quality",
  "contrastScore": "score from 0-100 representing text-to-background contrast quality (100 = excellent contrast, 0 = poor contrast)",
  "wcagComplianceScore": "score from 0-100 representing WCAG 2.1 AA compliance level (100 = fully compliant, 0 = non-compliant)",
  "colorPalette": {
    "primary": ["#hexcolor1", "#hexcolor2"],
    "secondary": ["#hexcolor1"],
    "accent": ["#hexcolor1"],
    "text": ["#hexcolor1", "#hexcolor2"],
    "background": ["#hexcolor1"]
  }
}

Focus on:
- WCAG compliance issues
- Color contrast problems (calculate contrastScore based on text/background ratios)
- Typography and readability
- Layout and hierarchy
- Interactive elements visibility
- Mobile responsiveness indicators
- Visual consistency
- User flow clarity
- Extract exact hex color codes used in the UI for the colorPalette

Scoring guidelines:
- contrastScore: 80-100 (all text passes WCAG AA), 60-79 (mostly good), 40-59 (some issues), 0-39 (major issues)
- wcagComplianceScore: Consider text size, contrast ratios, touch targets, focus indicators, ARIA attributes
- overallQuality: Holistic assessment of design quality, usability, and aesthetics

Provide specific, actionable feedback. Return ONLY valid JSON, no markdown formatting."##;

pub const DESIGN_SYSTEM_PROMPT: &str = r#"Analyze this UI and identify design systems. Return ONLY JSON array:

[{"name": "system name", "confidence": 0-100, "reasoning": "why"}]

Consider: Material Design, iOS, Fluent, Tailwind, Ant Design, Bootstrap, Custom."#;

pub const ACCESSIBILITY_PROMPT: &str = r#"WCAG accessibility analysis. Return ONLY JSON array:

["recommendation 1", "recommendation 2", ...]

Focus: contrast ratios, 16px min text, 44px touch targets, focus indicators, ARIA labels, keyboard nav."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::REQUIRED_FIELDS;

    #[test]
    fn analysis_prompt_names_every_required_field() {
        for field in REQUIRED_FIELDS {
            assert!(
                UI_ANALYSIS_PROMPT.contains(&format!("\"{field}\"")),
                "prompt is missing {field}"
            );
        }
    }
}
