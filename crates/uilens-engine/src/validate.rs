use serde_json::{Map, Value};
use uilens_contracts::reports::{ColorPalette, DesignSystemGuess, GenerativeReport};

use crate::error::SchemaError;
use crate::fallback::NEUTRAL_SCORE;

pub const REQUIRED_FIELDS: [&str; 15] = [
    "uiType",
    "designSystem",
    "strengths",
    "weaknesses",
    "accessibilityIssues",
    "recommendations",
    "colorSchemeAnalysis",
    "layoutAnalysis",
    "typographyAnalysis",
    "userExperience",
    "targetAudienceMatch",
    "overallQuality",
    "contrastScore",
    "wcagComplianceScore",
    "colorPalette",
];

const NOT_PROVIDED: &str = "Not provided by analysis";

/// Turns a parsed model response into a [`GenerativeReport`].
///
/// Only a missing top-level key is an error. Wrong types and out-of-range
/// values are replaced with defaults.
pub fn validate(value: &Value) -> Result<GenerativeReport, SchemaError> {
    let empty = Map::new();
    let data = value.as_object().unwrap_or(&empty);
    if let Some(missing) = REQUIRED_FIELDS
        .iter()
        .find(|field| !data.contains_key(**field))
    {
        return Err(SchemaError::MissingField(*missing));
    }

    Ok(GenerativeReport {
        ui_type: text_or(data, "uiType", "Unknown"),
        design_system: text_or(data, "designSystem", "Custom"),
        strengths: string_list(data.get("strengths")),
        weaknesses: string_list(data.get("weaknesses")),
        accessibility_issues: string_list(data.get("accessibilityIssues")),
        recommendations: string_list(data.get("recommendations")),
        color_scheme_analysis: text_or(data, "colorSchemeAnalysis", NOT_PROVIDED),
        layout_analysis: text_or(data, "layoutAnalysis", NOT_PROVIDED),
        typography_analysis: text_or(data, "typographyAnalysis", NOT_PROVIDED),
        user_experience: text_or(data, "userExperience", NOT_PROVIDED),
        target_audience_match: text_or(data, "targetAudienceMatch", NOT_PROVIDED),
        overall_quality: score_or_neutral(data.get("overallQuality")),
        contrast_score: score_or_neutral(data.get("contrastScore")),
        wcag_compliance_score: score_or_neutral(data.get("wcagComplianceScore")),
        color_palette: color_palette(data.get("colorPalette")),
    })
}

/// Parses the design-system array. Entries without a name are dropped.
pub fn validate_design_systems(value: &Value) -> Result<Vec<DesignSystemGuess>, SchemaError> {
    let rows = value.as_array().ok_or(SchemaError::WrongShape {
        expected: "array",
        found: json_kind(value),
    })?;
    Ok(rows
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let name = row.get("name")?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(DesignSystemGuess {
                name: name.to_string(),
                confidence: clamped_score(row.get("confidence")),
                reasoning: row
                    .get("reasoning")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect())
}

pub fn validate_string_array(value: &Value) -> Result<Vec<String>, SchemaError> {
    if !value.is_array() {
        return Err(SchemaError::WrongShape {
            expected: "array",
            found: json_kind(value),
        });
    }
    Ok(string_list(Some(value)))
}

fn text_or(data: &Map<String, Value>, key: &str, default: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn score_or_neutral(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_f64)
        .filter(|score| (0.0..=100.0).contains(score))
        .map(|score| score.round() as u8)
        .unwrap_or(NEUTRAL_SCORE)
}

/// Numbers are clamped into [0, 100]; anything else is neutral.
fn clamped_score(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
        .map(|score| score.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(NEUTRAL_SCORE)
}

fn color_palette(value: Option<&Value>) -> ColorPalette {
    let Some(palette) = value.and_then(Value::as_object) else {
        return ColorPalette::default();
    };
    let bucket = |key: &str| string_list(palette.get(key));
    ColorPalette {
        primary: bucket("primary"),
        secondary: bucket("secondary"),
        accent: bucket("accent"),
        text: bucket("text"),
        background: bucket("background"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
