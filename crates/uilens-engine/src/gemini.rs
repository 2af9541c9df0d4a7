use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::GenerativeConfig;
use crate::error::ModelCallError;
use crate::generative::{VisionModel, VisionRequest};
use crate::prompts::GenerationSettings;

const ERROR_BODY_MAX_CHARS: usize = 512;

/// `generateContent` transport for the Google Generative Language API.
pub struct GeminiModel {
    api_base: String,
    api_key: Option<String>,
    model: String,
    http: HttpClient,
}

impl GeminiModel {
    pub fn new(config: &GenerativeConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            http: HttpClient::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        let trimmed = self.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

#[async_trait]
impl VisionModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &VisionRequest<'_>) -> Result<String, ModelCallError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ModelCallError::MissingCredentials(
                "GEMINI_API_KEY or GOOGLE_API_KEY not set".to_string(),
            ));
        };
        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, bytes = request.image.len(), "sending generateContent request");

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&build_payload(request))
            .send()
            .await
            .map_err(|err| ModelCallError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ModelCallError::Transport(format!("response body read failed: {err}")))?;
        if !status.is_success() {
            return Err(ModelCallError::from_status(
                status.as_u16(),
                truncate_text(&body, ERROR_BODY_MAX_CHARS),
            ));
        }

        let payload: Value = serde_json::from_str(&body).map_err(|err| {
            ModelCallError::Transport(format!("Gemini returned invalid JSON payload: {err}"))
        })?;
        Ok(response_text(&payload))
    }
}

pub fn build_payload(request: &VisionRequest<'_>) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": request.prompt },
                {
                    "inlineData": {
                        "mimeType": request.image.mime_type(),
                        "data": request.image.to_base64(),
                    }
                },
            ],
        }],
        "generationConfig": generation_config(&request.settings),
    })
}

fn generation_config(settings: &GenerationSettings) -> Value {
    let mut config = Map::new();
    config.insert("temperature".to_string(), json!(settings.temperature));
    if let Some(top_p) = settings.top_p {
        config.insert("topP".to_string(), json!(top_p));
    }
    if let Some(top_k) = settings.top_k {
        config.insert("topK".to_string(), json!(top_k));
    }
    config.insert(
        "maxOutputTokens".to_string(),
        json!(settings.max_output_tokens),
    );
    Value::Object(config)
}

/// Concatenated text parts of the first candidate. Blocked or empty responses
/// yield an empty string, which the sanitizer rejects.
pub fn response_text(payload: &Value) -> String {
    payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_input::ImageInput;
    use crate::prompts::{DESIGN_SYSTEM_SETTINGS, UI_ANALYSIS_SETTINGS};

    fn model_for(model: &str, api_base: &str) -> GeminiModel {
        GeminiModel::new(&GenerativeConfig {
            api_base: api_base.to_string(),
            model: model.to_string(),
            ..GenerativeConfig::default()
        })
    }

    #[test]
    fn endpoint_adds_models_prefix_once() {
        assert_eq!(
            model_for("gemini-2.5-flash", "https://example.test/v1beta/").endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            model_for("models/gemini-2.5-pro", "https://example.test/v1beta").endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn payload_inlines_image_after_prompt() {
        let image = ImageInput::new(b"abc".to_vec(), "image/jpeg");
        let request = VisionRequest {
            prompt: "describe",
            image: &image,
            settings: UI_ANALYSIS_SETTINGS,
        };
        let payload = build_payload(&request);
        let parts = &payload["contents"][0]["parts"];
        assert_eq!(payload["contents"][0]["role"], json!("user"));
        assert_eq!(parts[0]["text"], json!("describe"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(parts[1]["inlineData"]["data"], json!("YWJj"));
        assert_eq!(payload["generationConfig"]["topK"], json!(40));
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], json!(8192));
    }

    #[test]
    fn optional_sampling_fields_are_omitted() {
        let config = generation_config(&DESIGN_SYSTEM_SETTINGS);
        assert!(config.get("topP").is_none());
        assert!(config.get("topK").is_none());
        assert_eq!(config["maxOutputTokens"], json!(2048));
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let payload = json!({
            "candidates": [
                {"content": {"parts": [{"text": "```json\n{"}, {"text": "\"a\": 1}\n```"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(response_text(&payload), "```json\n{\"a\": 1}\n```");
        assert_eq!(
            response_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}})),
            ""
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let image = ImageInput::new(Vec::new(), "image/png");
        let request = VisionRequest {
            prompt: "describe",
            image: &image,
            settings: UI_ANALYSIS_SETTINGS,
        };
        let err = model_for("gemini-2.5-flash", "http://127.0.0.1:9")
            .generate(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelCallError::MissingCredentials(_)));
        assert!(!err.is_retryable());
    }
}
