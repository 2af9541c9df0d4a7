use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};
use uilens_contracts::reports::{
    DesignSystemGuess, GenerativeReport, GenerativeSection, GenerativeStatus,
};

use crate::config::{GenerativeConfig, RetryPolicy};
use crate::error::{GenerativeError, ModelCallError};
use crate::fallback::{
    accessibility_fallback, design_system_fallback, neutral_report, rate_limited_report,
};
use crate::gemini::GeminiModel;
use crate::image_input::ImageInput;
use crate::prompts::{
    GenerationSettings, ACCESSIBILITY_PROMPT, ACCESSIBILITY_SETTINGS, DESIGN_SYSTEM_PROMPT,
    DESIGN_SYSTEM_SETTINGS, UI_ANALYSIS_PROMPT, UI_ANALYSIS_SETTINGS,
};
use crate::sanitize::extract_value;
use crate::validate::{validate, validate_design_systems, validate_string_array};

pub struct VisionRequest<'a> {
    pub prompt: &'a str,
    pub image: &'a ImageInput,
    pub settings: GenerationSettings,
}

/// A multimodal model that answers a prompt about one image with raw text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, request: &VisionRequest<'_>) -> Result<String, ModelCallError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerativeOutcome {
    Ok(GenerativeReport),
    RateLimited(GenerativeReport),
    Degraded {
        report: GenerativeReport,
        reason: String,
    },
}

impl GenerativeOutcome {
    pub fn from_error(err: &GenerativeError) -> Self {
        if err.is_rate_limited() {
            Self::RateLimited(rate_limited_report())
        } else {
            Self::Degraded {
                report: neutral_report(),
                reason: err.to_string(),
            }
        }
    }

    pub fn report(&self) -> &GenerativeReport {
        match self {
            Self::Ok(report) | Self::RateLimited(report) => report,
            Self::Degraded { report, .. } => report,
        }
    }

    pub fn status(&self) -> GenerativeStatus {
        match self {
            Self::Ok(_) => GenerativeStatus::Ok,
            Self::RateLimited(_) => GenerativeStatus::RateLimited,
            Self::Degraded { .. } => GenerativeStatus::Degraded,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::RateLimited(_) => Some("rate limited"),
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Outcome plus the attempt telemetry that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerativeAnalysis {
    pub outcome: GenerativeOutcome,
    pub model: String,
    pub attempts: usize,
    pub waits: Vec<Duration>,
}

impl GenerativeAnalysis {
    pub fn not_configured() -> Self {
        Self {
            outcome: GenerativeOutcome::from_error(&GenerativeError::NotConfigured),
            model: "none".to_string(),
            attempts: 0,
            waits: Vec::new(),
        }
    }

    pub fn to_section(&self) -> GenerativeSection {
        GenerativeSection {
            status: self.outcome.status(),
            model: self.model.clone(),
            attempts: self.attempts,
            reason: self.outcome.reason().map(str::to_string),
            report: self.outcome.report().clone(),
        }
    }
}

struct CallTrace {
    result: Result<String, ModelCallError>,
    attempts: usize,
    waits: Vec<Duration>,
}

/// Guarded access to a [`VisionModel`]. Every public method is infallible:
/// failures come back as fallback data.
#[derive(Clone)]
pub struct GenerativeClient {
    model: Arc<dyn VisionModel>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl GenerativeClient {
    pub fn new(config: &GenerativeConfig) -> Self {
        Self::with_model(
            Arc::new(GeminiModel::new(config)),
            config.retry,
            config.request_timeout,
        )
    }

    pub fn with_model(
        model: Arc<dyn VisionModel>,
        retry: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            model,
            retry,
            call_timeout,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn analyze(&self, image: &ImageInput) -> GenerativeAnalysis {
        let request = VisionRequest {
            prompt: UI_ANALYSIS_PROMPT,
            image,
            settings: UI_ANALYSIS_SETTINGS,
        };
        let trace = self.call_with_retries(&request).await;
        let parsed = trace
            .result
            .map_err(GenerativeError::from)
            .and_then(|text| parse_report(&text));
        let outcome = match parsed {
            Ok(report) => {
                info!(model = %self.model_name(), attempts = trace.attempts, "generative analysis succeeded");
                GenerativeOutcome::Ok(report)
            }
            Err(err) => {
                error!(model = %self.model_name(), attempts = trace.attempts, error = %err, "generative analysis failed; using fallback report");
                GenerativeOutcome::from_error(&err)
            }
        };
        GenerativeAnalysis {
            outcome,
            model: self.model_name().to_string(),
            attempts: trace.attempts,
            waits: trace.waits,
        }
    }

    pub async fn recommend_design_systems(&self, image: &ImageInput) -> Vec<DesignSystemGuess> {
        let request = VisionRequest {
            prompt: DESIGN_SYSTEM_PROMPT,
            image,
            settings: DESIGN_SYSTEM_SETTINGS,
        };
        let trace = self.call_with_retries(&request).await;
        let parsed = trace.result.map_err(GenerativeError::from).and_then(|text| {
            let value = extract_value(&text)?;
            Ok(validate_design_systems(&value)?)
        });
        parsed.unwrap_or_else(|err| {
            error!(error = %err, "design system detection failed; using fallback");
            design_system_fallback()
        })
    }

    pub async fn recommend_accessibility(&self, image: &ImageInput) -> Vec<String> {
        let request = VisionRequest {
            prompt: ACCESSIBILITY_PROMPT,
            image,
            settings: ACCESSIBILITY_SETTINGS,
        };
        let trace = self.call_with_retries(&request).await;
        let parsed = trace.result.map_err(GenerativeError::from).and_then(|text| {
            let value = extract_value(&text)?;
            Ok(validate_string_array(&value)?)
        });
        parsed.unwrap_or_else(|err| {
            error!(error = %err, "accessibility recommendations failed; using fallback");
            accessibility_fallback()
        })
    }

    async fn call_with_retries(&self, request: &VisionRequest<'_>) -> CallTrace {
        let mut waits = Vec::new();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = match timeout(self.call_timeout, self.model.generate(request)).await {
                Ok(result) => result,
                Err(_) => Err(ModelCallError::Timeout(self.call_timeout)),
            };
            match result {
                Err(err) if err.is_retryable() && attempts < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempts - 1);
                    warn!(
                        attempt = attempts,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "model call failed; retrying"
                    );
                    waits.push(delay);
                    sleep(delay).await;
                }
                result => {
                    return CallTrace {
                        result,
                        attempts,
                        waits,
                    }
                }
            }
        }
    }
}

fn parse_report(text: &str) -> Result<GenerativeReport, GenerativeError> {
    let value = extract_value(text)?;
    Ok(validate(&value)?)
}
