use std::time::Duration;

use thiserror::Error;

/// Failure of a single model invocation. Whether it is worth another attempt
/// is decided by [`ModelCallError::is_retryable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelCallError {
    #[error("model transport failed: {0}")]
    Transport(String),
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("model unavailable ({status}): {body}")]
    Unavailable { status: u16, body: String },
    #[error("model rate limited (429): {0}")]
    RateLimited(String),
    #[error("model rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("model credentials missing: {0}")]
    MissingCredentials(String),
}

impl ModelCallError {
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            429 => Self::RateLimited(body),
            500..=599 => Self::Unavailable { status, body },
            _ => Self::Rejected { status, body },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::Unavailable { .. } | Self::RateLimited(_)
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited(_) => Some(429),
            Self::Unavailable { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("empty response from model")]
    Empty,
    #[error("no JSON object or array found in response: {preview}")]
    NoJsonSpan { preview: String },
    #[error("invalid JSON structure: {message}")]
    Unparseable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("expected a JSON {expected}, found {found}")]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Everything that can go wrong between "send the image" and "have a
/// validated report". None of these escape the generative client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerativeError {
    #[error(transparent)]
    Call(#[from] ModelCallError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("generative analysis is not configured")]
    NotConfigured,
}

impl GenerativeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Call(err) if err.is_rate_limited())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeuristicInputError {
    #[error("region {index} ({element:?}) has a non-finite coordinate")]
    NonFinite { index: usize, element: String },
    #[error("region {index} ({element:?}) has an inverted bounding box")]
    Inverted { index: usize, element: String },
    #[error("region {index} has a blank element label")]
    BlankLabel { index: usize },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed region data: {0}")]
    HeuristicInput(#[from] HeuristicInputError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_call_error_kinds() {
        assert!(ModelCallError::from_status(429, "quota").is_rate_limited());
        assert_eq!(
            ModelCallError::from_status(503, "overloaded"),
            ModelCallError::Unavailable {
                status: 503,
                body: "overloaded".to_string()
            }
        );
        assert_eq!(
            ModelCallError::from_status(401, "bad key").status(),
            Some(401)
        );
    }

    #[test]
    fn only_transient_kinds_are_retryable() {
        assert!(ModelCallError::Transport("reset".to_string()).is_retryable());
        assert!(ModelCallError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ModelCallError::from_status(500, "").is_retryable());
        assert!(ModelCallError::from_status(429, "").is_retryable());
        assert!(!ModelCallError::from_status(400, "").is_retryable());
        assert!(!ModelCallError::MissingCredentials("GEMINI_API_KEY".to_string()).is_retryable());
    }

    #[test]
    fn rate_limit_is_visible_through_generative_error() {
        let err = GenerativeError::from(ModelCallError::from_status(429, "slow down"));
        assert!(err.is_rate_limited());
        assert!(!GenerativeError::from(ExtractionError::Empty).is_rate_limited());
    }
}
