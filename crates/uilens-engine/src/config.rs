use std::env;
use std::time::Duration;

use uilens_contracts::models::DEFAULT_VISION_MODEL;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sequential retry schedule: the wait after failed attempt `i` (0-based) is
/// `initial_delay * 2^i`. No jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn delay_after(&self, failed_attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(failed_attempt as u32).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }

    /// Upper bound on wall time for one guarded call sequence.
    pub fn worst_case(&self, call_timeout: Duration) -> Duration {
        (0..self.max_attempts).fold(Duration::ZERO, |total, attempt| {
            let backoff = if attempt + 1 < self.max_attempts {
                self.delay_after(attempt)
            } else {
                Duration::ZERO
            };
            total.saturating_add(call_timeout).saturating_add(backoff)
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

/// Process-wide settings for the generative branch. Built once at startup and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerativeConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl GenerativeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY"));
        let api_base = non_empty("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let model = non_empty("UILENS_MODEL").unwrap_or(defaults.model);
        let max_attempts = clamped_u64(
            non_empty("UILENS_RETRY_ATTEMPTS"),
            defaults.retry.max_attempts as u64,
            1,
            6,
        );
        let initial_delay_ms = clamped_u64(
            non_empty("UILENS_RETRY_INITIAL_DELAY_MS"),
            defaults.retry.initial_delay.as_millis() as u64,
            50,
            30_000,
        );
        let timeout_s = clamped_u64(
            non_empty("UILENS_REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout.as_secs(),
            5,
            300,
        );

        Self {
            api_key,
            api_base,
            model,
            retry: RetryPolicy::new(
                max_attempts as usize,
                Duration::from_millis(initial_delay_ms),
            ),
            request_timeout: Duration::from_secs(timeout_s),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

fn clamped_u64(raw: Option<String>, default: u64, min: u64, max: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .map(|value| value.clamp(min, max))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn backoff_doubles_from_initial_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        assert_eq!(policy.delay_after(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(4000));
    }

    #[test]
    fn worst_case_counts_timeouts_and_inner_backoffs() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(
            policy.worst_case(Duration::from_secs(10)),
            Duration::from_secs(30 + 1 + 2)
        );
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = GenerativeConfig::from_lookup(|_| None);
        assert_eq!(config, GenerativeConfig::default());
        assert!(!config.has_credentials());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_delay, Duration::from_millis(2000));
    }

    #[test]
    fn environment_values_are_trimmed_and_clamped() {
        let config = GenerativeConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "  "),
            ("GOOGLE_API_KEY", "google-key"),
            ("GEMINI_API_BASE", "https://proxy.local/v1beta/"),
            ("UILENS_RETRY_ATTEMPTS", "12"),
            ("UILENS_RETRY_INITIAL_DELAY_MS", "5"),
            ("UILENS_REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("google-key"));
        assert_eq!(config.api_base, "https://proxy.local/v1beta");
        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.retry.initial_delay, Duration::from_millis(50));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }
}
