//! Runtime configuration for the admission core, read from `WORKLENS_*`
//! environment variables with normalized overrides. Configuration values are
//! public; do not store secrets here.

use std::env;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://api.worklens.dev";
/// Bound applied to the refresh call and to the whole onboarding check so a
/// hung lookup can never leave the UI loading forever.
const DEFAULT_CHECK_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub check_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            check_timeout: Duration::from_millis(DEFAULT_CHECK_TIMEOUT_MS),
        }
    }
}

impl AppConfig {
    /// Load config from the environment, falling back to defaults for
    /// missing, empty, or unparsable values.
    #[must_use]
    pub fn load() -> Self {
        let api_base_url = env_value("WORKLENS_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let check_timeout = env_value("WORKLENS_CHECK_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .map_or(
                Duration::from_millis(DEFAULT_CHECK_TIMEOUT_MS),
                Duration::from_millis,
            );

        Self {
            api_base_url,
            check_timeout,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| normalize_value(&value))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
