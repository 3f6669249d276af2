use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
/// `MEALS_API_URL` value that selects the in-process backend.
pub const MEMORY_BACKEND: &str = "memory";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub refresh_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            refresh_interval_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let api_url = std::env::var("MEALS_API_URL").unwrap_or(defaults.api_url);
        let refresh_interval_secs = match std::env::var("REFRESH_INTERVAL_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("REFRESH_INTERVAL_SECS={v:?}: {e}"))?,
            Err(_) => defaults.refresh_interval_secs,
        };
        if refresh_interval_secs == 0 {
            anyhow::bail!("REFRESH_INTERVAL_SECS must be positive");
        }
        Ok(Self {
            api_url,
            refresh_interval_secs,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn uses_memory_backend(&self) -> bool {
        self.api_url.eq_ignore_ascii_case(MEMORY_BACKEND)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_match_the_backend() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.api_url, "http://localhost:8000/api/v1");
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(30));
        assert!(!cfg.uses_memory_backend());
    }

    #[test]
    fn memory_backend_is_case_insensitive() {
        let cfg = ClientConfig {
            api_url: "Memory".into(),
            ..Default::default()
        };
        assert!(cfg.uses_memory_backend());
    }
}
