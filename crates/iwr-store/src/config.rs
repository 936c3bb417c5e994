use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the warehouse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL, without a trailing slash (e.g. `http://localhost:9090`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".into(),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.base_url, "http://localhost:9090");
        assert_eq!(c.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: StoreConfig = toml::from_str("base_url = \"http://warehouse:9090\"").unwrap();
        assert_eq!(c.base_url, "http://warehouse:9090");
        assert_eq!(c.timeout_secs, 30);
    }
}
