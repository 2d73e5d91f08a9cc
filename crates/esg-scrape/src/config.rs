//! Scrape configuration: navigation target, per-wait timeouts and schema.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{Schema, SchemaError};

/// Default product page prefix on Euronext Live.
pub const DEFAULT_BASE_URL: &str = "https://live.euronext.com/en/product/equities/";

/// Tunables for one run. Every field has a default, so a partial JSON
/// file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub navigation_timeout_ms: u64,
    pub overview_timeout_ms: u64,
    pub esg_timeout_ms: u64,
    pub characteristics_timeout_ms: u64,
    pub settle_window_ms: u64,
    pub poll_interval_ms: u64,
    /// Output columns; `None` means the standard schema.
    pub schema: Option<Vec<String>>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            navigation_timeout_ms: 30_000,
            overview_timeout_ms: 10_000,
            esg_timeout_ms: 10_000,
            characteristics_timeout_ms: 15_000,
            settle_window_ms: 3_000,
            poll_interval_ms: 250,
            schema: None,
        }
    }
}

impl ScrapeConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn overview_timeout(&self) -> Duration {
        Duration::from_millis(self.overview_timeout_ms)
    }

    pub fn esg_timeout(&self) -> Duration {
        Duration::from_millis(self.esg_timeout_ms)
    }

    pub fn characteristics_timeout(&self) -> Duration {
        Duration::from_millis(self.characteristics_timeout_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// The configured schema, or the standard one.
    pub fn schema(&self) -> Result<Schema, SchemaError> {
        match &self.schema {
            Some(fields) => Schema::new(fields),
            None => Ok(Schema::standard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page_timings() {
        let config = ScrapeConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.overview_timeout(), Duration::from_secs(10));
        assert_eq!(config.esg_timeout(), Duration::from_secs(10));
        assert_eq!(config.characteristics_timeout(), Duration::from_secs(15));
        assert_eq!(config.settle_window(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ScrapeConfig =
            serde_json::from_str(r#"{"esg_timeout_ms": 2500, "schema": ["Name", "CDP"]}"#)
                .unwrap();
        assert_eq!(config.esg_timeout(), Duration::from_millis(2500));
        assert_eq!(config.overview_timeout_ms, 10_000);
        assert_eq!(config.schema().unwrap().fields(), ["Name", "CDP"]);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = ScrapeConfig {
            poll_interval_ms: 0,
            ..ScrapeConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_invalid_schema_is_reported() {
        let config = ScrapeConfig {
            schema: Some(vec!["Name".into(), "Name".into()]),
            ..ScrapeConfig::default()
        };
        assert!(config.schema().is_err());
    }
}
