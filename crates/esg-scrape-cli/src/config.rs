//! Configuration file resolution and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use esg_scrape::ScrapeConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "ESG_SCRAPE_CONFIG";

/// Config file picked up from the working directory when nothing else is given.
pub const LOCAL_CONFIG: &str = "esg-scrape.json";

/// Resolve the config file path: explicit flag, then `ESG_SCRAPE_CONFIG`,
/// then `./esg-scrape.json` if it exists. `None` means built-in defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(env_path));
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    local.exists().then_some(local)
}

/// Load a config file. Fields it does not name keep their defaults.
pub fn load_config(path: &Path) -> Result<ScrapeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid config: {}", path.display()))
}

/// Resolve and load, falling back to defaults when no file applies.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ScrapeConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load_config(&path)
        }
        None => Ok(ScrapeConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/custom.json");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "esg_timeout_ms": 500, "schema": ["Name", "CDP"] }"#)
            .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.esg_timeout_ms, 500);
        assert_eq!(config.base_url, esg_scrape::DEFAULT_BASE_URL);
        assert_eq!(config.schema().unwrap().fields(), ["Name", "CDP"]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config(&path).is_err());
    }
}
