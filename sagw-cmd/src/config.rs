//! Runtime configuration, read from an optional JSON file.

use anyhow::Context;
use sagw_wells::search::PAGE_CAP;
use sagw_wells::session::{SessionConfig, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the layer holding wells found in searched rectangles.
pub const WELLS_LAYER_NAME: &str = "sa_gwdata wells";

/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Groundwater Data services
    pub endpoint: String,
    /// Result count at which a search rectangle is subdivided
    pub page_cap: usize,
    pub http_timeout_secs: u64,
    /// Pause before the single connection retry
    pub retry_delay_secs: f64,
    pub chart_width: u32,
    pub chart_height: u32,
    pub wells_layer_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_cap: PAGE_CAP,
            http_timeout_secs: 60,
            retry_delay_secs: 2.0,
            chart_width: 800,
            chart_height: 600,
            wells_layer_name: WELLS_LAYER_NAME.to_string(),
        }
    }
}

impl Config {
    /// Defaults when `path` is `None`, otherwise the file's values over the
    /// defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.page_cap == 0 {
            anyhow::bail!("page_cap must be positive");
        }
        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Config {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs.max(0.0))
    }

    pub fn chart_size(&self) -> (u32, u32) {
        (self.chart_width, self.chart_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.page_cap, 10_000);
        assert_eq!(config.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.wells_layer_name, "sa_gwdata wells");
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = std::env::temp_dir().join(format!("sagw-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"page_cap": 500, "chart_width": 1024}"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.page_cap, 500);
        assert_eq!(config.chart_size(), (1024, 600));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn endpoint_override() {
        let config = Config::default().with_endpoint(Some("http://localhost:8080/".into()));
        assert_eq!(config.session_config().endpoint, "http://localhost:8080/");
        let unchanged = Config::default().with_endpoint(None);
        assert_eq!(unchanged.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/sagw.json"))).is_err());
    }
}
