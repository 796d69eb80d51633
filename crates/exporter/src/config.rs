//! Exporter configuration

use anyhow::Result;
use serde::Deserialize;
use vperf_lib::SessionConfig;

/// Exporter settings, read from `VPERF_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the metrics endpoint binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Endpoint URL of the virtualization management API
    pub url: String,

    /// Login username
    pub username: String,

    /// Login password
    pub password: String,

    /// Skip certificate verification on the endpoint
    #[serde(default)]
    pub insecure: bool,

    /// Per-call timeout for remote operations in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional path to a scrape-selection YAML file
    #[serde(default)]
    pub config_path: Option<String>,

    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen() -> String {
    "127.0.0.1:9247".to_string()
}

fn default_timeout_secs() -> u64 {
    vperf_lib::vim::session::DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load settings from the environment. The target endpoint and
    /// credentials are required; everything else has a default.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("VPERF"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            insecure: self.insecure,
            timeout_secs: self.timeout_secs,
        }
    }
}
