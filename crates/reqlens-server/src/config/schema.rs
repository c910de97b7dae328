use serde::Deserialize;

use reqlens_core::{ReqLensError, Result, StoreConfig};

/// Sink names the registry knows how to build.
const KNOWN_SINKS: [&str; 2] = ["log", "digest"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub collector: CollectorSection,

    #[serde(default)]
    pub alerts: AlertsSection,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ReqLensError::UnsupportedVersion);
        }
        self.collector.validate()?;
        self.alerts.validate()?;
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            history_capacity: self.collector.history_capacity,
            sample_capacity: self.collector.sample_capacity,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            collector: CollectorSection::default(),
            alerts: AlertsSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorSection {
    /// Ring-buffer capacity for the recent-request log.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Sample-window capacity for each percentile estimator.
    #[serde(default = "default_sample_capacity")]
    pub sample_capacity: usize,

    /// Default `limit` for `/monitoring/requests`.
    #[serde(default = "default_recent_limit")]
    pub recent_default_limit: usize,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            sample_capacity: default_sample_capacity(),
            recent_default_limit: default_recent_limit(),
        }
    }
}

impl CollectorSection {
    pub fn validate(&self) -> Result<()> {
        if !(16..=100_000).contains(&self.history_capacity) {
            return Err(ReqLensError::BadConfig(
                "collector.history_capacity must be between 16 and 100000".into(),
            ));
        }
        if !(16..=100_000).contains(&self.sample_capacity) {
            return Err(ReqLensError::BadConfig(
                "collector.sample_capacity must be between 16 and 100000".into(),
            ));
        }
        if self.recent_default_limit == 0 || self.recent_default_limit > self.history_capacity {
            return Err(ReqLensError::BadConfig(
                "collector.recent_default_limit must be between 1 and history_capacity".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertsSection {
    #[serde(default = "default_alerts_enabled")]
    pub enabled: bool,

    /// Sinks to register, by name.
    #[serde(default = "default_sinks")]
    pub sinks: Vec<String>,
}

impl Default for AlertsSection {
    fn default() -> Self {
        Self {
            enabled: default_alerts_enabled(),
            sinks: default_sinks(),
        }
    }
}

impl AlertsSection {
    pub fn validate(&self) -> Result<()> {
        for sink in &self.sinks {
            if !KNOWN_SINKS.contains(&sink.as_str()) {
                return Err(ReqLensError::BadConfig(format!(
                    "alerts.sinks contains unknown sink: {sink}"
                )));
            }
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_history_capacity() -> usize {
    1000
}
fn default_sample_capacity() -> usize {
    1000
}
fn default_recent_limit() -> usize {
    100
}
fn default_alerts_enabled() -> bool {
    true
}
fn default_sinks() -> Vec<String> {
    vec!["log".to_string()]
}
