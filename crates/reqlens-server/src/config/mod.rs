//! Server config loader (strict parsing).

pub mod schema;

use std::fs;

use reqlens_core::{ReqLensError, Result};

pub use schema::{AlertsSection, CollectorSection, ServerConfig, ServerSection};

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ReqLensError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| ReqLensError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
