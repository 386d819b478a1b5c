//! Client configuration: server host, timeouts and endpoint table source.
//!
//! Defaults can be overridden from the environment:
//! - `HTS_HOST` (default `140.116.245.157`)
//! - `HTS_CONNECT_TIMEOUT_SECS` (default 30, `0` disables)
//! - `HTS_READ_TIMEOUT_SECS` (default unset, `0` disables)
//! - `HTS_ENDPOINTS_FILE` (YAML endpoint table replacing the built-in one)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::endpoint::EndpointTable;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_HOST: &str = "140.116.245.157";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_HOST: &str = "HTS_HOST";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "HTS_CONNECT_TIMEOUT_SECS";
pub const ENV_READ_TIMEOUT_SECS: &str = "HTS_READ_TIMEOUT_SECS";
pub const ENV_ENDPOINTS_FILE: &str = "HTS_ENDPOINTS_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub connect_timeout: Option<Duration>,
    /// Applies to each individual receive, not the whole exchange.
    pub read_timeout: Option<Duration>,
    pub endpoints_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: None,
            endpoints_path: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `HTS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_READ_TIMEOUT_SECS) {
            config.read_timeout = parse_secs(ENV_READ_TIMEOUT_SECS, &raw)?;
        }
        if let Some(path) = lookup(ENV_ENDPOINTS_FILE).filter(|p| !p.is_empty()) {
            config.endpoints_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// The configured YAML table, or the built-in one.
    pub fn endpoint_table(&self) -> Result<EndpointTable> {
        match &self.endpoints_path {
            Some(path) => EndpointTable::from_yaml_path(path),
            None => Ok(EndpointTable::builtin().clone()),
        }
    }
}

/// Whole seconds; `0` means "no timeout".
pub fn parse_secs(name: &str, raw: &str) -> Result<Option<Duration>> {
    let secs = raw.trim().parse::<u64>().map_err(|e| {
        Error::configuration_with_context(
            format!("Invalid timeout: {}", e),
            ErrorContext::new()
                .with_field_path(name)
                .with_details(format!("got '{}'", raw))
                .with_source("client_config"),
        )
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
