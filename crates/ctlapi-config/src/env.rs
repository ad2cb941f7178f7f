//! `CTLAPI_*` environment overrides

use crate::config::ClientConfig;
use crate::error::{ConfigError, ConfigResult};
use std::str::FromStr;

pub const ENV_HOSTNAME: &str = "CTLAPI_HOSTNAME";
pub const ENV_PORT: &str = "CTLAPI_PORT";
pub const ENV_CONTEXT_PATH: &str = "CTLAPI_CONTEXT_PATH";
pub const ENV_POLLING_TIMEOUT_MS: &str = "CTLAPI_POLLING_TIMEOUT_MS";
pub const ENV_POLLING_INTERVAL_MS: &str = "CTLAPI_POLLING_INTERVAL_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "CTLAPI_CONNECT_TIMEOUT_MS";
pub const ENV_READ_TIMEOUT_MS: &str = "CTLAPI_READ_TIMEOUT_MS";

/// Overlay variables returned by `lookup` on top of `config`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ConfigResult<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(hostname) = get(ENV_HOSTNAME) {
        config.hostname = hostname;
    }
    if let Some(context) = get(ENV_CONTEXT_PATH) {
        config.context_path = Some(context);
    }
    if let Some(port) = get(ENV_PORT) {
        config.port = parse(ENV_PORT, &port)?;
    }
    if let Some(v) = get(ENV_POLLING_TIMEOUT_MS) {
        config.default_polling_timeout_ms = parse(ENV_POLLING_TIMEOUT_MS, &v)?;
    }
    if let Some(v) = get(ENV_POLLING_INTERVAL_MS) {
        config.default_polling_interval_ms = parse(ENV_POLLING_INTERVAL_MS, &v)?;
    }
    if let Some(v) = get(ENV_CONNECT_TIMEOUT_MS) {
        config.connect_timeout_ms = parse(ENV_CONNECT_TIMEOUT_MS, &v)?;
    }
    if let Some(v) = get(ENV_READ_TIMEOUT_MS) {
        config.read_timeout_ms = parse(ENV_READ_TIMEOUT_MS, &v)?;
    }

    Ok(config)
}

fn parse<T: FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
