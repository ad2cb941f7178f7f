//! Utility functions for the CLI

use crate::error::{CliError, CliResult};
use anyhow::Context;
use colored::{ColoredString, Colorize};
use ctlapi_config::{ClientConfig, ConfigLoader};
use serde_json::Value as JsonValue;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize tracing; `RUST_LOG` wins over the verbosity flag.
///
/// Logs go to stderr so the result on stdout stays machine readable.
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Client configuration from the optional file and `CTLAPI_*` variables,
/// with command line host and port applied last
pub fn load_client_config(
    path: Option<&str>,
    host: Option<String>,
    port: Option<u16>,
) -> CliResult<ClientConfig> {
    let mut config = ConfigLoader::load(path)
        .with_context(|| format!("loading client config from {}", path.unwrap_or("environment")))?;

    if let Some(host) = host {
        config.hostname = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn info(msg: &str) -> ColoredString {
        msg.blue()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Format duration in a human-readable way
pub fn format_duration(duration: std::time::Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}

/// Parse a `name=value` parameter.
///
/// The value is read as JSON when it parses (`2`, `true`, `["a"]`), and as
/// a plain string otherwise.
pub fn parse_param(raw: &str) -> CliResult<(String, JsonValue)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        CliError::InvalidArgument(format!("parameter '{}' is not in name=value form", raw))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "parameter '{}' has an empty name",
            raw
        )));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((name.to_string(), value))
}
