//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;

#[derive(Parser)]
#[command(
    name = "ctlapi",
    about = "ctlapi - call control-plane APIs and wait for async jobs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Client configuration file (YAML or JSON)
    #[arg(long, env = "CTLAPI_CONFIG", help = "Path to client configuration file")]
    pub config: Option<String>,

    /// Overrides the configured hostname
    #[arg(long, help = "Control-plane hostname")]
    pub host: Option<String>,

    /// Overrides the configured port
    #[arg(long, help = "Control-plane port")]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Invoke one API and print its result
    Call(CallArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Path template relative to the API prefix, e.g. /hosts/{uuid}
    #[arg(long)]
    pub path: String,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Action name used in logs and error details
    #[arg(long, default_value = "CliAction")]
    pub name: String,

    /// Request parameter as name=value; repeatable
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Session id sent as `Authorization: OAuth <id>`
    #[arg(long, env = "CTLAPI_SESSION")]
    pub session: Option<String>,

    /// The API may answer 202 and must be polled
    #[arg(long = "async")]
    pub is_async: bool,

    /// Polling deadline in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Delay between polls in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Deliver the result through a completion callback
    #[arg(long)]
    pub callback: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Pretty,
    /// Compact JSON
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Format a JSON value according to the output format
    pub fn format_json(&self, value: &JsonValue) -> Result<String, serde_json::Error> {
        match self {
            Self::Pretty => serde_json::to_string_pretty(value),
            Self::Json => serde_json::to_string(value),
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| {
                serde_json::Error::io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("YAML serialization error: {}", e),
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_formats() {
        let value = json!({"name": "h1"});
        assert_eq!(OutputFormat::Json.format_json(&value).unwrap(), r#"{"name":"h1"}"#);
        assert_eq!(
            OutputFormat::Pretty.format_json(&value).unwrap(),
            "{\n  \"name\": \"h1\"\n}"
        );
        assert_eq!(OutputFormat::Yaml.format_json(&value).unwrap(), "name: h1\n");
    }
}
