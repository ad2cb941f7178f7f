//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ctlapi_config::ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ctlapi_client::ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("API call failed: {0}")]
    ApiFailed(String),

    #[error("General error: {0}")]
    General(String),
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::General(format!("{:#}", err))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: CliError = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(err.to_string(), "General error: outer: inner");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(CliError::from(json_err), CliError::Serialization(_)));

        let client_err = ctlapi_client::ClientError::MissingField("uuid".into());
        assert_eq!(
            CliError::from(client_err).to_string(),
            "Client error: missing required field[uuid]"
        );
    }
}
