use ctlapi_config::ConfigError;
use ctlapi_core::CoreError;

/// Failures raised instead of an [`ApiResult`](ctlapi_core::ApiResult).
///
/// Everything discovered while polling is reported inside the result
/// instead; these are malformed calls, fatal transport failures on the
/// initial request, and server contract violations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing required field[{0}]")]
    MissingField(String),

    #[error("api[{0}] requires a session but no sessionId is set")]
    MissingSession(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("[Internal Error] {0}")]
    Internal(String),
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingField(field) => ClientError::MissingField(field),
            CoreError::Invalid(msg) => ClientError::InvalidAction(msg),
            CoreError::Serde(e) => ClientError::InvalidAction(e.to_string()),
        }
    }
}

/// Failure to complete one HTTP exchange
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
