//! Result envelope returned by every logical API call

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Error kinds produced by the client itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-2xx or unexpected HTTP status
    HttpError,
    /// Deadline passed while the job was still running
    PollingTimeout,
    /// Contract violation or transport failure while polling
    InternalError,
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            ErrorKind::HttpError => "sdk.1000",
            ErrorKind::PollingTimeout => "sdk.1001",
            ErrorKind::InternalError => "sdk.1002",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "sdk.1000" => Some(ErrorKind::HttpError),
            "sdk.1001" => Some(ErrorKind::PollingTimeout),
            "sdk.1002" => Some(ErrorKind::InternalError),
            _ => None,
        }
    }
}

/// Structured error carried inside an [`ApiResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCode {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elaboration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ErrorCode>>,
    /// Server fields without a dedicated member (`location`, `opaque`, ...),
    /// kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ErrorCode {
    pub fn new(kind: ErrorKind, description: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code: kind.code().to_string(),
            description: description.into(),
            details: details.into(),
            elaboration: None,
            cause: None,
            extra: Map::new(),
        }
    }

    pub fn http_error(status: u16, body: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::HttpError,
            format!("the http status code[{}] indicates a failure happened", status),
            body,
        )
    }

    pub fn polling_timeout(action: &str, timeout_ms: u64) -> Self {
        Self::new(
            ErrorKind::PollingTimeout,
            "timeout of polling async API result",
            format!(
                "polling result of api[{}] timeout after {} ms",
                action, timeout_ms
            ),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, "an internal error happened", details)
    }

    /// Client-side kind; `None` for codes reported by the server
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(&self.code)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if !self.details.is_empty() {
            write!(f, ": {}", self.details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorCode {}

/// Outcome of one logical call: an error, a raw JSON payload, or nothing.
///
/// Never carries both an error and a payload; a decoded envelope with an
/// error drops its payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Envelope")]
pub struct ApiResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
}

/// Wire shape of a result envelope, before normalization
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Option<ErrorCode>,
    #[serde(default, deserialize_with = "raw_payload::deserialize")]
    result: Option<String>,
}

impl From<Envelope> for ApiResult {
    fn from(envelope: Envelope) -> Self {
        match envelope.error {
            Some(error) => ApiResult::with_error(error),
            None => ApiResult {
                error: None,
                result: envelope.result,
            },
        }
    }
}

impl ApiResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            error: None,
            result: Some(payload.into()),
        }
    }

    pub fn with_error(error: ErrorCode) -> Self {
        Self {
            error: Some(error),
            result: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Raw payload text as received
    pub fn raw_payload(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Decode the payload into `T`; `Ok(None)` when there is none
    pub fn payload<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.result
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }

    pub fn into_result(self) -> Result<Option<String>, ErrorCode> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

/// Server envelopes carry `result` either as a JSON string or inline JSON;
/// both are kept as text.
mod raw_payload {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<JsonValue>::deserialize(deserializer)? {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_decodes_lazily() {
        let result = ApiResult::with_payload(r#"{"name":"h1"}"#);
        assert!(result.is_success());
        let value: Option<JsonValue> = result.payload().unwrap();
        assert_eq!(value, Some(json!({"name": "h1"})));
    }

    #[test]
    fn empty_result_has_no_payload() {
        let result = ApiResult::empty();
        assert!(result.is_success());
        assert_eq!(result.payload::<JsonValue>().unwrap(), None);
        assert_eq!(result.into_result().unwrap(), None);
    }

    #[test]
    fn error_envelope_keeps_every_field() {
        let body = json!({
            "error": {
                "code": "SYS.1006",
                "description": "operation failed",
                "details": "host h1 is disconnected",
                "elaboration": "check agent",
                "cause": {"code": "HOST.1000", "description": "agent down", "details": ""}
            }
        });
        let result: ApiResult = serde_json::from_value(body).unwrap();
        let error = result.error.clone().unwrap();

        assert_eq!(error.code, "SYS.1006");
        assert_eq!(error.description, "operation failed");
        assert_eq!(error.details, "host h1 is disconnected");
        assert_eq!(error.elaboration.as_deref(), Some("check agent"));
        assert_eq!(error.cause.as_ref().unwrap().code, "HOST.1000");
        assert_eq!(error.kind(), None);
        assert_eq!(result.raw_payload(), None);
    }

    #[test]
    fn inline_result_is_kept_as_text() {
        let result: ApiResult = serde_json::from_str(r#"{"result":{"ok":true}}"#).unwrap();
        assert_eq!(result.payload::<JsonValue>().unwrap(), Some(json!({"ok": true})));

        let result: ApiResult = serde_json::from_str(r#"{"result":"{\"ok\":true}"}"#).unwrap();
        assert_eq!(result.raw_payload(), Some(r#"{"ok":true}"#));
    }

    #[test]
    fn client_errors_map_to_kinds() {
        assert_eq!(ErrorCode::http_error(404, "nope").kind(), Some(ErrorKind::HttpError));
        assert_eq!(
            ErrorCode::polling_timeout("CreateVm", 10).kind(),
            Some(ErrorKind::PollingTimeout)
        );
        assert_eq!(ErrorCode::internal("boom").kind(), Some(ErrorKind::InternalError));

        let timeout = ErrorCode::polling_timeout("CreateVm", 10);
        assert_eq!(timeout.details, "polling result of api[CreateVm] timeout after 10 ms");
    }

    #[test]
    fn error_envelope_never_keeps_payload() {
        let body = r#"{"error":{"code":"SYS.1006","description":"d","details":"x"},"result":{"inventory":1}}"#;
        let result: ApiResult = serde_json::from_str(body).unwrap();

        assert!(!result.is_success());
        assert_eq!(result.raw_payload(), None);
        assert_eq!(result.into_result().unwrap_err().code, "SYS.1006");
    }

    #[test]
    fn unknown_error_fields_survive_round_trip() {
        let error = json!({
            "code": "SYS.1006",
            "description": "d",
            "details": "x",
            "location": "file.java:10",
            "opaque": {"k": "v"}
        });
        let decoded: ErrorCode = serde_json::from_value(error.clone()).unwrap();

        assert_eq!(decoded.extra.get("location"), Some(&json!("file.java:10")));
        assert_eq!(serde_json::to_value(&decoded).unwrap(), error);
        assert!(ErrorCode::internal("boom").extra.is_empty());
    }
}
