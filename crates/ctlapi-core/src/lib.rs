pub mod action;
pub mod error;
pub mod result;
pub mod sanitization;

// Re-export commonly used types
pub use action::{
    Action, ApiAction, Parameters, RestInfo, POLLING_INTERVAL, RESERVED_PARAMETERS, SESSION_ID,
    TIMEOUT,
};
pub use error::{CoreError, CoreResult};
pub use result::{ApiResult, ErrorCode, ErrorKind};
pub use sanitization::{is_sensitive_field, mask_authorization, sanitize_json_value};
