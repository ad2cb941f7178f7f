//! Classification of HTTP responses into call outcomes

use ctlapi_core::{Action, ApiResult, ErrorCode};
use serde_json::Value as JsonValue;

use crate::error::{ClientError, ClientResult};
use crate::transport::TransportResponse;

/// Field of a 202 body naming the polling URL
pub const LOCATION: &str = "location";

/// Outcome of the initial request of a call
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Final result, no polling needed
    Completed(ApiResult),
    /// Job accepted; poll `location` until it finishes
    Accepted { location: String },
}

/// Outcome of one poll request
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    Pending,
    Finished(ApiResult),
}

/// Classify the response to the initial request
pub fn decode_initial<A: Action + ?Sized>(
    action: &A,
    response: &TransportResponse,
) -> ClientResult<Dispatch> {
    if !response.is_successful() {
        return Ok(Dispatch::Completed(ApiResult::with_error(
            ErrorCode::http_error(response.status, response.body.clone()),
        )));
    }

    match response.status {
        200 | 204 => Ok(Dispatch::Completed(completed_result(&response.body))),
        202 => accepted(action, &response.body),
        other => Err(ClientError::Internal(format!(
            "the server returns an unknown status code[{}]",
            other
        ))),
    }
}

fn accepted<A: Action + ?Sized>(action: &A, body: &str) -> ClientResult<Dispatch> {
    if !action.rest_info().need_poll {
        return Err(ClientError::Internal(format!(
            "the api[{}] is not an async API but the server returns 202 status code",
            action.name()
        )));
    }

    let body: JsonValue = serde_json::from_str(body).map_err(|e| {
        ClientError::Internal(format!(
            "the api[{}] returned an undecodable 202 body: {}",
            action.name(),
            e
        ))
    })?;

    match body.get(LOCATION).and_then(JsonValue::as_str) {
        Some(location) if !location.is_empty() => Ok(Dispatch::Accepted {
            location: location.to_string(),
        }),
        _ => Err(ClientError::Internal(format!(
            "the api[{}] is an async API but the server doesn't return the polling location url",
            action.name()
        ))),
    }
}

/// Classify the response to one poll request.
///
/// 200 and 503 are terminal; 503 carries a result envelope whose error is
/// reported by the server. 202 means still running.
pub fn decode_poll(response: &TransportResponse) -> PollStatus {
    match response.status {
        202 => PollStatus::Pending,
        200 => PollStatus::Finished(completed_result(&response.body)),
        503 => PollStatus::Finished(failure_envelope(&response.body)),
        status => PollStatus::Finished(ApiResult::with_error(ErrorCode::http_error(
            status,
            response.body.clone(),
        ))),
    }
}

fn completed_result(body: &str) -> ApiResult {
    if body.trim().is_empty() {
        ApiResult::empty()
    } else {
        ApiResult::with_payload(body)
    }
}

fn failure_envelope(body: &str) -> ApiResult {
    match serde_json::from_str::<ApiResult>(body) {
        Ok(result) => result,
        Err(e) => ApiResult::with_error(ErrorCode::internal(format!(
            "cannot decode the failure result of an async API: {}; body: {}",
            e, body
        ))),
    }
}
