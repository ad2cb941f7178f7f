//! Assembles the outbound request for one action

use ctlapi_config::ClientConfig;
use ctlapi_core::{sanitize_json_value, Action};
use reqwest::Method;
use serde_json::Value as JsonValue;

use crate::error::{ClientError, ClientResult};
use crate::resolver::{body_parameters, substitute, value_text};
use crate::transport::{parse_method, OutboundRequest, HEADER_AUTHORIZATION};
use crate::url_builder::UrlBuilder;

/// Scheme token of the `Authorization` header
pub const AUTH_SCHEME: &str = "OAuth";

/// `Authorization` header value for `action`.
///
/// `None` when the endpoint needs no session; an error when it needs one and
/// the action carries none.
pub fn authorization<A: Action + ?Sized>(action: &A) -> ClientResult<Option<String>> {
    if !action.rest_info().need_session {
        return Ok(None);
    }

    action
        .session_id()
        .map(|session| Some(format!("{} {}", AUTH_SCHEME, session)))
        .ok_or_else(|| ClientError::MissingSession(action.name().to_string()))
}

/// Methods whose parameters travel in the query string instead of a body
fn uses_query_string(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

/// Build the initial request of a call.
///
/// Every precondition (path variables, session) is checked here, before any
/// I/O happens.
pub fn build_request<A: Action + ?Sized>(
    config: &ClientConfig,
    action: &A,
) -> ClientResult<OutboundRequest> {
    let info = action.rest_info();
    let method = parse_method(&info.http_method)?;

    let resolved = substitute(&info.path, action)?;
    let mut url = UrlBuilder::endpoint(config, &resolved.path)?;
    let params = body_parameters(action, &resolved.variables);

    let body = if uses_query_string(&method) {
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                append_query(&mut pairs, key, value);
            }
        }
        None
    } else {
        let json = serde_json::to_string(&params)
            .map_err(|e| ClientError::InvalidAction(format!("cannot serialize body: {}", e)))?;
        Some(json)
    };

    let mut request = OutboundRequest {
        method,
        url,
        headers: Vec::new(),
        body,
    };
    if let Some(auth) = authorization(action)? {
        request = request.with_header(HEADER_AUTHORIZATION, auth);
    }

    tracing::debug!(
        action = action.name(),
        method = %request.method,
        url = %request.url,
        params = %sanitize_json_value(&JsonValue::Object(params)),
        "built request"
    );

    Ok(request)
}

/// Arrays expand into repeated keys, everything else is one pair
fn append_query(
    pairs: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    key: &str,
    value: &JsonValue,
) {
    match value {
        JsonValue::Array(items) => {
            for item in items {
                pairs.append_pair(key, &value_text(item));
            }
        }
        other => {
            pairs.append_pair(key, &value_text(other));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctlapi_core::{ApiAction, RestInfo};
    use serde_json::json;

    static CREATE_VM: RestInfo = RestInfo::new("/vm-instances", "POST", true, true);
    static GET_HOST: RestInfo = RestInfo::new("/hosts/{uuid}", "GET", true, false);
    static QUERY_ZONE: RestInfo = RestInfo::new("/zones", "GET", false, false);
    static BAD_METHOD: RestInfo = RestInfo::new("/zones", "NOT A VERB", false, false);

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .hostname("cp.local")
            .port(8080)
            .build()
            .unwrap()
    }

    #[test]
    fn test_post_body_and_authorization() {
        let action = ApiAction::new("CreateVmInstance", &CREATE_VM)
            .with_param("name", "vm1")
            .with_param("cpuNum", 2)
            .with_param("description", JsonValue::Null)
            .with_session("s-42");

        let request = build_request(&config(), &action).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "http://cp.local:8080/v1/vm-instances");
        assert_eq!(request.header("authorization"), Some("OAuth s-42"));

        let body: JsonValue = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "vm1", "cpuNum": 2}));
    }

    #[test]
    fn test_empty_post_still_sends_object() {
        let action = ApiAction::new("CreateVmInstance", &CREATE_VM).with_session("s-42");
        let request = build_request(&config(), &action).unwrap();
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_get_uses_path_and_query() {
        let action = ApiAction::new("GetHost", &GET_HOST)
            .with_param("uuid", "abc-123")
            .with_param("fields", json!(["name", "state"]))
            .with_session("s-1");

        let request = build_request(&config(), &action).unwrap();

        assert_eq!(
            request.url.as_str(),
            "http://cp.local:8080/v1/hosts/abc-123?fields=name&fields=state"
        );
        assert!(request.body.is_none());
        assert!(!request.url.as_str().contains("sessionId"));
    }

    #[test]
    fn test_no_session_header_when_not_needed() {
        let action = ApiAction::new("QueryZone", &QUERY_ZONE).with_session("s-1");
        let request = build_request(&config(), &action).unwrap();
        assert_eq!(request.header(HEADER_AUTHORIZATION), None);
        assert_eq!(request.url.query(), None);
    }

    #[test]
    fn test_missing_session_fails_fast() {
        let action = ApiAction::new("CreateVmInstance", &CREATE_VM).with_param("name", "vm1");
        match build_request(&config(), &action) {
            Err(ClientError::MissingSession(name)) => assert_eq!(name, "CreateVmInstance"),
            other => panic!("expected missing session, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_path_variable_fails_fast() {
        let action = ApiAction::new("GetHost", &GET_HOST).with_session("s-1");
        assert!(matches!(
            build_request(&config(), &action),
            Err(ClientError::MissingField(f)) if f == "uuid"
        ));
    }

    #[test]
    fn test_invalid_method() {
        let action = ApiAction::new("Broken", &BAD_METHOD);
        assert!(matches!(
            build_request(&config(), &action),
            Err(ClientError::InvalidMethod(_))
        ));
    }
}
