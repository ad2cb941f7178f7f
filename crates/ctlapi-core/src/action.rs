//! Action model: static REST metadata plus the parameter values of one call

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::{CoreError, CoreResult};

/// Reserved parameter carrying the session credential
pub const SESSION_ID: &str = "sessionId";

/// Reserved parameter carrying the polling deadline in milliseconds
pub const TIMEOUT: &str = "timeout";

/// Reserved parameter carrying the delay between polls in milliseconds
pub const POLLING_INTERVAL: &str = "pollingInterval";

/// Names the client consumes itself; they never travel in the request
pub const RESERVED_PARAMETERS: &[&str] = &[SESSION_ID, TIMEOUT, POLLING_INTERVAL];

/// Static description of one REST endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestInfo {
    /// Path template relative to the API prefix, e.g. `/hosts/{uuid}`
    pub path: Cow<'static, str>,
    /// HTTP verb, used verbatim
    pub http_method: Cow<'static, str>,
    /// Whether an `Authorization` header must be attached
    pub need_session: bool,
    /// Whether the server may answer with 202 and a polling location
    pub need_poll: bool,
}

impl RestInfo {
    pub const fn new(
        path: &'static str,
        http_method: &'static str,
        need_session: bool,
        need_poll: bool,
    ) -> Self {
        Self {
            path: Cow::Borrowed(path),
            http_method: Cow::Borrowed(http_method),
            need_session,
            need_poll,
        }
    }

    /// Metadata only known at runtime
    pub fn owned(
        path: impl Into<String>,
        http_method: impl Into<String>,
        need_session: bool,
        need_poll: bool,
    ) -> Self {
        Self {
            path: Cow::Owned(path.into()),
            http_method: Cow::Owned(http_method.into()),
            need_session,
            need_poll,
        }
    }
}

/// Ordered name -> value mapping populated by the concrete action.
///
/// A `null` value is treated the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: IndexMap<String, JsonValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<JsonValue> {
        self.values.shift_remove(name)
    }

    /// Value of a parameter, `None` when unset or null
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// All declared names, including ones whose value is null
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<JsonValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Contract every API action exposes to the client.
///
/// Concrete actions populate an explicit [`Parameters`] map at construction;
/// the client never inspects their fields generically.
pub trait Action: Send + Sync {
    /// Short name used in logs and error details
    fn name(&self) -> &str;

    fn rest_info(&self) -> &RestInfo;

    fn parameters(&self) -> &Parameters;

    /// Validate required fields before any network I/O
    fn check_parameters(&self) -> CoreResult<()> {
        Ok(())
    }

    /// Caller supplied polling deadline in milliseconds
    fn timeout(&self) -> Option<u64> {
        self.parameter(TIMEOUT).and_then(millis)
    }

    /// Caller supplied delay between two polls in milliseconds
    fn polling_interval(&self) -> Option<u64> {
        self.parameter(POLLING_INTERVAL).and_then(millis)
    }

    fn parameter(&self, name: &str) -> Option<&JsonValue> {
        self.parameters().get(name)
    }

    fn parameter_names(&self) -> Vec<&str> {
        self.parameters().names().collect()
    }

    /// Session credential as text, if one is set
    fn session_id(&self) -> Option<String> {
        self.parameter(SESSION_ID).map(|v| match v {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// General purpose action assembled at runtime
#[derive(Debug, Clone)]
pub struct ApiAction {
    name: String,
    rest_info: Cow<'static, RestInfo>,
    parameters: Parameters,
    required: Vec<String>,
    timeout: Option<u64>,
    polling_interval: Option<u64>,
}

impl ApiAction {
    pub fn new(name: impl Into<String>, rest_info: &'static RestInfo) -> Self {
        Self::build(name.into(), Cow::Borrowed(rest_info))
    }

    /// Action for an endpoint described at runtime
    pub fn with_rest_info(name: impl Into<String>, rest_info: RestInfo) -> Self {
        Self::build(name.into(), Cow::Owned(rest_info))
    }

    fn build(name: String, rest_info: Cow<'static, RestInfo>) -> Self {
        Self {
            name,
            rest_info,
            parameters: Parameters::new(),
            required: Vec::new(),
            timeout: None,
            polling_interval: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.set(name, value);
        self
    }

    pub fn with_session(self, session_id: impl Into<String>) -> Self {
        self.with_param(SESSION_ID, session_id.into())
    }

    /// Mark parameters that `check_parameters` insists on
    pub fn require<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn polling_interval_ms(mut self, interval: u64) -> Self {
        self.polling_interval = Some(interval);
        self
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }
}

impl Action for ApiAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn rest_info(&self) -> &RestInfo {
        &self.rest_info
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn check_parameters(&self) -> CoreResult<()> {
        match self.required.iter().find(|r| self.parameters.get(r).is_none()) {
            Some(missing) => Err(CoreError::MissingField(missing.clone())),
            None => Ok(()),
        }
    }

    fn timeout(&self) -> Option<u64> {
        self.timeout.or_else(|| self.parameter(TIMEOUT).and_then(millis))
    }

    fn polling_interval(&self) -> Option<u64> {
        self.polling_interval.or_else(|| self.parameter(POLLING_INTERVAL).and_then(millis))
    }
}

/// Millisecond value given as a JSON number or numeric string
fn millis(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::String(s) => s.trim().parse().ok(),
        other => other.as_u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static GET_HOST: RestInfo = RestInfo::new("/hosts/{uuid}", "GET", true, false);

    #[test]
    fn null_parameters_read_as_absent() {
        let mut params = Parameters::new();
        params.set("name", "h1");
        params.set("description", JsonValue::Null);

        assert_eq!(params.get("name"), Some(&json!("h1")));
        assert_eq!(params.get("description"), None);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["name", "description"]);
    }

    #[test]
    fn required_fields_are_checked() {
        let action = ApiAction::new("GetHost", &GET_HOST).require(["uuid"]);
        match action.check_parameters() {
            Err(CoreError::MissingField(field)) => assert_eq!(field, "uuid"),
            other => panic!("expected missing field, got {:?}", other),
        }

        let action = action.with_param("uuid", "abc-123");
        assert!(action.check_parameters().is_ok());
    }

    #[test]
    fn session_id_is_rendered_as_text() {
        let action = ApiAction::new("GetHost", &GET_HOST).with_session("s-1");
        assert_eq!(action.session_id().as_deref(), Some("s-1"));

        let action = ApiAction::new("GetHost", &GET_HOST).with_param(SESSION_ID, 42);
        assert_eq!(action.session_id().as_deref(), Some("42"));
    }

    #[test]
    fn poll_options_default_to_unset() {
        let action = ApiAction::new("GetHost", &GET_HOST);
        assert_eq!(action.timeout(), None);
        assert_eq!(action.polling_interval(), None);

        let action = action.timeout_ms(1_000).polling_interval_ms(10);
        assert_eq!(action.timeout(), Some(1_000));
        assert_eq!(action.polling_interval(), Some(10));
    }

    #[test]
    fn runtime_rest_info() {
        let info = RestInfo::owned(String::from("/zones/{uuid}"), "delete", true, false);
        let action = ApiAction::with_rest_info("DeleteZone", info.clone());

        assert_eq!(action.rest_info(), &info);
        assert_eq!(action.rest_info().path, "/zones/{uuid}");
        assert_eq!(&*GET_HOST.http_method, "GET");
    }

    #[test]
    fn poll_options_read_from_parameters() {
        let action = ApiAction::new("GetHost", &GET_HOST)
            .with_param(TIMEOUT, 30_000)
            .with_param(POLLING_INTERVAL, "250");
        assert_eq!(action.timeout(), Some(30_000));
        assert_eq!(action.polling_interval(), Some(250));

        let action = action.timeout_ms(1_000);
        assert_eq!(action.timeout(), Some(1_000));

        let action = ApiAction::new("GetHost", &GET_HOST).with_param(TIMEOUT, "soon");
        assert_eq!(action.timeout(), None);
    }
}
