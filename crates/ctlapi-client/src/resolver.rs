//! Path template substitution and body parameter selection

use std::collections::HashMap;

use ctlapi_core::{Action, RESERVED_PARAMETERS};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value as JsonValue};

use crate::error::{ClientError, ClientResult};

static URL_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(.+?)\}").expect("url variable pattern is valid"));

/// A path template with every `{var}` replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    /// Names consumed by the template, in order of appearance
    pub variables: Vec<String>,
}

/// Variable names referenced by `template`
pub fn url_variables(template: &str) -> Vec<String> {
    URL_VARIABLE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Substitute every placeholder of `template` with the action's value.
///
/// Fails with [`ClientError::MissingField`] on the first placeholder without a
/// value; nothing is substituted in that case.
pub fn substitute<A: Action + ?Sized>(template: &str, action: &A) -> ClientResult<ResolvedPath> {
    let variables = url_variables(template);

    let mut values = HashMap::with_capacity(variables.len());
    for name in &variables {
        let value = action
            .parameter(name)
            .ok_or_else(|| ClientError::MissingField(name.clone()))?;
        values.insert(name.as_str(), urlencoding::encode(&value_text(value)).into_owned());
    }

    let path = URL_VARIABLE
        .replace_all(template, |caps: &Captures| values[&caps[1]].clone())
        .into_owned();

    Ok(ResolvedPath { path, variables })
}

/// Parameters that travel in the request body: everything set that the URL
/// did not consume, minus the session credential and poll options.
pub fn body_parameters<A: Action + ?Sized>(
    action: &A,
    url_variables: &[String],
) -> Map<String, JsonValue> {
    action
        .parameter_names()
        .into_iter()
        .filter(|name| {
            !RESERVED_PARAMETERS.contains(name)
                && !url_variables.iter().any(|v| v.as_str() == *name)
        })
        .filter_map(|name| {
            action
                .parameter(name)
                .map(|value| (name.to_string(), value.clone()))
        })
        .collect()
}

/// Text form of a parameter used in paths and query strings
pub fn value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
