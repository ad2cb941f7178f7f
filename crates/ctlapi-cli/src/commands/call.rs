//! API call command

use std::time::{Duration, Instant};

use anyhow::Context;
use ctlapi_client::ApiClient;
use ctlapi_config::ClientConfig;
use ctlapi_core::{Action, ApiAction, ApiResult, RestInfo};
use serde_json::{json, Value as JsonValue};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{
    cli::{CallArgs, OutputFormat},
    error::{CliError, CliResult},
    utils::{format_duration, parse_param, ColoredOutput},
};

pub struct CallCommand;

impl CallCommand {
    pub async fn run(config: ClientConfig, args: CallArgs) -> CliResult<()> {
        let action = Self::build_action(&args)?;
        let client = ApiClient::new(config)?;

        info!(
            "Calling {} {} ({})",
            action.rest_info().http_method,
            action.rest_info().path,
            if args.callback { "callback" } else { "blocking" }
        );

        let started = Instant::now();
        let result = Self::invoke(&client, &action, args.callback).await?;
        Self::display_result(&result, started.elapsed(), args.format)?;

        match result.error {
            Some(error) => Err(CliError::ApiFailed(format!("{}: {}", error.code, error.description))),
            None => Ok(()),
        }
    }

    /// Turn command line arguments into an action
    pub fn build_action(args: &CallArgs) -> CliResult<ApiAction> {
        let info = RestInfo::owned(
            args.path.clone(),
            args.method.to_ascii_uppercase(),
            args.session.is_some(),
            args.is_async,
        );
        let mut action = ApiAction::with_rest_info(args.name.clone(), info);

        for raw in &args.params {
            let (name, value) = parse_param(raw)?;
            debug!("Parameter {} set", name);
            action.parameters_mut().set(name, value);
        }
        if let Some(session) = &args.session {
            action = action.with_session(session.clone());
        }
        if let Some(timeout) = args.timeout {
            action = action.timeout_ms(timeout);
        }
        if let Some(interval) = args.interval {
            action = action.polling_interval_ms(interval);
        }

        Ok(action)
    }

    /// Run the call in blocking mode, or in callback mode waiting for the
    /// completion to fire.
    pub async fn invoke(client: &ApiClient, action: &ApiAction, callback: bool) -> CliResult<ApiResult> {
        if !callback {
            return Ok(client.call(action).await?);
        }

        let (tx, rx) = oneshot::channel();
        client
            .call_with_completion(action, move |result: ApiResult| {
                let _ = tx.send(result);
            })
            .await?;

        let result = rx
            .await
            .context("completion dropped without delivering a result")?;
        Ok(result)
    }

    /// JSON shown to the user: the decoded payload or the error
    pub fn output_value(result: &ApiResult) -> JsonValue {
        if let Some(error) = &result.error {
            return json!({ "error": error });
        }

        let payload = match result.raw_payload() {
            None => JsonValue::Null,
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string())),
        };
        json!({ "result": payload })
    }

    fn display_result(result: &ApiResult, elapsed: Duration, format: OutputFormat) -> CliResult<()> {
        let formatted = format.format_json(&Self::output_value(result))?;
        println!("{}", formatted);

        let status = match &result.error {
            None => ColoredOutput::success("✓ Success"),
            Some(error) => ColoredOutput::error(&format!("✗ {}", error.code)),
        };
        eprintln!(
            "{} {}",
            status,
            ColoredOutput::info(&format!("in {}", format_duration(elapsed)))
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctlapi_core::ErrorCode;
    use httpmock::{Method::GET, Method::POST, MockServer};

    fn args(path: &str) -> CallArgs {
        CallArgs {
            path: path.to_string(),
            method: "get".to_string(),
            name: "CliAction".to_string(),
            params: Vec::new(),
            session: None,
            is_async: false,
            timeout: None,
            interval: None,
            callback: false,
            format: OutputFormat::Json,
        }
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig::builder()
            .hostname(server.host())
            .port(server.port())
            .build()
            .unwrap();
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn test_build_action() {
        let mut call = args("/hosts/{uuid}");
        call.params = vec!["uuid=abc-123".to_string(), "limit=5".to_string()];
        call.session = Some("s-1".to_string());
        call.is_async = true;
        call.timeout = Some(1_000);
        call.interval = Some(50);

        let action = CallCommand::build_action(&call).unwrap();

        assert_eq!(action.rest_info().http_method, "GET");
        assert!(action.rest_info().need_session);
        assert!(action.rest_info().need_poll);
        assert_eq!(action.parameter("limit"), Some(&json!(5)));
        assert_eq!(action.session_id().as_deref(), Some("s-1"));
        assert_eq!(action.timeout(), Some(1_000));
        assert_eq!(action.polling_interval(), Some(50));
    }

    #[test]
    fn test_build_action_rejects_bad_param() {
        let mut call = args("/zones");
        call.params = vec!["oops".to_string()];
        assert!(matches!(
            CallCommand::build_action(&call),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_output_value() {
        assert_eq!(
            CallCommand::output_value(&ApiResult::with_payload(r#"{"name":"h1"}"#)),
            json!({"result": {"name": "h1"}})
        );
        assert_eq!(
            CallCommand::output_value(&ApiResult::empty()),
            json!({"result": null})
        );

        let error = ErrorCode::internal("boom");
        let value = CallCommand::output_value(&ApiResult::with_error(error));
        assert_eq!(value["error"]["code"], "sdk.1002");
        assert_eq!(value["error"]["details"], "boom");
    }

    #[tokio::test]
    async fn test_invoke_blocking() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/hosts/abc-123");
                then.status(200).body(r#"{"name":"h1"}"#);
            })
            .await;

        let mut call = args("/hosts/{uuid}");
        call.params = vec!["uuid=abc-123".to_string()];
        let action = CallCommand::build_action(&call).unwrap();

        let result = CallCommand::invoke(&client_for(&server), &action, false)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.raw_payload(), Some(r#"{"name":"h1"}"#));
    }

    #[tokio::test]
    async fn test_invoke_callback_waits_for_polling() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/vm-instances");
                then.status(202).json_body(json!({"location": "/v1/api-jobs/j1"}));
            })
            .await;
        let job = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/api-jobs/j1");
                then.status(200).body(r#"{"ok":true}"#);
            })
            .await;

        let mut call = args("/vm-instances");
        call.method = "POST".to_string();
        call.is_async = true;
        call.interval = Some(10);
        let action = CallCommand::build_action(&call).unwrap();

        let result = CallCommand::invoke(&client_for(&server), &action, true)
            .await
            .unwrap();

        job.assert_async().await;
        assert_eq!(result.raw_payload(), Some(r#"{"ok":true}"#));
    }
}
