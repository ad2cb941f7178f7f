//! Entry point: dispatches actions and drives accepted jobs to completion

use std::sync::Arc;
use std::time::Instant;

use ctlapi_config::ClientConfig;
use ctlapi_core::{Action, ApiResult};
use tracing::Instrument;

use crate::completion::{Completion, PollOptions, PollSession};
use crate::decoder::{decode_initial, Dispatch};
use crate::error::{ClientError, ClientResult};
use crate::request::{authorization, build_request};
use crate::transport::{ReqwestTransport, Transport};
use crate::url_builder::UrlBuilder;

/// Client for the control-plane REST API.
///
/// Cheap to clone; clones share the configuration and the transport.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Validate `config` and build the shared reqwest transport
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Invoke `action` and wait for its final result, polling the job
    /// location when the server accepts it asynchronously.
    pub async fn call<A: Action + ?Sized>(&self, action: &A) -> ClientResult<ApiResult> {
        let span = tracing::info_span!(
            "api_call",
            action = action.name(),
            method = %action.rest_info().http_method,
            mode = "blocking"
        );

        async {
            let started = Instant::now();
            let result = match self.dispatch(action).await? {
                Dispatch::Completed(result) => result,
                Dispatch::Accepted { location } => self.poll_session(action, &location)?.run().await,
            };
            log_finished(&result, started);
            Ok::<_, ClientError>(result)
        }
        .instrument(span)
        .await
    }

    /// Invoke `action` and hand its final result to `completion`.
    ///
    /// Immediate outcomes are delivered before this returns. An accepted job
    /// is polled from a background task on the current tokio runtime and this
    /// returns as soon as that task is scheduled. An `Err` means the
    /// completion was never invoked.
    pub async fn call_with_completion<A, C>(&self, action: &A, completion: C) -> ClientResult<()>
    where
        A: Action + ?Sized,
        C: Completion,
    {
        let span = tracing::info_span!(
            "api_call",
            action = action.name(),
            method = %action.rest_info().http_method,
            mode = "callback"
        );

        async {
            let started = Instant::now();
            let completion: Box<dyn Completion> = Box::new(completion);
            match self.dispatch(action).await? {
                Dispatch::Completed(result) => {
                    log_finished(&result, started);
                    completion.complete(result);
                }
                Dispatch::Accepted { location } => {
                    let session = self.poll_session(action, &location)?;
                    let _handle = session.spawn(completion);
                    tracing::info!(location = %location, "scheduled polling of async job");
                }
            }
            Ok::<_, ClientError>(())
        }
        .instrument(span)
        .await
    }

    /// Validate, build and send the initial request, then classify the
    /// response. Nothing is sent when validation fails.
    async fn dispatch<A: Action + ?Sized>(&self, action: &A) -> ClientResult<Dispatch> {
        action.check_parameters()?;
        let request = build_request(&self.config, action)?;

        tracing::info!(url = %request.url, "calling api");
        let response = self.transport.send(request).await.map_err(|err| {
            tracing::error!(error = %err, "initial request failed");
            err
        })?;

        let outcome = decode_initial(action, &response);
        if let Err(err) = &outcome {
            tracing::error!(status = response.status, error = %err, "unexpected server response");
        }
        outcome
    }

    fn poll_session<A: Action + ?Sized>(&self, action: &A, location: &str) -> ClientResult<PollSession> {
        let url = UrlBuilder::resolve_location(&self.config, location)?;
        let options = PollOptions::resolve(action, &self.config);
        tracing::debug!(
            location = %url,
            timeout_ms = options.timeout_ms,
            interval_ms = options.interval_ms,
            "async job accepted"
        );

        Ok(PollSession::new(
            self.transport.clone(),
            url,
            authorization(action)?,
            action.name(),
            options,
        ))
    }
}

fn log_finished(result: &ApiResult, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result.error {
        None => tracing::info!(elapsed_ms, "api call succeeded"),
        Some(error) => tracing::warn!(
            elapsed_ms,
            code = %error.code,
            description = %error.description,
            "api call failed"
        ),
    }
}
