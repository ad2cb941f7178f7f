//! Polling protocol for accepted (202) jobs, blocking and callback driven

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ctlapi_config::ClientConfig;
use ctlapi_core::{mask_authorization, Action, ApiResult, ErrorCode};
use url::Url;

use crate::decoder::{decode_poll, PollStatus};
use crate::scheduler::{Recurring, RecurringTask, TaskHandle, Tick};
use crate::transport::{OutboundRequest, Transport, HEADER_AUTHORIZATION};

/// Receives the terminal result of a callback-mode call.
///
/// `complete` consumes the handler, so it can run at most once.
pub trait Completion: Send + 'static {
    fn complete(self: Box<Self>, result: ApiResult);
}

impl<F> Completion for F
where
    F: FnOnce(ApiResult) + Send + 'static,
{
    fn complete(self: Box<Self>, result: ApiResult) {
        (*self)(result)
    }
}

/// Deadline and interval of one poll session, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub timeout_ms: u64,
    pub interval_ms: u64,
}

impl PollOptions {
    /// Caller values first, then the client defaults. The interval is at
    /// least one millisecond.
    pub fn resolve<A: Action + ?Sized>(action: &A, config: &ClientConfig) -> Self {
        Self {
            timeout_ms: action
                .timeout()
                .unwrap_or(config.default_polling_timeout_ms),
            interval_ms: action
                .polling_interval()
                .unwrap_or(config.default_polling_interval_ms)
                .max(1),
        }
    }
}

/// State of one in-flight poll: where to poll, how long, and how far along
pub struct PollSession {
    transport: Arc<dyn Transport>,
    location: Url,
    authorization: Option<String>,
    action: String,
    options: PollOptions,
    elapsed_ms: u64,
    attempts: u32,
}

impl PollSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        location: Url,
        authorization: Option<String>,
        action: impl Into<String>,
        options: PollOptions,
    ) -> Self {
        Self {
            transport,
            location,
            authorization,
            action: action.into(),
            options,
            elapsed_ms: 0,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.options.interval_ms)
    }

    fn request(&self) -> OutboundRequest {
        let request = OutboundRequest::get(self.location.clone());
        match &self.authorization {
            Some(auth) => request.with_header(HEADER_AUTHORIZATION, auth.clone()),
            None => request,
        }
    }

    /// One GET against the location. Transport failures are terminal and
    /// reported as an internal error result.
    async fn poll_once(&mut self) -> PollStatus {
        self.attempts += 1;
        tracing::debug!(
            action = %self.action,
            attempt = self.attempts,
            location = %self.location,
            authorization = ?self.authorization.as_deref().map(mask_authorization),
            "polling async job"
        );

        match self.transport.send(self.request()).await {
            Ok(response) => {
                let status = decode_poll(&response);
                if let PollStatus::Finished(result) = &status {
                    tracing::debug!(
                        action = %self.action,
                        status = response.status,
                        success = result.is_success(),
                        "async job finished"
                    );
                }
                status
            }
            Err(err) => {
                tracing::error!(
                    action = %self.action,
                    attempt = self.attempts,
                    error = %err,
                    "polling request failed"
                );
                PollStatus::Finished(ApiResult::with_error(ErrorCode::internal(err.to_string())))
            }
        }
    }

    /// Count one interval against the deadline; the timeout result once it
    /// has been reached.
    fn advance(&mut self) -> Option<ApiResult> {
        self.elapsed_ms = self.elapsed_ms.saturating_add(self.options.interval_ms);
        if self.elapsed_ms >= self.options.timeout_ms {
            tracing::warn!(
                action = %self.action,
                attempts = self.attempts,
                timeout_ms = self.options.timeout_ms,
                "polling async job timed out"
            );
            Some(ApiResult::with_error(ErrorCode::polling_timeout(
                &self.action,
                self.options.timeout_ms,
            )))
        } else {
            None
        }
    }

    /// Poll on the caller's task until the job finishes or the deadline
    /// passes, sleeping one interval between attempts.
    pub async fn run(mut self) -> ApiResult {
        loop {
            if let PollStatus::Finished(result) = self.poll_once().await {
                return result;
            }
            if let Some(timeout) = self.advance() {
                return timeout;
            }
            tokio::time::sleep(self.interval()).await;
        }
    }

    /// Drive the session from a background task and hand the terminal
    /// result to `completion`.
    pub fn spawn(self, completion: Box<dyn Completion>) -> TaskHandle {
        let interval = self.interval();
        RecurringTask::spawn(interval, self, move |result: ApiResult| {
            completion.complete(result)
        })
    }
}

#[async_trait]
impl Recurring for PollSession {
    type Output = ApiResult;

    async fn tick(&mut self) -> Tick<ApiResult> {
        if let PollStatus::Finished(result) = self.poll_once().await {
            return Tick::Done(result);
        }
        match self.advance() {
            Some(timeout) => Tick::Done(timeout),
            None => Tick::Continue,
        }
    }
}
