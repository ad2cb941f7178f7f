//! HTTP transport seam and its reqwest implementation

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ctlapi_config::ClientConfig;
use reqwest::{Client, Method};
use url::Url;

use crate::error::{ClientError, ClientResult, TransportError};

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// One fully assembled HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body, if any
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status code and body text of one HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx, the only range the client treats as successful
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP exchanges. Shared by every invocation of one client, so
/// implementations must be safe to use concurrently.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by one long-lived `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Arc<Client>,
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Build the client with the connection-level timeout from `config`;
    /// the read timeout is applied per request.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            client: Arc::new(client),
            request_timeout: Duration::from_millis(config.read_timeout_ms),
        })
    }

    fn build(&self, request: OutboundRequest) -> Result<reqwest::Request, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON).body(body);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let request = self.build(request)?;

        let exchange = async {
            let response = self.client.execute(request).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(TransportResponse { status, body })
        };

        match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) if err.is_timeout() => Err(TransportError::Timeout(format!(
                "no response after {}ms",
                self.request_timeout.as_millis()
            ))),
            Ok(Err(err)) if err.is_connect() => Err(TransportError::Connection(err.to_string())),
            Ok(Err(err)) => Err(TransportError::Http(err)),
            Err(_) => Err(TransportError::Timeout(format!(
                "no response after {}ms (total timeout)",
                self.request_timeout.as_millis()
            ))),
        }
    }
}

/// Parse an HTTP verb taken from action metadata
pub fn parse_method(method: &str) -> ClientResult<Method> {
    Method::from_str(&method.to_ascii_uppercase())
        .map_err(|_| ClientError::InvalidMethod(method.to_string()))
}
