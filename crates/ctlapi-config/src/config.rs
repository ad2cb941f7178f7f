//! Client configuration: where the server lives and how long to poll

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Fixed API version prefix
pub const API_PREFIX: &str = "/v1";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_POLLING_TIMEOUT_MS: u64 = 3 * 60 * 60 * 1000;
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 5 * 1000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10 * 1000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 60 * 1000;

/// Connection settings shared by every call made through one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub hostname: String,
    pub port: u16,
    /// Optional path segment inserted before `/v1`
    pub context_path: Option<String>,
    pub default_polling_timeout_ms: u64,
    pub default_polling_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: DEFAULT_PORT,
            context_path: None,
            default_polling_timeout_ms: DEFAULT_POLLING_TIMEOUT_MS,
            default_polling_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// `http://{hostname}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }

    /// Path prefix shared by every endpoint, e.g. `/v1` or `/zstack/v1`
    pub fn api_prefix(&self) -> String {
        match self
            .context_path
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
        {
            Some(context) => format!("/{}{}", context, API_PREFIX),
            None => API_PREFIX.to_string(),
        }
    }

    /// Reject settings that can never produce a working client
    pub fn validate(&self) -> ConfigResult<()> {
        if self.hostname.trim().is_empty() {
            return Err(ConfigError::Validation("hostname must not be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::Validation("port must be greater than 0".to_string()));
        }

        if self.default_polling_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "default polling interval must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "connect and read timeouts must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_ms > self.read_timeout_ms {
            return Err(ConfigError::Validation(
                "connect timeout cannot be greater than read timeout".to_string(),
            ));
        }

        if self.default_polling_interval_ms > self.default_polling_timeout_ms {
            tracing::warn!(
                interval_ms = self.default_polling_interval_ms,
                timeout_ms = self.default_polling_timeout_ms,
                "default polling interval exceeds default polling timeout; async calls poll once"
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = hostname.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn context_path(mut self, context_path: impl Into<String>) -> Self {
        self.config.context_path = Some(context_path.into());
        self
    }

    pub fn default_polling_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.default_polling_timeout_ms = timeout;
        self
    }

    pub fn default_polling_interval_ms(mut self, interval: u64) -> Self {
        self.config.default_polling_interval_ms = interval;
        self
    }

    pub fn connect_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.connect_timeout_ms = timeout;
        self
    }

    pub fn read_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.read_timeout_ms = timeout;
        self
    }

    pub fn build(self) -> ConfigResult<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
