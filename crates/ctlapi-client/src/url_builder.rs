//! URL assembly for endpoints and polling locations

use crate::error::{ClientError, ClientResult};
use ctlapi_config::ClientConfig;
use url::Url;

/// URL builder that handles proper URL joining
pub struct UrlBuilder;

impl UrlBuilder {
    /// Full endpoint URL for an already substituted path
    ///
    /// Examples:
    /// - `/hosts/abc` -> `http://host:8080/v1/hosts/abc`
    /// - `hosts` with context path `zstack` -> `http://host:8080/zstack/v1/hosts`
    pub fn endpoint(config: &ClientConfig, path: &str) -> ClientResult<Url> {
        let raw = format!(
            "{}{}/{}",
            config.base_url(),
            config.api_prefix(),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("'{}': {}", raw, e)))
    }

    /// Resolve the `location` of a 202 response.
    ///
    /// Absolute `http`/`https` URLs are used as is, and a scheme-less
    /// `host:port/path` is read as an `http` URL. A relative location starting
    /// with `/` is taken from the server root, otherwise it is relative to the
    /// API prefix.
    pub fn resolve_location(config: &ClientConfig, location: &str) -> ClientResult<Url> {
        if let Ok(url) = Url::parse(location) {
            match url.scheme() {
                "http" | "https" => return Ok(url),
                // `cp.local:8080/jobs` parses with `cp.local` as its scheme
                _ if url.cannot_be_a_base() => {
                    let raw = format!("http://{}", location);
                    return Url::parse(&raw).map_err(|e| {
                        ClientError::InvalidUrl(format!("polling location '{}': {}", location, e))
                    });
                }
                other => {
                    return Err(ClientError::InvalidUrl(format!(
                        "polling location '{}' has unsupported scheme '{}'",
                        location, other
                    )))
                }
            }
        }

        let base_raw = format!("{}{}/", config.base_url(), config.api_prefix());
        let base = Url::parse(&base_raw)
            .map_err(|e| ClientError::InvalidUrl(format!("'{}': {}", base_raw, e)))?;

        base.join(location).map_err(|e| {
            ClientError::InvalidUrl(format!(
                "cannot join polling location '{}' with '{}': {}",
                location, base_raw, e
            ))
        })
    }
}
