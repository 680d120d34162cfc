//! Client configuration.
//!
//! One base URL covers both collaborators: REST requests go to the base
//! directly, and the real-time channel lives at the same host and port with
//! the protocol upgraded and `/ws` appended to the base path.

use thiserror::Error;
use url::Url;

use crate::connection::ConnectionConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL scheme cannot be mapped to a WebSocket scheme.
    #[error("unsupported base URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST collaborator base URL, e.g. `http://localhost:5000/api/v1`.
    pub base_url: Url,
    /// Connection timing (backoff, keep-alive).
    pub connection: ConnectionConfig,
}

impl ClientConfig {
    /// Configuration with default timing for the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self { base_url, connection: ConnectionConfig::default() }
    }

    /// Derive the real-time channel endpoint from the base URL.
    ///
    /// `http` maps to `ws` and `https` to `wss`; a trailing slash on the base
    /// path is trimmed before `/ws` is appended.
    pub fn ws_url(&self) -> Result<Url, ConfigError> {
        let mut url = self.base_url.clone();

        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            ws @ ("ws" | "wss") => ws,
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
        .to_string();
        url.set_scheme(&scheme)
            .map_err(|()| ConfigError::UnsupportedScheme(self.base_url.scheme().to_string()))?;

        let path = format!("{}/ws", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(None);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ClientConfig {
        ClientConfig::new(Url::parse(base).unwrap())
    }

    #[test]
    fn derives_ws_endpoint_from_http_base() {
        let ws = config("http://localhost:5000/api/v1").ws_url().unwrap();
        assert_eq!(ws.as_str(), "ws://localhost:5000/api/v1/ws");
    }

    #[test]
    fn derives_wss_endpoint_from_https_base() {
        let ws = config("https://chat.example/api/v1/").ws_url().unwrap();
        assert_eq!(ws.as_str(), "wss://chat.example/api/v1/ws");
    }

    #[test]
    fn rejects_non_http_schemes() {
        let err = config("ftp://chat.example/api").ws_url().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(scheme) if scheme == "ftp"));
    }
}
