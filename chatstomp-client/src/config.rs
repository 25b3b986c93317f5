//! Client configuration for ChatStomp
//!
//! This module provides configuration options for STOMP clients.

use chatstomp_core::error::ConfigError;
use chatstomp_core::protocol::constants;
use chatstomp_core::{Error, HeaderList};
use url::Url;

/// Environment variable holding the chat backend base URL
pub const BACKEND_URL_ENV: &str = "CHATSTOMP_BACKEND_URL";

/// Backend base URL used when the environment does not provide one
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the STOMP broker
    pub url: String,
    /// Protocol version offered in CONNECT
    pub accept_version: String,
    /// Default content type of SEND frames
    pub content_type: String,
    /// CONNECT headers applied beneath the per-call headers
    pub headers: HeaderList,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: constants::DEFAULT_ENDPOINT.to_string(),
            accept_version: constants::ACCEPT_VERSION.to_string(),
            content_type: constants::DEFAULT_CONTENT_TYPE.to_string(),
            headers: HeaderList::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Derive the STOMP endpoint from the chat backend's HTTP base URL
    ///
    /// `https` becomes `wss`, anything else `ws`; the path is replaced by the
    /// STOMP endpoint path and query/fragment are dropped. An unparsable base
    /// falls back to the local default endpoint.
    pub fn from_backend_url(base: &str) -> Self {
        Self::new(websocket_url(base))
    }

    /// Read the backend base URL from `CHATSTOMP_BACKEND_URL`
    pub fn from_env() -> Self {
        let base =
            std::env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self::from_backend_url(&base)
    }

    /// Validate the configuration
    pub fn validate(&self) -> chatstomp_core::Result<()> {
        let url = Url::parse(&self.url).map_err(|e| {
            Error::Config(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: e.to_string(),
            })
        })?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::Config(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            }));
        }

        if self.accept_version.trim().is_empty() {
            return Err(Error::Config(ConfigError::Validation(
                "accept_version must not be empty".to_string(),
            )));
        }

        Ok(())
    }

    /// Set the endpoint
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the offered protocol version
    pub fn accept_version(mut self, version: impl Into<String>) -> Self {
        self.accept_version = version.into();
        self
    }

    /// Set the default SEND content type
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Add a CONNECT header
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }
}

/// Map an HTTP(S) base URL to the broker's WebSocket endpoint
pub fn websocket_url(base: &str) -> String {
    let Ok(mut url) = Url::parse(base) else {
        tracing::warn!(base, "unparsable backend url, using default endpoint");
        return constants::DEFAULT_ENDPOINT.to_string();
    };

    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    // Url refuses switching between special and non-special schemes, so
    // rebuild from the string form when that happens.
    if url.set_scheme(scheme).is_err() {
        let rest = &url.as_str()[url.scheme().len()..];
        match Url::parse(&format!("{scheme}{rest}")) {
            Ok(rebuilt) => url = rebuilt,
            Err(_) => return constants::DEFAULT_ENDPOINT.to_string(),
        }
    }
    url.set_path(constants::STOMP_ENDPOINT_PATH);
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.url, "ws://localhost:8080/stomp");
        assert_eq!(config.accept_version, "1.2");
        assert_eq!(config.content_type, "application/json");
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_client_config_validation() {
        let config = ClientConfig::new("http://localhost:8080/stomp");
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidUrl { .. }))
        ));

        let config = ClientConfig::new("not a url");
        assert!(config.validate().is_err());

        let config = ClientConfig::default().accept_version(" ");
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::default()
            .url("wss://chat.example.com/stomp")
            .content_type("text/plain")
            .add_header("host", "chat.example.com");

        assert!(config.validate().is_ok());
        assert_eq!(config.url, "wss://chat.example.com/stomp");
        assert_eq!(config.content_type, "text/plain");
        assert_eq!(config.headers.get("host"), Some("chat.example.com"));
    }

    #[test]
    fn test_websocket_url_from_backend() {
        assert_eq!(
            websocket_url("http://localhost:8080"),
            "ws://localhost:8080/stomp"
        );
        assert_eq!(
            websocket_url("https://api.example.com/v1/?debug=1#top"),
            "wss://api.example.com/stomp"
        );
        assert_eq!(websocket_url("::nonsense::"), "ws://localhost:8080/stomp");
        assert_eq!(
            ClientConfig::from_backend_url("https://chat.example.com").url,
            "wss://chat.example.com/stomp"
        );
    }
}
