//! Feed endpoint derivation

use reqwest::Url;
use thiserror::Error;

/// Endpoint errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),
    #[error("Unsupported origin scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Origin has no host: {0}")]
    MissingHost(String),
}

/// WebSocket endpoint of the tick feed
///
/// The socket is secure exactly when the origin serving the viewer is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub secure: bool,
    /// Host, with port when not the scheme default
    pub host: String,
    pub path: String,
}

impl Endpoint {
    pub fn new(secure: bool, host: impl Into<String>, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Self {
            secure,
            host: host.into(),
            path,
        }
    }

    /// Map a page origin (`http(s)://host[:port]`) onto its `/ws` endpoint
    pub fn from_origin(origin: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(origin).map_err(|_| EndpointError::InvalidOrigin(origin.into()))?;

        let secure = match url.scheme() {
            "https" | "wss" => true,
            "http" | "ws" => false,
            other => return Err(EndpointError::UnsupportedScheme(other.into())),
        };

        let host = url
            .host_str()
            .ok_or_else(|| EndpointError::MissingHost(origin.into()))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self::new(secure, host, "/ws"))
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "wss"
        } else {
            "ws"
        }
    }

    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme(), self.host, self.path)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url())
    }
}
