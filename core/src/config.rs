//! Client-wide configuration.
//!
//! A `ClientConfig` is validated when it is built and never changes
//! afterwards. Every request resolves its URL through it.

use serde::Deserialize;

use crate::error::ConfigError;

/// What to do when a call ends with neither a body nor an error message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBodyPolicy {
    /// Report `Reply::Empty`, the "boolean true" outcome.
    #[default]
    Success,
    /// Report `ClientError::EmptyResponse`.
    Error,
}

/// Server prefix and response policy shared by every call of a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawClientConfig")]
pub struct ClientConfig {
    server: Option<Server>,
    empty_body: EmptyBodyPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Server {
    host: String,
    port: String,
}

impl ClientConfig {
    /// A client that requests literal URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that prefixes every URL with `server:port`.
    pub fn with_server(server: &str, port: &str) -> Result<Self, ConfigError> {
        if server.trim().is_empty() {
            return Err(ConfigError::EmptyServer);
        }
        match port.parse::<u16>() {
            Ok(p) if p > 0 && port.bytes().all(|b| b.is_ascii_digit()) => {}
            _ => return Err(ConfigError::InvalidPort(port.to_string())),
        }
        Ok(Self {
            server: Some(Server {
                host: server.to_string(),
                port: port.to_string(),
            }),
            empty_body: EmptyBodyPolicy::default(),
        })
    }

    /// Server prefix only when both parts are given; otherwise literal URLs.
    pub fn from_parts(server: Option<&str>, port: Option<&str>) -> Result<Self, ConfigError> {
        match (server, port) {
            (Some(server), Some(port)) => Self::with_server(server, port),
            _ => Ok(Self::new()),
        }
    }

    pub fn empty_body_policy(mut self, policy: EmptyBodyPolicy) -> Self {
        self.empty_body = policy;
        self
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_ref().map(|s| s.host.as_str())
    }

    pub fn port(&self) -> Option<&str> {
        self.server.as_ref().map(|s| s.port.as_str())
    }

    pub fn empty_body(&self) -> EmptyBodyPolicy {
        self.empty_body
    }

    /// Effective request target for `url`.
    pub fn resolve(&self, url: &str) -> String {
        match &self.server {
            Some(Server { host, port }) => format!("{host}:{port}{url}"),
            None => url.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawClientConfig {
    server: Option<String>,
    port: Option<String>,
    #[serde(default)]
    empty_body: EmptyBodyPolicy,
}

impl TryFrom<RawClientConfig> for ClientConfig {
    type Error = ConfigError;

    fn try_from(raw: RawClientConfig) -> Result<Self, Self::Error> {
        Ok(ClientConfig::from_parts(raw.server.as_deref(), raw.port.as_deref())?
            .empty_body_policy(raw.empty_body))
    }
}
