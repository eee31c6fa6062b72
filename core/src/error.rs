//! Error types for the REST client.
//!
//! # Design
//! Every failure is returned to the caller; nothing is printed and swallowed.
//! Errors produced while running a verb carry that verb, which is the method
//! the caller invoked (a safe DELETE reports `DELETE` even though it travels
//! as a GET).

use thiserror::Error;

use crate::http::HttpMethod;

/// Errors returned by `RequestClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport failed and reported a diagnostic message.
    #[error("request via {verb} failed: {message}")]
    RequestFailed { verb: HttpMethod, message: String },

    /// The server answered with status >= 400 and `FailOnError` was set.
    #[error("{verb} returned HTTP {status}: {body}")]
    HttpStatus {
        verb: HttpMethod,
        status: u16,
        body: String,
    },

    /// No body and no error, with `EmptyBodyPolicy::Error` in effect.
    #[error("{verb} produced an empty response")]
    EmptyResponse { verb: HttpMethod },

    /// JSON decoding was requested but the body is not valid JSON.
    #[error("could not decode {verb} response as JSON: {message}")]
    Decode { verb: HttpMethod, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// The verb the failing call was made with, if the error came from one.
    pub fn verb(&self) -> Option<HttpMethod> {
        match self {
            ClientError::RequestFailed { verb, .. }
            | ClientError::HttpStatus { verb, .. }
            | ClientError::EmptyResponse { verb }
            | ClientError::Decode { verb, .. } => Some(*verb),
            ClientError::Serialization(_) | ClientError::Config(_) => None,
        }
    }
}

/// Invalid `ClientConfig` input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("server address must not be empty")]
    EmptyServer,

    #[error("invalid port {0:?}: expected a number between 1 and 65535")]
    InvalidPort(String),
}

/// A failure reported by a [`Transport`](crate::transport::Transport).
///
/// An empty `message` means the transport gave up without a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A failure without any diagnostic text.
    pub fn silent() -> Self {
        Self::new("")
    }

    pub fn is_silent(&self) -> bool {
        self.message.trim().is_empty()
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError::new(err.to_string())
    }
}
