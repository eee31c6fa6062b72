//! Per-call request options.
//!
//! # Design
//! `RequestOptions` replaces a loosely-typed option bag with named fields.
//! `Default` carries the documented defaults, and `normalize` folds
//! "present but empty" values into those defaults before a request is built.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::http::HttpMethod;

/// Login and password for HTTP Basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    pub login: String,
    pub password: String,
}

impl Auth {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Credentials are only usable when both halves are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.login.is_empty() && !self.password.is_empty()
    }
}

/// Low-level request settings applied verbatim, in order, after the client's
/// own settings. Later entries win over earlier ones and over the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOption {
    /// Send with this method regardless of the verb called.
    Method(HttpMethod),
    /// Set a header, replacing any header of the same name.
    Header(String, String),
    /// Replace the request body with this raw text.
    Body(String),
    /// Basic credentials, attached even if either half is empty.
    Credentials(String, String),
    /// Upper bound for the whole exchange.
    Timeout(Duration),
    /// Treat HTTP status >= 400 as a failed request.
    FailOnError,
}

/// Options for a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub transport: Vec<TransportOption>,
    pub associative: bool,
    pub auth: Option<Auth>,
    pub postfields: Value,
    pub safe: bool,
    pub json: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            transport: Vec::new(),
            associative: false,
            auth: None,
            postfields: Value::Object(Map::new()),
            safe: false,
            json: false,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport_option(mut self, option: TransportOption) -> Self {
        self.transport.push(option);
        self
    }

    pub fn with_associative(mut self, associative: bool) -> Self {
        self.associative = associative;
        self
    }

    pub fn with_auth(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Auth::new(login, password));
        self
    }

    pub fn with_postfields(mut self, postfields: Value) -> Self {
        self.postfields = postfields;
        self
    }

    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Fill empty fields with their defaults, leaving everything else as is.
    pub fn normalize(mut self) -> Self {
        if self.postfields.is_null() {
            self.postfields = Value::Object(Map::new());
        }
        if self.credentials().is_none() {
            self.auth = None;
        }
        self
    }

    /// Credentials to attach, if both halves are present.
    pub(crate) fn credentials(&self) -> Option<&Auth> {
        self.auth.as_ref().filter(|auth| auth.is_complete())
    }

    /// `postfields` as a JSON request body; `null` is sent as `{}`.
    pub(crate) fn json_body(&self) -> Result<String, serde_json::Error> {
        if self.postfields.is_null() {
            return Ok("{}".to_string());
        }
        serde_json::to_string(&self.postfields)
    }

    pub(crate) fn fail_on_error(&self) -> bool {
        self.transport.contains(&TransportOption::FailOnError)
    }
}
