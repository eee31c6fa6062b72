//! Synchronous REST client over JSON.
//!
//! # Overview
//! `RequestClient` sends GET/POST/PUT/DELETE requests to a literal URL or to
//! a URL prefixed with a configured `server:port`. Per-call `RequestOptions`
//! control Basic authentication, the JSON request payload, JSON decoding of
//! the response, low-level transport overrides, and "safe delete", which
//! replaces DELETE with a GET to `<url>/destroy` for servers behind
//! intermediaries that block the DELETE verb.
//!
//! # Design
//! - Request building and response interpretation never touch the network;
//!   `build_*` and `parse_response` can be driven by any host.
//! - `Transport` executes requests. `UreqTransport` is the default and holds
//!   a connection only for the duration of one call.
//! - Every failure is a typed `ClientError`. An empty body with no error is
//!   `Reply::Empty` unless the client is configured to reject it.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod reply;
pub mod transport;

pub use client::RequestClient;
pub use config::{ClientConfig, EmptyBodyPolicy};
pub use error::{ClientError, ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{Auth, RequestOptions, TransportOption};
pub use reply::Reply;
pub use transport::{Transport, UreqTransport};
