//! Executing `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `UreqTransport` acquires a
//! fresh agent for every call and drops it before returning, so no connection
//! state outlives a request on any exit path. Closures implement `Transport`
//! too, which lets tests script responses.

use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a request described as plain data.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// HTTP error statuses come back as ordinary responses; interpreting them is
/// left to the client. Bodies are read without a size cap, and bytes that are
/// not valid UTF-8 are replaced instead of failing the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn agent(request: &HttpRequest) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(request.timeout)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = Self::agent(request);
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref().map(str::as_bytes);

        let mut response = match (request.method, body) {
            (HttpMethod::Get, None) => with_headers(agent.get(url), headers).call(),
            (HttpMethod::Get, Some(body)) => {
                with_headers(agent.get(url).force_send_body(), headers).send(body)
            }
            (HttpMethod::Delete, None) => with_headers(agent.delete(url), headers).call(),
            (HttpMethod::Delete, Some(body)) => {
                with_headers(agent.delete(url).force_send_body(), headers).send(body)
            }
            (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), headers).send(body),
            (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), headers).send(body),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        let body = match String::from_utf8(bytes) {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(url, "response body is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}
