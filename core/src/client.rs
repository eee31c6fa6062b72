//! Request building, execution, and response interpretation.
//!
//! # Design
//! `RequestClient` holds an immutable `ClientConfig` and a `Transport`; it
//! carries no mutable state between calls. Each verb is split into a
//! `build_*` step that produces an `HttpRequest` and a shared
//! `parse_response` step, so the I/O boundary stays explicit and both halves
//! can be tested without a network. `get`/`post`/`put`/`delete` chain the
//! two around a single `Transport::execute`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::config::{ClientConfig, EmptyBodyPolicy};
use crate::error::{ClientError, ConfigError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::{RequestOptions, TransportOption};
use crate::reply::Reply;
use crate::transport::{Transport, UreqTransport};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Appended to the URL of a safe DELETE.
pub const SAFE_DELETE_SUFFIX: &str = "/destroy";

/// Body sent with a safe DELETE.
pub const SAFE_DELETE_BODY: &str = r#"{"_method":"put"}"#;

/// Synchronous REST client.
#[derive(Debug, Clone)]
pub struct RequestClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl RequestClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Client whose URLs are prefixed with `server:port`.
    pub fn with_server(server: &str, port: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(ClientConfig::with_server(server, port)?))
    }
}

impl Default for RequestClient<UreqTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::new())
    }
}

impl<T: Transport> RequestClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> Result<Reply, ClientError> {
        self.call(HttpMethod::Get, url, options)
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> Result<Reply, ClientError> {
        self.call(HttpMethod::Post, url, options)
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> Result<Reply, ClientError> {
        self.call(HttpMethod::Put, url, options)
    }

    /// DELETE, or with `options.safe` a GET to `url + "/destroy"` carrying
    /// `{"_method":"put"}`.
    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<Reply, ClientError> {
        self.call(HttpMethod::Delete, url, options)
    }

    fn call(
        &self,
        verb: HttpMethod,
        url: &str,
        options: RequestOptions,
    ) -> Result<Reply, ClientError> {
        let options = options.normalize();
        let request = self.build(verb, url, &options)?;
        let outcome = self.transport.execute(&request);
        self.parse_response(verb, outcome, &options)
    }

    pub fn build_get(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Get, url, options)
    }

    pub fn build_post(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Post, url, options)
    }

    pub fn build_put(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Put, url, options)
    }

    pub fn build_delete(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Delete, url, options)
    }

    /// Build the request `verb` would send for `url`.
    ///
    /// Transport options are applied last and may override anything the
    /// client set, including the method.
    pub fn build(
        &self,
        verb: HttpMethod,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        let target = self.config.resolve(url);

        let mut request = match verb {
            HttpMethod::Get => HttpRequest::new(HttpMethod::Get, target),
            HttpMethod::Post | HttpMethod::Put => {
                let body = options
                    .json_body()
                    .map_err(|e| ClientError::Serialization(e.to_string()))?;
                let mut request = HttpRequest::new(verb, target);
                request.set_header("content-type", JSON_CONTENT_TYPE);
                request.body = Some(body);
                request
            }
            HttpMethod::Delete if options.safe => {
                let mut request =
                    HttpRequest::new(HttpMethod::Get, format!("{target}{SAFE_DELETE_SUFFIX}"));
                request.body = Some(SAFE_DELETE_BODY.to_string());
                request
            }
            HttpMethod::Delete => HttpRequest::new(HttpMethod::Delete, target),
        };

        if let Some(auth) = options.credentials() {
            request.set_header("authorization", basic_credentials(&auth.login, &auth.password));
        }

        apply_transport_options(&mut request, &options.transport);

        tracing::debug!(
            verb = %verb,
            method = %request.method,
            url = %request.url,
            "built request"
        );
        Ok(request)
    }

    /// Interpret what the transport returned for a `verb` call.
    ///
    /// A transport error with a message fails the call. A transport error
    /// without one, like a response with an empty body, is an empty outcome
    /// handled according to the configured `EmptyBodyPolicy`.
    pub fn parse_response(
        &self,
        verb: HttpMethod,
        outcome: Result<HttpResponse, TransportError>,
        options: &RequestOptions,
    ) -> Result<Reply, ClientError> {
        let response = match outcome {
            Ok(response) => response,
            Err(err) if err.is_silent() => {
                tracing::warn!(
                    verb = %verb,
                    "transport failed without a diagnostic, reporting an empty response"
                );
                return self.empty_reply(verb);
            }
            Err(err) => {
                tracing::debug!(verb = %verb, error = %err, "request failed");
                return Err(ClientError::RequestFailed {
                    verb,
                    message: err.message,
                });
            }
        };

        if options.fail_on_error() && response.status >= 400 {
            return Err(ClientError::HttpStatus {
                verb,
                status: response.status,
                body: response.body,
            });
        }

        if response.body.is_empty() {
            tracing::debug!(verb = %verb, status = response.status, "empty response body");
            return self.empty_reply(verb);
        }

        if !options.json {
            return Ok(Reply::Text(response.body));
        }

        decode(verb, &response.body, options.associative)
    }

    fn empty_reply(&self, verb: HttpMethod) -> Result<Reply, ClientError> {
        match self.config.empty_body() {
            EmptyBodyPolicy::Success => Ok(Reply::Empty),
            EmptyBodyPolicy::Error => Err(ClientError::EmptyResponse { verb }),
        }
    }
}

fn apply_transport_options(request: &mut HttpRequest, overrides: &[TransportOption]) {
    for option in overrides {
        match option {
            TransportOption::Method(method) => request.method = *method,
            TransportOption::Header(name, value) => request.set_header(name, value.as_str()),
            TransportOption::Body(body) => request.body = Some(body.clone()),
            TransportOption::Credentials(login, password) => {
                request.set_header("authorization", basic_credentials(login, password));
            }
            TransportOption::Timeout(timeout) => request.timeout = Some(*timeout),
            TransportOption::FailOnError => {}
        }
    }
}

fn basic_credentials(login: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{login}:{password}")))
}

fn decode(verb: HttpMethod, body: &str, associative: bool) -> Result<Reply, ClientError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ClientError::Decode {
        verb,
        message: e.to_string(),
    })?;
    Ok(match value {
        Value::Object(map) if associative => Reply::Mapping(map),
        value => Reply::Structured(value),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    type Scripted = fn(&HttpRequest) -> Result<HttpResponse, TransportError>;

    fn unused(_: &HttpRequest) -> Result<HttpResponse, TransportError> {
        unreachable!("transport not expected to run")
    }

    fn client() -> RequestClient<Scripted> {
        let config = ClientConfig::with_server("http://api.example.com", "8080").unwrap();
        RequestClient::with_transport(config, unused as Scripted)
    }

    fn ok(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(200, body))
    }

    #[test]
    fn build_get_targets_prefixed_url_without_body() {
        let req = client().build_get("/users", &RequestOptions::new()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://api.example.com:8080/users");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_post_serializes_postfields() {
        let options = RequestOptions::new().with_postfields(json!({"name": "a"}));
        let req = client().build_post("/users", &options).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"a"}"#));
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_put_sends_empty_object_by_default() {
        let req = client().build_put("/users/1", &RequestOptions::new()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn build_post_with_null_postfields_sends_empty_object() {
        let options = RequestOptions::new().with_postfields(Value::Null);
        let req = client().build_post("/users", &options).unwrap();
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn build_delete_is_a_true_delete() {
        let req = client().build_delete("/users/5", &RequestOptions::new()).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://api.example.com:8080/users/5");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_safe_delete_becomes_get_to_destroy() {
        let options = RequestOptions::new().with_safe(true);
        let req = client().build_delete("/users/5", &options).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://api.example.com:8080/users/5/destroy");
        assert_eq!(req.body.as_deref(), Some(r#"{"_method":"put"}"#));
    }

    #[test]
    fn safe_flag_only_affects_delete() {
        let options = RequestOptions::new().with_safe(true);
        let req = client().build_get("/users/5", &options).unwrap();
        assert_eq!(req.url, "http://api.example.com:8080/users/5");
    }

    #[test]
    fn basic_auth_requires_both_halves() {
        let options = RequestOptions::new().with_auth("login", "senha");
        let req = client().build_get("/", &options).unwrap();
        assert_eq!(req.header("authorization"), Some("Basic bG9naW46c2VuaGE="));

        for options in [
            RequestOptions::new().with_auth("login", ""),
            RequestOptions::new().with_auth("", "senha"),
        ] {
            let req = client().build_get("/", &options).unwrap();
            assert_eq!(req.header("authorization"), None);
        }
    }

    #[test]
    fn transport_options_override_client_settings() {
        let options = RequestOptions::new()
            .with_postfields(json!({"a": 1}))
            .with_auth("login", "senha")
            .with_transport_option(TransportOption::Method(HttpMethod::Put))
            .with_transport_option(TransportOption::Header(
                "Content-Type".to_string(),
                "text/plain".to_string(),
            ))
            .with_transport_option(TransportOption::Body("raw".to_string()))
            .with_transport_option(TransportOption::Credentials("u".to_string(), String::new()))
            .with_transport_option(TransportOption::Timeout(Duration::from_secs(3)));
        let req = client().build_post("/x", &options).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.body.as_deref(), Some("raw"));
        assert_eq!(req.header("authorization"), Some("Basic dTo="));
        assert_eq!(req.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn literal_urls_without_server() {
        let client = RequestClient::with_transport(ClientConfig::new(), unused as Scripted);
        let req = client.build_get("http://localhost/x", &RequestOptions::new()).unwrap();
        assert_eq!(req.url, "http://localhost/x");
    }

    #[test]
    fn parse_associative_object_to_mapping() {
        let options = RequestOptions::new().with_json(true).with_associative(true);
        let reply = client()
            .parse_response(HttpMethod::Get, ok(r#"{"id":1}"#), &options)
            .unwrap();
        let Value::Object(expected) = json!({"id": 1}) else {
            unreachable!()
        };
        assert_eq!(reply, Reply::Mapping(expected));
    }

    #[test]
    fn parse_non_associative_to_structured() {
        let options = RequestOptions::new().with_json(true);
        let reply = client()
            .parse_response(HttpMethod::Get, ok(r#"{"id":1}"#), &options)
            .unwrap();
        assert_eq!(reply, Reply::Structured(json!({"id": 1})));

        let options = options.with_associative(true);
        let reply = client()
            .parse_response(HttpMethod::Get, ok("[1,2]"), &options)
            .unwrap();
        assert_eq!(reply, Reply::Structured(json!([1, 2])));
    }

    #[test]
    fn parse_raw_text_unchanged() {
        let reply = client()
            .parse_response(HttpMethod::Post, ok("  not json "), &RequestOptions::new())
            .unwrap();
        assert_eq!(reply, Reply::Text("  not json ".to_string()));
    }

    #[test]
    fn parse_bad_json_is_decode_error() {
        let options = RequestOptions::new().with_json(true);
        let err = client()
            .parse_response(HttpMethod::Put, ok("not json"), &options)
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { verb: HttpMethod::Put, .. }));
    }

    #[test]
    fn parse_empty_body_is_true() {
        let options = RequestOptions::new().with_json(true);
        let reply = client()
            .parse_response(HttpMethod::Get, ok(""), &options)
            .unwrap();
        assert!(reply.is_true());
    }

    #[test]
    fn parse_silent_transport_failure_is_true() {
        let reply = client()
            .parse_response(
                HttpMethod::Delete,
                Err(TransportError::silent()),
                &RequestOptions::new(),
            )
            .unwrap();
        assert_eq!(reply, Reply::Empty);
    }

    #[test]
    fn parse_transport_failure_carries_verb_and_message() {
        let err = client()
            .parse_response(
                HttpMethod::Delete,
                Err(TransportError::new("connection refused")),
                &RequestOptions::new(),
            )
            .unwrap_err();
        assert_eq!(err.verb(), Some(HttpMethod::Delete));
        match err {
            ClientError::RequestFailed { message, .. } => assert_eq!(message, "connection refused"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_policy_error_rejects_empty_outcomes() {
        let config = ClientConfig::new().empty_body_policy(EmptyBodyPolicy::Error);
        let client = RequestClient::with_transport(config, unused as Scripted);
        let err = client
            .parse_response(HttpMethod::Get, ok(""), &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptyResponse { verb: HttpMethod::Get }));
        let err = client
            .parse_response(HttpMethod::Get, Err(TransportError::silent()), &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptyResponse { .. }));
    }

    #[test]
    fn error_statuses_are_bodies_unless_fail_on_error() {
        let response = || Ok(HttpResponse::new(404, "missing"));
        let reply = client()
            .parse_response(HttpMethod::Get, response(), &RequestOptions::new())
            .unwrap();
        assert_eq!(reply.as_text(), Some("missing"));

        let options = RequestOptions::new().with_transport_option(TransportOption::FailOnError);
        let err = client()
            .parse_response(HttpMethod::Get, response(), &options)
            .unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn delete_runs_through_transport() {
        let seen = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            seen.borrow_mut().push(req.clone());
            Ok(HttpResponse::new(200, r#"{"deleted":true}"#))
        };
        let config = ClientConfig::with_server("http://api.example.com", "8080").unwrap();
        let client = RequestClient::with_transport(config, transport);

        let reply = client
            .delete("/users/5", RequestOptions::new().with_safe(true).with_json(true))
            .unwrap();
        assert_eq!(reply, Reply::Structured(json!({"deleted": true})));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "http://api.example.com:8080/users/5/destroy");
    }
}
