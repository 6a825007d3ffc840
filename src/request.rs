//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::method::Method;
use crate::response::Response;
use crate::status::Status;

/// An incoming HTTP request with its body fully buffered.
///
/// Body-size limits belong to the reverse proxy in front of the service, so
/// the body is collected in one go before the handler runs.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// A request with no headers and an empty body. Mostly useful in tests
    /// together with [`Router::call`](crate::Router::call).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Buffers a hyper request into a [`Request`].
    ///
    /// Methods outside RFC 9110 are answered with `405` here; a body that
    /// cannot be read is answered with `400`.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self, Response> {
        let (parts, body) = req.into_parts();

        let method = Method::try_from(&parts.method)
            .map_err(|()| Response::status(Status::MethodNotAllowed))?;

        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!("failed to read request body: {e}");
                return Err(Response::status(Status::BadRequest));
            }
        };

        Ok(Self {
            method,
            path: parts.uri.path().to_owned(),
            headers,
            body,
            params: HashMap::new(),
        })
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/todos/{id}`, `req.param("id")` on `/api/todos/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Payload {
        body: String,
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::Get, "/").with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn json_body_parses() {
        let req = Request::new(Method::Post, "/").with_body(r#"{"body":"buy milk"}"#);
        let payload: Payload = req.json().unwrap();
        assert_eq!(payload.body, "buy milk");
    }

    #[test]
    fn json_body_rejects_garbage() {
        let req = Request::new(Method::Post, "/").with_body("body=buy+milk");
        assert!(req.json::<Payload>().is_err());
    }
}
