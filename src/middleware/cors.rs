//! Cross-origin resource sharing.

use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// CORS policy applied by the router.
///
/// Defaults mirror what a browser frontend on another origin needs for a
/// JSON API: `GET, POST, PATCH, DELETE, OPTIONS`, the `Origin`,
/// `Content-Type` and `Accept` request headers, and credentials allowed.
///
/// ```rust
/// use todos::{Router, middleware::Cors};
///
/// let app = Router::new().with_cors(Cors::new(["http://localhost:5173"]));
/// ```
#[derive(Clone, Debug)]
pub struct Cors {
    allow_origins: Vec<String>,
    allow_methods: Vec<Method>,
    allow_headers: Vec<String>,
    allow_credentials: bool,
}

impl Cors {
    /// A policy for the given origins. `"*"` allows any origin.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_origins: origins.into_iter().map(Into::into).collect(),
            allow_methods: vec![
                Method::Get,
                Method::Post,
                Method::Patch,
                Method::Delete,
                Method::Options,
            ],
            allow_headers: vec!["Origin".into(), "Content-Type".into(), "Accept".into()],
            allow_credentials: true,
        }
    }

    pub fn allow_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allow_methods = methods.into_iter().collect();
        self
    }

    pub fn allow_headers<S: Into<String>>(mut self, headers: impl IntoIterator<Item = S>) -> Self {
        self.allow_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// The `access-control-allow-origin` value for `origin`, if it is allowed.
    ///
    /// A wildcard policy still echoes the concrete origin when credentials
    /// are allowed: browsers reject `*` together with credentials.
    fn allowed_origin<'a>(&self, origin: &'a str) -> Option<&'a str> {
        let wildcard = self.allow_origins.iter().any(|o| o == "*");
        if wildcard && !self.allow_credentials {
            return Some("*");
        }
        if wildcard || self.allow_origins.iter().any(|o| o.eq_ignore_ascii_case(origin)) {
            return Some(origin);
        }
        None
    }

    /// Answers a preflight request, or `None` if `req` is not one.
    pub(crate) fn preflight(&self, req: &Request) -> Option<Response> {
        if req.method() != Method::Options
            || req.header("access-control-request-method").is_none()
        {
            return None;
        }

        let mut res = Response::status(Status::NoContent);
        res.append_header("vary", "origin");

        let Some(origin) = req.header("origin").and_then(|o| self.allowed_origin(o)) else {
            return Some(res);
        };

        let methods = self.allow_methods.iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",");

        res.append_header("access-control-allow-origin", origin);
        res.append_header("access-control-allow-methods", &methods);
        res.append_header("access-control-allow-headers", &self.allow_headers.join(","));
        if self.allow_credentials {
            res.append_header("access-control-allow-credentials", "true");
        }
        Some(res)
    }

    /// Adds CORS headers to a regular response for a request from `origin`.
    pub(crate) fn apply(&self, origin: Option<&str>, res: &mut Response) {
        let Some(origin) = origin.and_then(|o| self.allowed_origin(o)) else {
            return;
        };
        res.append_header("access-control-allow-origin", origin);
        if self.allow_credentials {
            res.append_header("access-control-allow-credentials", "true");
        }
        res.append_header("vary", "origin");
    }
}
