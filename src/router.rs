//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Register a path, get a
//! handler; CORS and tracing wrap every dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Cors, trace};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    cors: Option<Cors>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use todos::{Method, Request, Response, Router};
    /// # async fn list(_: Request) -> Response { Response::text("") }
    /// # async fn complete(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,   "/api/todos",      list)
    ///     .on(Method::Patch, "/api/todos/{id}", complete);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Applies `cors` to every request handled by this router.
    pub fn with_cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Routes one request and produces one response.
    ///
    /// `HEAD` falls back to the `GET` route without a body. Unknown paths
    /// answer `404`; a path registered only under other methods answers
    /// `405` with an `allow` header.
    pub async fn call(&self, mut req: Request) -> Response {
        let method = req.method();
        let path = req.path().to_owned();

        trace::instrument(method, &path, async move {
            if let Some(res) = self.cors.as_ref().and_then(|c| c.preflight(&req)) {
                return res;
            }

            let origin = req.header("origin").map(str::to_owned);

            let found = match self.lookup(method, req.path()) {
                Some(hit) => Some((hit, false)),
                None if method == Method::Head => {
                    self.lookup(Method::Get, req.path()).map(|hit| (hit, true))
                }
                None => None,
            };

            let mut res = match found {
                Some(((handler, params), head)) => {
                    req.params = params;
                    let res = handler.call(req).await;
                    if head { without_body(res) } else { res }
                }
                None => self.unmatched(req.path()),
            };

            if let Some(cors) = &self.cors {
                cors.apply(origin.as_deref(), &mut res);
            }
            res
        })
        .await
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn unmatched(&self, path: &str) -> Response {
        let mut allowed: Vec<&str> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| m.as_str())
            .collect();

        if allowed.is_empty() {
            return Response::status(Status::NotFound);
        }
        if allowed.contains(&"GET") && !allowed.contains(&"HEAD") {
            allowed.push("HEAD");
        }

        allowed.sort_unstable();
        Response::builder()
            .status(Status::MethodNotAllowed)
            .header("allow", &allowed.join(", "))
            .no_body()
    }
}

/// A `HEAD` answer built from the `GET` one: same status and headers, the
/// body replaced by its length.
fn without_body(mut res: Response) -> Response {
    let len = res.body.len().to_string();
    res.body.clear();
    res.headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-length"));
    res.append_header("content-length", &len);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(req: Request) -> String {
        req.param("id").unwrap_or_default().to_owned()
    }

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .on(Method::Get, "/items/{id}", echo_id)
            .on(Method::Delete, "/items/{id}", ok)
    }

    #[tokio::test]
    async fn extracts_path_params() {
        let res = app().call(Request::new(Method::Get, "/items/42")).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(res.body(), b"42");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let res = app().call(Request::new(Method::Get, "/nothing")).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }

    #[tokio::test]
    async fn wrong_method_lists_allowed_ones() {
        let res = app().call(Request::new(Method::Put, "/items/1")).await;
        assert_eq!(res.status_code(), Status::MethodNotAllowed);
        assert_eq!(res.header("allow"), Some("DELETE, GET, HEAD"));
    }

    #[tokio::test]
    async fn head_uses_the_get_route_without_a_body() {
        let res = app().call(Request::new(Method::Head, "/items/12345")).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert!(res.body().is_empty());
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(res.header("content-length"), Some("5"));
    }

    #[tokio::test]
    async fn head_on_unknown_path_is_not_found() {
        let res = app().call(Request::new(Method::Head, "/nothing")).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::Get, "/items/{id}", ok)
            .on(Method::Get, "/items/{id}", ok);
    }
}
