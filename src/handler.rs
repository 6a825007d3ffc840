//! Handler trait, type erasure and shared state.
//!
//! The router stores handlers of different concrete types in one map, so each
//! handler is boxed behind [`ErasedHandler`]:
//!
//! ```text
//! async fn list(req: Request) -> Response { … }    ← user writes this
//!        ↓ router.on(Method::Get, "/", list)
//! list.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(list))                        ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//! ```
//!
//! Handlers that need application state (a store, a client) are built with
//! [`with_state`], which captures the state once and clones it into every
//! call. There is no global registry.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of
/// [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure with the shape
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>`. The trait is
/// sealed; only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Binds `state` to a two-argument handler, producing a [`Handler`].
///
/// `state` is cloned once per request, so it should be cheap to clone
/// (an `Arc`, a driver client).
///
/// ```rust
/// use std::sync::Arc;
/// use todos::{handler, Method, Request, Router};
///
/// async fn count(hits: Arc<u64>, _req: Request) -> String {
///     hits.to_string()
/// }
///
/// let app = Router::new().on(Method::Get, "/hits", handler::with_state(Arc::new(7), count));
/// ```
pub fn with_state<S, F, Fut, R>(state: S, f: F) -> impl Handler
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| f(state.clone(), req)
}
