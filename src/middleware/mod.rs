//! Middleware layer.
//!
//! Cross-cutting concerns applied by the [`Router`](crate::Router) around
//! every request, before and after the matched handler runs:
//!
//! - [`trace`]: per-request span with method, path, status and latency
//! - [`Cors`]: CORS preflight answers and response headers

mod cors;
pub mod trace;

pub use cors::Cors;
