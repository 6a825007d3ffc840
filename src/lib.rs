//! # todos
//!
//! A minimal todo-list REST API.
//!
//! Four routes over one three-field record, backed by an in-memory list or
//! a MongoDB collection:
//!
//! - `GET /api/todos`: list
//! - `POST /api/todos`: create from `{"body": "..."}`
//! - `PATCH /api/todos/{id}`: mark completed
//! - `DELETE /api/todos/{id}`: remove
//!
//! The HTTP layer underneath is deliberately small: radix-tree routing via
//! [`matchit`], hyper for the wire, graceful shutdown on SIGTERM / Ctrl-C.
//! TLS, rate limiting and body-size limits belong to the reverse proxy.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use todos::{Server, api, todo::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), todos::Error> {
//!     let app = api::routes(Arc::new(MemoryStore::new()));
//!     Server::bind("127.0.0.1:5000".parse().unwrap()).serve(app).await
//! }
//! ```
//!
//! The store is an ordinary value passed into [`api::routes`]; tests build
//! their own and drive the router with [`Router::call`].

mod error;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod handler;
pub mod health;
pub mod middleware;
pub mod todo;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;

use middleware::Cors;

/// Opens the configured store and serves the API until shutdown.
pub async fn run(config: Config) -> Result<(), Error> {
    let store = todo::open(&config.store).await?;
    let app = api::routes(store).with_cors(Cors::new(config.cors_origins));
    Server::bind(config.addr).serve(app).await
}
