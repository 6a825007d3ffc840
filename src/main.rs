//! Todo API server.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:5000/api/todos
//!   curl -X POST http://localhost:5000/api/todos \
//!        -H 'content-type: application/json' \
//!        -d '{"body":"buy milk"}'
//!   curl -X PATCH  http://localhost:5000/api/todos/1
//!   curl -X DELETE http://localhost:5000/api/todos/1

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use todos::Config;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = match Config::from_env() {
        Ok(config) => todos::run(config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
