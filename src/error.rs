//! Unified error type.

use crate::todo::TodoError;

/// The error type returned by the crate's fallible startup operations.
///
/// Application-level errors (400, 404, ...) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: reading configuration, reaching the store,
/// binding the port.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("store: {0}")]
    Store(#[from] TodoError),
}
