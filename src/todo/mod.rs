//! Todo records and the storage capability behind the API.
//!
//! Handlers only ever see [`TodoStore`]. Two backends implement it:
//! [`MemoryStore`] keeps records in process, [`MongoStore`] keeps them in a
//! MongoDB collection. Both answer with the same JSON shapes and the same
//! errors, so the HTTP surface cannot tell them apart.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::StoreConfig;

mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

/// Identifier assigned by the store on create.
///
/// Serialized untagged: a sequence number is a JSON number, a database key
/// is a JSON string.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    /// Process-local sequence number, starting at 1.
    Seq(u64),
    /// Opaque database-assigned key.
    Key(String),
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(n) => write!(f, "{n}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub completed: bool,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("Todo body cannot be empty")]
    EmptyBody,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Invalid todo ID")]
    InvalidId,

    #[error("Todo not found")]
    NotFound,

    #[error("backend: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TodoError {
    pub fn backend(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(e.into())
    }
}

/// Rejects bodies a todo cannot be created with.
pub(crate) fn validate_body(body: &str) -> Result<(), TodoError> {
    if body.is_empty() {
        return Err(TodoError::EmptyBody);
    }
    Ok(())
}

/// Persistence for [`Todo`] records.
///
/// Every operation is independent; implementations provide no ordering
/// between concurrent calls beyond what their backend guarantees.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Parses a raw path segment into this backend's identifier type.
    fn parse_id(&self, raw: &str) -> Result<TodoId, TodoError>;

    /// All todos, in insertion/storage order.
    async fn list(&self) -> Result<Vec<Todo>, TodoError>;

    /// Stores a new, not yet completed todo.
    async fn create(&self, body: String) -> Result<Todo, TodoError>;

    /// Marks a todo completed and returns it. Completing twice is not an error.
    async fn complete(&self, id: &TodoId) -> Result<Todo, TodoError>;

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), TodoError> {
        Ok(())
    }
}

/// The store handle shared by every handler.
pub type SharedStore = Arc<dyn TodoStore>;

/// Opens the backend selected by `config`.
///
/// Remote backends are pinged before this returns, so an unreachable
/// database fails startup instead of the first request.
pub async fn open(config: &StoreConfig) -> Result<SharedStore, TodoError> {
    let store: SharedStore = match config {
        StoreConfig::Memory => {
            info!("using in-memory todo store");
            Arc::new(MemoryStore::new())
        }
        #[cfg(feature = "mongodb")]
        StoreConfig::MongoDb { uri, database, collection } => {
            Arc::new(MongoStore::connect(uri, database, collection).await?)
        }
    };
    Ok(store)
}
