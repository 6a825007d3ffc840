use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Todo, TodoError, TodoId, TodoStore, validate_body};

/// A todo as stored in MongoDB. `_id` is left out on insert so the server
/// assigns it.
#[derive(Debug, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    body: String,
}

impl TryFrom<TodoDocument> for Todo {
    type Error = TodoError;

    fn try_from(doc: TodoDocument) -> Result<Self, Self::Error> {
        let id = doc.id.ok_or_else(|| TodoError::backend("todo document without _id"))?;
        Ok(Todo { id: TodoId::Key(id.to_hex()), completed: doc.completed, body: doc.body })
    }
}

fn parse_object_id(raw: &str) -> Result<ObjectId, TodoError> {
    ObjectId::parse_str(raw).map_err(|_| TodoError::InvalidId)
}

fn object_id(id: &TodoId) -> Result<ObjectId, TodoError> {
    match id {
        TodoId::Key(key) => parse_object_id(key),
        TodoId::Seq(_) => Err(TodoError::InvalidId),
    }
}

/// MongoDB-backed store. One document per todo, keyed by `_id`.
///
/// Cloning is cheap: the driver pools connections behind the client.
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
    todos: Collection<TodoDocument>,
}

impl MongoStore {
    /// Connects to `uri` and verifies the deployment answers a ping.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, TodoError> {
        let client = Client::with_uri_str(uri).await.map_err(TodoError::backend)?;
        let store = Self::new(&client, database, collection);
        store.ping().await?;
        info!(database, collection, "connected to MongoDB");
        Ok(store)
    }

    pub fn new(client: &Client, database: &str, collection: &str) -> Self {
        let db = client.database(database);
        let todos = db.collection(collection);
        Self { db, todos }
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    fn parse_id(&self, raw: &str) -> Result<TodoId, TodoError> {
        parse_object_id(raw).map(|oid| TodoId::Key(oid.to_hex()))
    }

    async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        let docs: Vec<TodoDocument> = self.todos
            .find(doc! {})
            .await
            .map_err(TodoError::backend)?
            .try_collect()
            .await
            .map_err(TodoError::backend)?;

        docs.into_iter().map(Todo::try_from).collect()
    }

    async fn create(&self, body: String) -> Result<Todo, TodoError> {
        validate_body(&body)?;

        let doc = TodoDocument { id: None, completed: false, body };
        let inserted = self.todos.insert_one(&doc).await.map_err(TodoError::backend)?;
        let oid = inserted.inserted_id
            .as_object_id()
            .ok_or_else(|| TodoError::backend("insert returned a non-ObjectId _id"))?;

        debug!(id = %oid, "todo inserted");
        Ok(Todo { id: TodoId::Key(oid.to_hex()), completed: doc.completed, body: doc.body })
    }

    async fn complete(&self, id: &TodoId) -> Result<Todo, TodoError> {
        let oid = object_id(id)?;
        let updated = self.todos
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": { "completed": true } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(TodoError::backend)?;

        updated.ok_or(TodoError::NotFound)?.try_into()
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let oid = object_id(id)?;
        let result = self.todos
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(TodoError::backend)?;

        if result.deleted_count == 0 {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), TodoError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(TodoError::backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn new_document_leaves_id_to_the_server() {
        let doc = TodoDocument { id: None, completed: false, body: "buy milk".into() };
        let bson = bson::to_document(&doc).unwrap();

        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_str("body").unwrap(), "buy milk");
        assert!(!bson.get_bool("completed").unwrap());
    }

    #[test]
    fn stored_document_converts_to_todo() {
        let oid = ObjectId::new();
        let stored = bson::doc! { "_id": oid, "completed": true, "body": "walk dog" };
        let doc: TodoDocument = bson::from_document(stored).unwrap();
        let todo = Todo::try_from(doc).unwrap();

        assert_eq!(todo.id, TodoId::Key(oid.to_hex()));
        assert!(todo.completed);
        assert_eq!(todo.body, "walk dog");
    }

    #[test]
    fn document_without_id_is_a_backend_error() {
        let doc = TodoDocument { id: None, completed: false, body: "x".into() };
        assert!(matches!(Todo::try_from(doc), Err(TodoError::Backend(_))));
    }

    #[test]
    fn ids_must_be_object_id_hex() {
        let oid = ObjectId::new();
        assert_eq!(object_id(&TodoId::Key(oid.to_hex())).unwrap(), oid);
        assert!(matches!(parse_object_id("42"), Err(TodoError::InvalidId)));
        assert!(matches!(object_id(&TodoId::Seq(1)), Err(TodoError::InvalidId)));
    }
}
