use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Todo, TodoError, TodoId, TodoStore, validate_body};

/// In-process store: an ordered list behind one mutex.
///
/// Identifiers are a counter starting at 1. Deleted ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<Todo>,
    last_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    fn parse_id(&self, raw: &str) -> Result<TodoId, TodoError> {
        // `u64::from_str` also takes a leading `+`
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TodoError::InvalidId);
        }
        raw.parse().map(TodoId::Seq).map_err(|_| TodoError::InvalidId)
    }

    async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        Ok(self.inner.lock().await.todos.clone())
    }

    async fn create(&self, body: String) -> Result<Todo, TodoError> {
        validate_body(&body)?;

        let mut inner = self.inner.lock().await;
        inner.last_id += 1;
        let todo = Todo { id: TodoId::Seq(inner.last_id), completed: false, body };
        inner.todos.push(todo.clone());
        Ok(todo)
    }

    async fn complete(&self, id: &TodoId) -> Result<Todo, TodoError> {
        let mut inner = self.inner.lock().await;
        let todo = inner.todos.iter_mut()
            .find(|t| &t.id == id)
            .ok_or(TodoError::NotFound)?;
        todo.completed = true;
        Ok(todo.clone())
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let mut inner = self.inner.lock().await;
        let pos = inner.todos.iter()
            .position(|t| &t.id == id)
            .ok_or(TodoError::NotFound)?;
        inner.todos.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_increase_from_one_and_are_not_reused() {
        let store = MemoryStore::new();
        let a = store.create("a".into()).await.unwrap();
        let b = store.create("b".into()).await.unwrap();
        store.delete(&b.id).await.unwrap();
        let c = store.create("c".into()).await.unwrap();

        assert_eq!(a.id, TodoId::Seq(1));
        assert_eq!(b.id, TodoId::Seq(2));
        assert_eq!(c.id, TodoId::Seq(3));
    }

    #[tokio::test]
    async fn empty_body_stores_nothing() {
        let store = MemoryStore::new();
        assert!(matches!(store.create(String::new()).await, Err(TodoError::EmptyBody)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_flips_only_the_flag() {
        let store = MemoryStore::new();
        let todo = store.create("buy milk".into()).await.unwrap();

        let done = store.complete(&todo.id).await.unwrap();
        assert!(done.completed);
        assert_eq!(done.body, "buy milk");
        assert_eq!(store.list().await.unwrap(), vec![done.clone()]);

        // completing again is idempotent
        assert_eq!(store.complete(&todo.id).await.unwrap(), done);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.complete(&TodoId::Seq(9)).await, Err(TodoError::NotFound)));
        assert!(matches!(store.delete(&TodoId::Seq(9)).await, Err(TodoError::NotFound)));
        assert!(matches!(
            store.complete(&TodoId::Key("abc".into())).await,
            Err(TodoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = MemoryStore::new();
        for body in ["one", "two", "three"] {
            store.create(body.into()).await.unwrap();
        }
        let bodies: Vec<_> = store.list().await.unwrap().into_iter().map(|t| t.body).collect();
        assert_eq!(bodies, ["one", "two", "three"]);
    }

    #[test]
    fn parse_id_accepts_only_integers() {
        let store = MemoryStore::new();
        assert_eq!(store.parse_id("42").unwrap(), TodoId::Seq(42));
        assert!(matches!(store.parse_id("abc"), Err(TodoError::InvalidId)));
        assert!(matches!(store.parse_id("-1"), Err(TodoError::InvalidId)));
        assert!(matches!(store.parse_id("+1"), Err(TodoError::InvalidId)));
        assert!(matches!(store.parse_id(""), Err(TodoError::InvalidId)));
    }
}
