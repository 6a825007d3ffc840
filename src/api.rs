//! The `/api/todos` HTTP surface.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/api/todos` | 200, array of todos |
//! | POST | `/api/todos` | 201, the created todo |
//! | PATCH | `/api/todos/{id}` | 200, the completed todo |
//! | DELETE | `/api/todos/{id}` | 200, `{"success":true}` |
//!
//! Failures answer `{"error": message}` with 400, 404 or 500.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::handler::with_state;
use crate::health;
use crate::todo::{SharedStore, Todo, TodoError, TodoId};
use crate::{IntoResponse, Json, Method, Request, Response, Router, Status};

/// Builds the application router around `store`.
pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .on(Method::Get,    "/api/todos",      with_state(store.clone(), list))
        .on(Method::Post,   "/api/todos",      with_state(store.clone(), create))
        .on(Method::Patch,  "/api/todos/{id}", with_state(store.clone(), complete))
        .on(Method::Delete, "/api/todos/{id}", with_state(store.clone(), delete))
        .on(Method::Get,    "/healthz",        health::liveness)
        .on(Method::Get,    "/readyz",         with_state(store, health::readiness))
}

#[derive(Debug, Deserialize)]
struct NewTodo {
    #[serde(default)]
    body: String,
}

#[derive(Debug, Serialize)]
struct Success {
    success: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EmptyBody | Self::InvalidBody | Self::InvalidId => Status::BadRequest,
            Self::NotFound => Status::NotFound,
            Self::Backend(e) => {
                error!("store failure: {e}");
                return (
                    Status::InternalServerError,
                    Json(ErrorBody { error: "Internal server error".into() }),
                )
                    .into_response();
            }
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

fn id_param(store: &SharedStore, req: &Request) -> Result<TodoId, TodoError> {
    store.parse_id(req.param("id").unwrap_or_default())
}

// GET /api/todos
async fn list(store: SharedStore, _req: Request) -> Result<Json<Vec<Todo>>, TodoError> {
    Ok(Json(store.list().await?))
}

// POST /api/todos
async fn create(store: SharedStore, req: Request) -> Result<(Status, Json<Todo>), TodoError> {
    let new: NewTodo = req.json().map_err(|_| TodoError::InvalidBody)?;
    let todo = store.create(new.body).await?;
    Ok((Status::Created, Json(todo)))
}

// PATCH /api/todos/{id}
async fn complete(store: SharedStore, req: Request) -> Result<Json<Todo>, TodoError> {
    let id = id_param(&store, &req)?;
    Ok(Json(store.complete(&id).await?))
}

// DELETE /api/todos/{id}
async fn delete(store: SharedStore, req: Request) -> Result<Json<Success>, TodoError> {
    let id = id_param(&store, &req)?;
    store.delete(&id).await?;
    Ok(Json(Success { success: true }))
}
