//! HTTP routing layer for the todo service.
//!
//! | Method       | Path          | Success      |
//! |--------------|---------------|--------------|
//! | GET          | `/todos`      | 200 + array  |
//! | POST         | `/todos`      | 201 + item   |
//! | GET          | `/todos/{id}` | 200 + item   |
//! | PATCH or PUT | `/todos/{id}` | 201 + item   |
//! | DELETE       | `/todos/{id}` | 204          |
//!
//! Validation failures are 400 with the field errors, unknown ids are 404,
//! and store failures are 500. PATCH and PUT are both partial updates.

pub mod config;
pub mod error;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use todo_core::{ListQuery, SortOrder, Todo, TodoInput, TodoService};
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ErrorBody};

pub fn app(todos: TodoService) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .patch(update_todo)
                .put(update_todo)
                .delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(todos)
}

pub async fn run(listener: TcpListener, todos: TodoService) -> Result<(), std::io::Error> {
    axum::serve(listener, app(todos)).await
}

/// Query string of `GET /todos`.
///
/// Unrecognised values fall back to the defaults: ascending order and no
/// completion filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
    pub completed: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let order = match params.order.as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        let completed = match params.completed.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        ListQuery { completed, order }
    }
}

async fn list_todos(
    State(todos): State<TodoService>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(todos.list(params.into()).await?))
}

async fn create_todo(
    State(todos): State<TodoService>,
    input: Result<Json<TodoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = input?;
    let todo = todos.create(&input).await?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(todos): State<TodoService>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    Ok(Json(todos.get(id).await?))
}

async fn update_todo(
    State(todos): State<TodoService>,
    id: Result<Path<i32>, PathRejection>,
    input: Result<Json<TodoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Path(id) = id?;
    let Json(input) = input?;
    let todo = todos.update(id, &input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn delete_todo(
    State(todos): State<TodoService>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    todos.delete(id).await?;
    tracing::info!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
