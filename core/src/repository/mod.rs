//! Storage backends for todos.
//!
//! # Design
//! `TodoRepository` receives already-validated, already-sanitized values and
//! issues exactly one statement per call. Validation and the read-then-write
//! update flow live in `TodoService`, so every backend shares them.
//!
//! Backends:
//! - [`PostgresTodoRepository`]: `sqlx` over a `PgPool`, one pooled
//!   connection acquired per call and released when the call returns.
//! - [`MemoryTodoRepository`]: in-process map with the same ordering and
//!   defaults, for tests and local runs without a database.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ListQuery, NewTodo, Todo, TodoPatch};

pub use memory::MemoryTodoRepository;
pub use postgres::PostgresTodoRepository;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert a row and return it with its generated `id`, `created` and
    /// `updated` fields.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// All rows matching `query.completed`, ordered by `position` in
    /// `query.order`, ties broken by ascending `id`.
    async fn list(&self, query: ListQuery) -> Result<Vec<Todo>, StoreError>;

    async fn find(&self, id: i32) -> Result<Option<Todo>, StoreError>;

    /// Write the present slots of `patch` and refresh `updated`.
    ///
    /// Returns `None` if the row no longer exists.
    async fn update(&self, id: i32, patch: &TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Returns `true` if exactly one row was removed.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}
