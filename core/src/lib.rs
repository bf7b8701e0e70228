//! Data access layer for the todo service.
//!
//! # Overview
//! Validates todo payloads, escapes free text, and persists rows through a
//! `TodoRepository` backend. `TodoService` exposes the five operations the
//! HTTP layer maps onto: create, list, get, update and delete.
//!
//! # Design
//! - Request bodies arrive as `TodoInput` (raw JSON per field) so validation
//!   can report every bad field at once.
//! - Validation produces typed values directly: `NewTodo` for inserts and a
//!   `TodoPatch` of per-field `Slot`s for partial updates.
//! - Backends only see validated values and run one statement per call.

pub mod error;
pub mod repository;
pub mod sanitize;
pub mod service;
pub mod types;
pub mod validation;

pub use error::{FieldError, StoreError, TodoError};
pub use repository::{MemoryTodoRepository, PostgresTodoRepository, TodoRepository};
pub use service::TodoService;
pub use types::{ListQuery, NewTodo, Slot, SortOrder, Todo, TodoInput, TodoPatch};
pub use validation::{validate, ValidationMode};
