//! Error types for the todo data access layer.
//!
//! # Design
//! `StoreError` covers backend failures only and is never recovered
//! locally. `TodoError` is what the service operations return: callers
//! distinguish field-level validation failures and missing rows from
//! everything else, which surfaces as a generic failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures raised by a repository backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// One or more fields failed validation. Never empty.
    #[error("validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("todo {0} not found")]
    NotFound(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::NotFound(_))
    }
}
