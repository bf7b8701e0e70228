//! The five todo operations, composed from validation and a repository.
//!
//! # Design
//! `TodoService` is cheap to clone (it holds an `Arc`) and is what the HTTP
//! layer keeps as state. Update is a partial update for every caller: only
//! supplied fields change. It runs as two independent statements (lookup,
//! then write) with no transaction around them; a row deleted in between
//! surfaces as `NotFound` from the write.

use std::sync::Arc;

use crate::error::TodoError;
use crate::repository::TodoRepository;
use crate::types::{ListQuery, Todo, TodoInput};
use crate::validation::{parse_new, parse_patch};

#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, input: &TodoInput) -> Result<Todo, TodoError> {
        let new = parse_new(input).map_err(TodoError::Validation)?;
        Ok(self.repository.insert(new).await?)
    }

    pub async fn list(&self, query: ListQuery) -> Result<Vec<Todo>, TodoError> {
        Ok(self.repository.list(query).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Todo, TodoError> {
        self.repository
            .find(id)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    /// Apply the supplied fields of `input` to todo `id`.
    ///
    /// A missing `id` is reported as `NotFound` before `input` is validated.
    pub async fn update(&self, id: i32, input: &TodoInput) -> Result<Todo, TodoError> {
        if self.repository.find(id).await?.is_none() {
            return Err(TodoError::NotFound(id));
        }
        let patch = parse_patch(input).map_err(TodoError::Validation)?;
        self.repository
            .update(id, &patch)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    pub async fn delete(&self, id: i32) -> Result<(), TodoError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(TodoError::NotFound(id))
        }
    }
}
