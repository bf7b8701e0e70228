//! In-memory backend, used by tests and anywhere a database is not wanted.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::TodoRepository;
use crate::error::StoreError;
use crate::types::{ListQuery, NewTodo, Slot, SortOrder, Todo, TodoPatch};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Todo>,
}

/// In-process todo table. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryTodoRepository {
    table: Arc<RwLock<Table>>,
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let row = Todo {
            id: table.last_id,
            title: todo.title,
            due: todo.due,
            position: todo.position,
            completed: todo.completed,
            created: now,
            updated: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        // BTreeMap iteration is already id-ascending; the stable sort keeps
        // that as the tie-breaker.
        let mut rows: Vec<Todo> = table
            .rows
            .values()
            .filter(|row| query.completed.map_or(true, |flag| row.completed == flag))
            .cloned()
            .collect();
        match query.order {
            SortOrder::Asc => rows.sort_by_key(|row| row.position),
            SortOrder::Desc => rows.sort_by(|a, b| b.position.cmp(&a.position)),
        }
        Ok(rows)
    }

    async fn find(&self, id: i32) -> Result<Option<Todo>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: i32, patch: &TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Slot::Set(title) = &patch.title {
            row.title = title.clone();
        }
        match patch.due {
            Slot::Set(due) => row.due = Some(due),
            Slot::Clear => row.due = None,
            Slot::Absent => {}
        }
        if let Slot::Set(position) = patch.position {
            row.position = position;
        }
        if let Slot::Set(completed) = patch.completed {
            row.completed = completed;
        }
        row.updated = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
