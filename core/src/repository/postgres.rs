//! PostgreSQL backend.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todos (
//!     id SERIAL PRIMARY KEY,
//!     title VARCHAR(128) NOT NULL,
//!     due TIMESTAMPTZ,
//!     position INT NOT NULL DEFAULT 0,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     created TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! The schema is applied by the embedded migrations in `core/migrations`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

use super::TodoRepository;
use crate::error::StoreError;
use crate::types::{ColumnValue, ListQuery, NewTodo, Todo, TodoPatch};

const COLUMNS: &str = "id, title, due, position, completed, created, updated";

/// `sqlx` implementation of [`TodoRepository`].
///
/// Every call acquires one connection from the pool for its single statement.
/// The connection goes back to the pool when the guard drops, on success and
/// on error alike.
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[tracing::instrument(skip(self, todo))]
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "INSERT INTO todos (title, due, position, completed) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.title)
            .bind(todo.due)
            .bind(todo.position)
            .bind(todo.completed)
            .fetch_one(&mut *conn)
            .await?;
        tracing::debug!(id = row.id, "inserted todo");
        Ok(row)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, query: ListQuery) -> Result<Vec<Todo>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut statement = list_statement(query);
        let rows = statement
            .build_query_as::<Todo>()
            .fetch_all(&mut *conn)
            .await?;
        tracing::debug!(count = rows.len(), "listed todos");
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn find(&self, id: i32) -> Result<Option<Todo>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("SELECT {COLUMNS} FROM todos WHERE id = $1");
        let row = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, id: i32, patch: &TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut statement = update_statement(id, patch);
        let row = statement
            .build_query_as::<Todo>()
            .fetch_optional(&mut *conn)
            .await?;
        tracing::debug!(found = row.is_some(), "updated todo");
        Ok(row)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

fn list_statement(query: ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM todos"));
    if let Some(completed) = query.completed {
        builder.push(" WHERE completed = ").push_bind(completed);
    }
    builder
        .push(" ORDER BY position ")
        .push(query.order.as_sql())
        .push(", id ASC");
    builder
}

/// `UPDATE ... SET` over the present patch slots, always refreshing `updated`.
fn update_statement(id: i32, patch: &TodoPatch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE todos SET ");
    let mut set = builder.separated(", ");
    for assignment in patch.assignments() {
        set.push(assignment.column).push_unseparated(" = ");
        match assignment.value {
            ColumnValue::Text(text) => set.push_bind_unseparated(text),
            ColumnValue::Timestamp(at) => set.push_bind_unseparated(at),
            ColumnValue::Int(value) => set.push_bind_unseparated(value),
            ColumnValue::Bool(flag) => set.push_bind_unseparated(flag),
            ColumnValue::Null => set.push_unseparated("NULL"),
        };
    }
    set.push("updated = now()");
    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {COLUMNS}"));
    builder
}
