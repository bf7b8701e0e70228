//! Domain types for the todo store.
//!
//! # Design
//! `Todo` is the persisted row and doubles as the JSON response body.
//! `TodoInput` is the raw request body: every field is kept as an untyped
//! JSON value so validation can report one error per field instead of
//! failing the whole body at deserialization time. Once validated, input is
//! turned into either a `NewTodo` (create) or a `TodoPatch` (update).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single todo row as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub due: Option<DateTime<Utc>>,
    pub position: i32,
    pub completed: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Raw request payload for create and update.
///
/// Only a JSON object deserializes; arrays and scalars are rejected. A
/// missing key becomes `None` and an explicit `null` becomes
/// `Some(Value::Null)`, so "not supplied" and "supplied as null" stay
/// distinguishable. Unknown keys are ignored.
#[derive(Debug, Clone, Default)]
pub struct TodoInput {
    pub title: Option<Value>,
    pub due: Option<Value>,
    pub position: Option<Value>,
    pub completed: Option<Value>,
}

impl<'de> Deserialize<'de> for TodoInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            title: fields.remove("title"),
            due: fields.remove("due"),
            position: fields.remove("position"),
            completed: fields.remove("completed"),
        })
    }
}

/// Validated payload for inserting a todo, defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub due: Option<DateTime<Utc>>,
    pub position: i32,
    pub completed: bool,
}

/// One field of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot<T> {
    /// Not supplied; the stored value is kept.
    #[default]
    Absent,
    /// Replace the stored value.
    Set(T),
    /// Reset a nullable column to `NULL`.
    Clear,
}

impl<T> Slot<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }
}

/// Validated partial update. Only slots that are not `Absent` are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoPatch {
    pub title: Slot<String>,
    pub due: Slot<DateTime<Utc>>,
    pub position: Slot<i32>,
    pub completed: Slot<bool>,
}

/// A typed column value carried by an [`Assignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    Int(i32),
    Bool(bool),
    Null,
}

/// A single `column = value` pair derived from a present patch slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: ColumnValue,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.due.is_absent()
            && self.position.is_absent()
            && self.completed.is_absent()
    }

    /// Present slots in column order, ready to be folded into an update.
    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        push_slot(&mut out, "title", &self.title, |v| ColumnValue::Text(v.clone()));
        push_slot(&mut out, "due", &self.due, |v| ColumnValue::Timestamp(*v));
        push_slot(&mut out, "position", &self.position, |v| ColumnValue::Int(*v));
        push_slot(&mut out, "completed", &self.completed, |v| ColumnValue::Bool(*v));
        out
    }
}

fn push_slot<T>(
    out: &mut Vec<Assignment>,
    column: &'static str,
    slot: &Slot<T>,
    to_value: impl FnOnce(&T) -> ColumnValue,
) {
    let value = match slot {
        Slot::Absent => return,
        Slot::Set(v) => to_value(v),
        Slot::Clear => ColumnValue::Null,
    };
    out.push(Assignment { column, value });
}

/// Sort direction for `position` when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter and ordering for listing todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub completed: Option<bool>,
    pub order: SortOrder,
}
