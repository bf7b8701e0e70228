//! Field-level validation of todo payloads.
//!
//! # Design
//! Each field is checked independently and every failure is collected, so a
//! single response can report all problems at once. Checking a field and
//! converting it into its typed slot happen in the same step: a payload that
//! validates is already a `NewTodo` or `TodoPatch`, and there is no second
//! parse that could disagree with the first.
//!
//! Titles are sanitized before their length is measured, so the stored
//! value always satisfies the 1..=128 character bound. Due dates are bounded
//! to the years a PostgreSQL `timestamptz` can hold.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::FieldError;
use crate::sanitize::sanitize_text;
use crate::types::{NewTodo, Slot, TodoInput, TodoPatch};

pub const TITLE_MIN_CHARS: usize = 1;
pub const TITLE_MAX_CHARS: usize = 128;

/// Years representable by `timestamptz` (4713 BC is astronomical year -4712).
pub const DUE_YEARS: RangeInclusive<i32> = -4712..=294_276;

/// Whether `title` must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Create: `title` is required.
    Create,
    /// Update: every field is optional.
    Update,
}

/// Validate `input` and return every field error, in field order.
///
/// An empty vector means the payload is valid for `mode`.
pub fn validate(input: &TodoInput, mode: ValidationMode) -> Vec<FieldError> {
    check(input, mode).err().unwrap_or_default()
}

/// Validate a create payload and apply defaults.
pub fn parse_new(input: &TodoInput) -> Result<NewTodo, Vec<FieldError>> {
    let patch = check(input, ValidationMode::Create)?;
    let Slot::Set(title) = patch.title else {
        return Err(vec![FieldError::new("title", "title is required")]);
    };
    Ok(NewTodo {
        title,
        due: match patch.due {
            Slot::Set(due) => Some(due),
            Slot::Absent | Slot::Clear => None,
        },
        position: match patch.position {
            Slot::Set(position) => position,
            _ => 0,
        },
        completed: matches!(patch.completed, Slot::Set(true)),
    })
}

/// Validate an update payload into a patch of the supplied fields.
pub fn parse_patch(input: &TodoInput) -> Result<TodoPatch, Vec<FieldError>> {
    check(input, ValidationMode::Update)
}

fn check(input: &TodoInput, mode: ValidationMode) -> Result<TodoPatch, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = collect(&mut errors, title_slot(input.title.as_ref(), mode));
    let due = collect(&mut errors, due_slot(input.due.as_ref()));
    let position = collect(&mut errors, position_slot(input.position.as_ref()));
    let completed = collect(&mut errors, completed_slot(input.completed.as_ref()));

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(TodoPatch {
        title,
        due,
        position,
        completed,
    })
}

fn collect<T>(errors: &mut Vec<FieldError>, result: Result<Slot<T>, FieldError>) -> Slot<T> {
    result.unwrap_or_else(|err| {
        errors.push(err);
        Slot::Absent
    })
}

fn title_slot(raw: Option<&Value>, mode: ValidationMode) -> Result<Slot<String>, FieldError> {
    let raw = match (raw, mode) {
        (None, ValidationMode::Create) => {
            return Err(FieldError::new("title", "title is required"));
        }
        (None, ValidationMode::Update) => return Ok(Slot::Absent),
        (Some(raw), _) => raw,
    };
    let Value::String(text) = raw else {
        return Err(FieldError::new("title", "title must be a string"));
    };
    let title = sanitize_text(text).into_owned();
    let chars = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&chars) {
        return Err(FieldError::new(
            "title",
            format!(
                "title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters \
                 after HTML escaping"
            ),
        ));
    }
    Ok(Slot::Set(title))
}

fn due_slot(raw: Option<&Value>) -> Result<Slot<DateTime<Utc>>, FieldError> {
    let invalid = || FieldError::new("due", "due must be an ISO-8601 date or date-time");
    let text = match raw {
        None => return Ok(Slot::Absent),
        Some(Value::Null) => return Ok(Slot::Clear),
        Some(Value::String(text)) => text,
        Some(_) => return Err(invalid()),
    };
    let due = parse_timestamp(text).ok_or_else(invalid)?;
    if !DUE_YEARS.contains(&due.year()) {
        return Err(FieldError::new(
            "due",
            format!(
                "due year must be between {} and {}",
                DUE_YEARS.start(),
                DUE_YEARS.end()
            ),
        ));
    }
    Ok(Slot::Set(due))
}

fn position_slot(raw: Option<&Value>) -> Result<Slot<i32>, FieldError> {
    let Some(raw) = raw else {
        return Ok(Slot::Absent);
    };
    let invalid = || FieldError::new("position", "position must be a non-negative integer");
    let Value::Number(number) = raw else {
        return Err(invalid());
    };
    if let Some(value) = number.as_u64() {
        return i32::try_from(value)
            .map(Slot::Set)
            .map_err(|_| {
                FieldError::new("position", format!("position must not exceed {}", i32::MAX))
            });
    }
    Err(invalid())
}

fn completed_slot(raw: Option<&Value>) -> Result<Slot<bool>, FieldError> {
    match raw {
        None => Ok(Slot::Absent),
        Some(Value::Bool(flag)) => Ok(Slot::Set(*flag)),
        Some(_) => Err(FieldError::new("completed", "completed must be a boolean")),
    }
}

/// Parse an ISO-8601 date or date-time.
///
/// Accepts RFC 3339 date-times with an offset, date-times without an offset
/// (taken as UTC) and plain calendar dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
