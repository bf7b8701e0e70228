//! Service operations against a live PostgreSQL database.
//!
//! Skipped unless `DATABASE_URL` points at a database the test may create a
//! `todos` table in. Rows created here are tagged with a unique title prefix
//! and removed at the end, so the test can share a database with others.

use std::sync::Arc;

use serde_json::json;
use todo_core::{
    ListQuery, PostgresTodoRepository, SortOrder, TodoError, TodoInput, TodoRepository,
    TodoService,
};

fn input(value: serde_json::Value) -> TodoInput {
    serde_json::from_value(value).unwrap()
}

async fn connect() -> Option<PostgresTodoRepository> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };
    let repository = PostgresTodoRepository::connect(&url, 2).await.unwrap();
    repository.migrate().await.unwrap();
    Some(repository)
}

#[tokio::test]
async fn service_lifecycle_against_postgres() {
    let Some(repository) = connect().await else {
        return;
    };
    let todos = TodoService::new(Arc::new(repository.clone()));
    let tag = format!("pg-{}", std::process::id());

    // create with defaults
    let first = todos
        .create(&input(json!({ "title": format!("{tag} Buy milk") })))
        .await
        .unwrap();
    assert!(first.id > 0);
    assert_eq!(first.position, 0);
    assert!(!first.completed);
    assert!(first.due.is_none());

    let second = todos
        .create(&input(json!({
            "title": format!("{tag} <b>bold</b>"),
            "position": 3,
            "completed": true,
            "due": "2024-05-01T10:00:00Z",
        })))
        .await
        .unwrap();
    assert!(!second.title.contains('<'));
    assert_eq!(second.due.unwrap().to_rfc3339(), "2024-05-01T10:00:00+00:00");

    // validation failure stores nothing
    let err = todos.create(&input(json!({ "title": "" }))).await.unwrap_err();
    assert!(matches!(err, TodoError::Validation(_)));

    // list filtered and ordered
    let done = todos
        .list(ListQuery {
            completed: Some(true),
            order: SortOrder::Desc,
        })
        .await
        .unwrap();
    assert!(done.iter().all(|t| t.completed));
    assert!(done.iter().any(|t| t.id == second.id));
    assert!(done.windows(2).all(|w| w[0].position >= w[1].position));

    // partial update, including zero position and clearing due
    let updated = todos
        .update(second.id, &input(json!({ "position": 0, "due": null })))
        .await
        .unwrap();
    assert_eq!(updated.title, second.title);
    assert_eq!(updated.position, 0);
    assert!(updated.due.is_none());
    assert!(updated.completed);
    assert!(updated.updated >= second.updated);

    // empty patch only refreshes the timestamp
    let touched = todos.update(first.id, &input(json!({}))).await.unwrap();
    assert_eq!(touched.title, first.title);
    assert!(touched.updated >= first.updated);

    // delete exactly once
    for todo in [&first, &second] {
        todos.delete(todo.id).await.unwrap();
        assert!(todos.delete(todo.id).await.unwrap_err().is_not_found());
        assert!(repository.find(todo.id).await.unwrap().is_none());
    }

    assert!(todos
        .update(first.id, &input(json!({ "title": "" })))
        .await
        .unwrap_err()
        .is_not_found());
}
