//! Todo CRUD scoped to the bearer's username.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{Error, Result};
use crate::AppState;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// A todo together with the user that owns it.
#[derive(Clone, Debug)]
pub(crate) struct Owned {
    pub owner: String,
    pub todo: Todo,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".to_owned()));
    }
    Ok(())
}

pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> Json<Vec<Todo>> {
    let store = state.store.read().await;
    let mut todos: Vec<Todo> = store
        .todos
        .values()
        .filter(|entry| entry.owner == owner)
        .map(|entry| entry.todo.clone())
        .collect();
    todos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Json(todos)
}

pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>)> {
    validate_title(&input.title)?;

    let timestamp = now();
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        completed: false,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };
    state.store.write().await.todos.insert(
        todo.id.clone(),
        Owned {
            owner,
            todo: todo.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Todo>> {
    let store = state.store.read().await;
    store
        .todos
        .get(&id)
        .filter(|entry| entry.owner == owner)
        .map(|entry| Json(entry.todo.clone()))
        .ok_or(Error::TodoNotFound)
}

pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }

    let mut store = state.store.write().await;
    let entry = store
        .todos
        .get_mut(&id)
        .filter(|entry| entry.owner == owner)
        .ok_or(Error::TodoNotFound)?;

    let todo = &mut entry.todo;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = Some(description);
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = now();
    Ok(Json(todo.clone()))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let mut store = state.store.write().await;
    match store.todos.get(&id) {
        Some(entry) if entry.owner == owner => {
            store.todos.remove(&id);
            Ok(StatusCode::NO_CONTENT)
        }
        _ => Err(Error::TodoNotFound),
    }
}
