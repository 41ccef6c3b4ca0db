use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;

use crate::dto::{Todo, TodoCreated, TodoFilter, TodoList, TodoOne, TodoText, TodosChanged, User};
use crate::error::ApiError;
use crate::store::{next_id, TodoStore};
use crate::stream::{publish, MutationKind, TodosStream};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
}

impl AppState {
    pub fn new(store: TodoStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Applies the optional search and completion filters, keeping order.
pub fn filter_todos(todos: Vec<Todo>, filter: &TodoFilter) -> Vec<Todo> {
    let completed = filter
        .is_completed
        .as_deref()
        .map(|flag| flag.to_lowercase() == "true");

    todos
        .into_iter()
        .filter(|todo| match &filter.search_term {
            Some(term) => todo.text.contains(term.as_str()),
            None => true,
        })
        .filter(|todo| completed.map_or(true, |completed| todo.is_completed == completed))
        .collect()
}

pub async fn fetch_todos(
    State(state): State<AppState>,
    Query(filter): Query<TodoFilter>,
) -> Json<TodoList> {
    let todos = state.store.load_all().await;

    Json(TodoList {
        todos: filter_todos(todos, &filter),
    })
}

pub async fn fetch_todo(
    State(state): State<AppState>,
    todo_id: Option<Path<String>>,
) -> Result<Json<TodoOne>, ApiError> {
    let todo_id = match todo_id {
        Some(Path(id)) if !id.is_empty() => id,
        _ => return Err(ApiError::InvalidRequest),
    };

    let todo = state
        .store
        .load_all()
        .await
        .into_iter()
        .find(|todo| todo.id == todo_id)
        .ok_or(ApiError::TodoNotFound)?;

    Ok(Json(TodoOne { todo }))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(tx): Extension<TodosStream>,
    body: Result<Json<TodoText>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoCreated>), ApiError> {
    let Json(body) = body?;
    let (todo, todos) = state
        .store
        .modify(|todos| {
            let todo = Todo {
                id: next_id(todos),
                text: body.text,
                is_completed: false,
            };
            todos.push(todo.clone());
            todo
        })
        .await?;

    tracing::info!(todo_id = %todo.id, count = todos.len(), "todo created");
    publish(&tx, MutationKind::Create, &todo.id);

    Ok((
        StatusCode::CREATED,
        Json(TodoCreated {
            message: "Todo created successfully".to_string(),
            todo,
            todos,
        }),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Extension(tx): Extension<TodosStream>,
    Path(todo_id): Path<String>,
    body: Result<Json<TodoText>, JsonRejection>,
) -> Result<Json<TodosChanged>, ApiError> {
    let Json(body) = body?;
    let updated = state
        .store
        .transact(|todos| {
            let index = todos.iter().position(|todo| todo.id == todo_id)?;
            let todo = &mut todos[index];
            todo.text = body.text;
            // completion is always cleared on edit
            todo.is_completed = false;
            Some(())
        })
        .await?;

    let Some(((), todos)) = updated else {
        tracing::info!(todo_id = %todo_id, "update of unknown todo");
        return Err(ApiError::NotFound("Todo not found".to_string()));
    };

    tracing::info!(todo_id = %todo_id, "todo updated");
    publish(&tx, MutationKind::Update, &todo_id);

    Ok(Json(TodosChanged {
        message: "Todo updated successfully".to_string(),
        todos,
    }))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(tx): Extension<TodosStream>,
    Path(todo_id): Path<String>,
) -> Result<Json<TodosChanged>, ApiError> {
    let (removed, todos) = state
        .store
        .modify(|todos| {
            let before = todos.len();
            todos.retain(|todo| todo.id != todo_id);
            before - todos.len()
        })
        .await?;

    tracing::info!(todo_id = %todo_id, removed, "todo deleted");
    if removed > 0 {
        publish(&tx, MutationKind::Delete, &todo_id);
    }

    Ok(Json(TodosChanged {
        message: "Todo deleted successfully".to_string(),
        todos,
    }))
}

pub async fn fetch_user() -> Json<User> {
    Json(User {
        name: "John Doe".to_string(),
        age: 30,
    })
}

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Resource not found" })),
    )
}
