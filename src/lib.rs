use axum::{routing::get, Extension, Router};

pub mod dto;
pub mod error;
pub mod handlers;
pub mod store;
pub mod stream;

use handlers::{
    create_todo, delete_todo, fetch_todo, fetch_todos, fetch_user, not_found, update_todo,
};
use stream::{handle_stream, TodosStream};

pub use handlers::AppState;
pub use store::TodoStore;

/// Storage location, fixed relative to the crate directory.
pub const TODOS_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/todos.json");

pub fn app(state: AppState, tx: TodosStream) -> Router {
    Router::new()
        .route("/todos", get(fetch_todos).post(create_todo))
        .route("/todos/", get(fetch_todo))
        .route("/todos/stream", get(handle_stream))
        .route(
            "/todos/:todoId",
            get(fetch_todo).put(update_todo).delete(delete_todo),
        )
        .route("/users", get(fetch_user))
        .fallback(not_found)
        .with_state(state)
        .layer(Extension(tx))
}
