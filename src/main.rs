use flat_todos::{app, stream::todos_stream, AppState, TodoStore, TODOS_FILE};

#[shuttle_runtime::main]
async fn main() -> shuttle_axum::ShuttleAxum {
    tracing::info!(path = TODOS_FILE, "serving todos");

    let state = AppState::new(TodoStore::new(TODOS_FILE));
    let router = app(state, todos_stream());

    Ok(router.into())
}
