use std::convert::Infallible;
use std::time::Duration;

use axum::{
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{channel, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt as _};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn event_name(&self) -> &'static str {
        match self {
            MutationKind::Create => "Create",
            MutationKind::Update => "Update",
            MutationKind::Delete => "Delete",
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TodoChange {
    pub kind: MutationKind,
    pub id: String,
}

pub type TodosStream = Sender<TodoChange>;

pub fn todos_stream() -> TodosStream {
    let (tx, _rx) = channel::<TodoChange>(16);
    tx
}

pub fn publish(tx: &TodosStream, kind: MutationKind, id: &str) {
    let change = TodoChange {
        kind,
        id: id.to_string(),
    };
    if tx.send(change).is_err() {
        tracing::debug!(todo_id = id, ?kind, "todo changed but nobody's listening to the stream");
    }
}

pub async fn handle_stream(
    Extension(tx): Extension<TodosStream>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(tx.subscribe())
        // lagged receivers just miss the dropped events
        .filter_map(|msg| msg.ok())
        .map(|change| {
            let data = serde_json::to_string(&change).unwrap_or_default();
            Event::default().event(change.kind.event_name()).data(data)
        })
        .map(Ok);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(600))
            .text("keep-alive-text"),
    )
}
