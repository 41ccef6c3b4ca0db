//! Whole-file JSON persistence for the todo collection.
//!
//! The collection is always read and written in full. Every access goes
//! through one mutex per store, so a read-modify-write run through
//! [`TodoStore::transact`] cannot interleave with another one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::dto::Todo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write todos file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode todos: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub struct TodoStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TodoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored collection, or an empty one when the file is
    /// missing or cannot be decoded.
    pub async fn load_all(&self) -> Vec<Todo> {
        let _guard = self.lock.lock().await;
        self.read_file().await
    }

    /// Overwrites the file with the pretty-printed collection.
    pub async fn save_all(&self, todos: &[Todo]) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        self.write_file(todos).await
    }

    /// Loads the collection, hands it to `apply`, and persists it if `apply`
    /// returns `Some`. A `None` leaves the file untouched.
    ///
    /// On success the closure's output comes back together with the
    /// collection as it was written.
    pub async fn transact<T, F>(&self, apply: F) -> StoreResult<Option<(T, Vec<Todo>)>>
    where
        F: FnOnce(&mut Vec<Todo>) -> Option<T>,
    {
        let _guard = self.lock.lock().await;
        let mut todos = self.read_file().await;

        let Some(output) = apply(&mut todos) else {
            return Ok(None);
        };

        self.write_file(&todos).await?;
        Ok(Some((output, todos)))
    }

    /// Like [`TodoStore::transact`], but always writes the collection back.
    pub async fn modify<T, F>(&self, apply: F) -> StoreResult<(T, Vec<Todo>)>
    where
        F: FnOnce(&mut Vec<Todo>) -> T,
    {
        let _guard = self.lock.lock().await;
        let mut todos = self.read_file().await;
        let output = apply(&mut todos);

        self.write_file(&todos).await?;
        Ok((output, todos))
    }

    async fn read_file(&self) -> Vec<Todo> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "todos file missing, starting empty");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read todos file");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Todo>>(&content) {
            Ok(todos) => todos,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "todos file is malformed, treating as empty");
                Vec::new()
            }
        }
    }

    // Not atomic: the file is truncated and rewritten in place.
    async fn write_file(&self, todos: &[Todo]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(todos)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, json).await?;

        tracing::debug!(path = %self.path.display(), count = todos.len(), "todos file written");
        Ok(())
    }
}

/// Builds an id from the current UTC time, suffixed with a counter if the
/// same tick is already taken in `todos`.
pub fn next_id(todos: &[Todo]) -> String {
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
    unique_id(stamp, todos)
}

fn unique_id(stamp: String, todos: &[Todo]) -> String {
    let taken = |candidate: &str| todos.iter().any(|todo| todo.id == candidate);
    if !taken(&stamp) {
        return stamp;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{stamp}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn todo(id: &str, text: &str, is_completed: bool) -> Todo {
        Todo {
            id: id.to_string(),
            text: text.to_string(),
            is_completed,
        }
    }

    fn store_in(dir: &TempDir) -> TodoStore {
        TodoStore::new(dir.path().join("data").join("todos.json"))
    }

    #[tokio::test]
    async fn save_then_load_keeps_content_and_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let todos = vec![
            todo("b", "second", true),
            todo("a", "first", false),
            todo("c", "third", false),
        ];

        store.save_all(&todos).await.unwrap();

        assert_eq!(store.load_all().await, todos);
    }

    #[tokio::test]
    async fn saved_file_is_indented_camel_case_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save_all(&[todo("1", "milk", false)]).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"id\": \"1\""));
        assert!(raw.contains("\"isCompleted\": false"));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, "[{\"id\": \"1\",").unwrap();

        assert!(TodoStore::new(path).load_all().await.is_empty());
    }

    #[tokio::test]
    async fn records_with_missing_fields_still_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, r#"[{"id": "1"}, {"text": "orphan", "extra": 3}]"#).unwrap();

        let todos = TodoStore::new(path).load_all().await;

        assert_eq!(todos, vec![todo("1", "", false), todo("", "orphan", false)]);
    }

    #[tokio::test]
    async fn transact_persists_on_some() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let (len, written) = store
            .transact(|todos| {
                todos.push(todo("1", "milk", false));
                Some(todos.len())
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(len, 1);
        assert_eq!(written, store.load_all().await);
    }

    #[tokio::test]
    async fn transact_skips_write_on_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save_all(&[todo("1", "milk", false)]).await.unwrap();

        let outcome = store
            .transact(|todos| {
                todos.clear();
                None::<()>
            })
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(store.load_all().await, vec![todo("1", "milk", false)]);
    }

    #[tokio::test]
    async fn modify_writes_even_without_changes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let (len, written) = store.modify(|todos| todos.len()).await.unwrap();

        assert_eq!(len, 0);
        assert!(written.is_empty());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[tokio::test]
    async fn concurrent_transactions_do_not_lose_updates() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(store_in(&dir));

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .modify(|todos| todos.push(todo(&i.to_string(), "x", false)))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.load_all().await.len(), 20);
    }

    #[test]
    fn next_id_is_a_sortable_timestamp() {
        let first = next_id(&[]);
        let second = next_id(&[]);

        assert!(first.ends_with('Z'));
        assert!(first <= second);
    }

    #[test]
    fn colliding_ids_get_a_counter_suffix() {
        let stamp = "2024-01-01T00:00:00.000000000Z".to_string();
        let todos = vec![todo(&stamp, "a", false), todo(&format!("{stamp}-1"), "b", false)];

        assert_eq!(unique_id(stamp.clone(), &todos), format!("{stamp}-2"));
        assert_eq!(unique_id(stamp.clone(), &[]), stamp);
    }
}
