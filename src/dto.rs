use serde::{Deserialize, Serialize};

/// A single entry of the persisted collection.
///
/// Every field defaults so a record with a missing key still decodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFilter {
    pub search_term: Option<String>,
    pub is_completed: Option<String>,
}

/// Body accepted by both create and update.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoText {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

#[derive(Serialize, Deserialize)]
pub struct TodoOne {
    pub todo: Todo,
}

#[derive(Serialize, Deserialize)]
pub struct TodoCreated {
    pub message: String,
    pub todo: Todo,
    pub todos: Vec<Todo>,
}

#[derive(Serialize, Deserialize)]
pub struct TodosChanged {
    pub message: String,
    pub todos: Vec<Todo>,
}

#[derive(Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub age: u32,
}
