use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("todo id is required")]
    InvalidRequest,
    #[error("todo not found")]
    TodoNotFound,
    /// Not-found reported with a bare message and no code.
    #[error("{0}")]
    NotFound(String),
    /// Body could not be read as JSON; carries the rejection's status.
    #[error("invalid request body")]
    InvalidBody(StatusCode),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = ?rejection, "rejected request body");
        ApiError::InvalidBody(rejection.into_response().status())
    }
}

impl ApiError {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::InvalidRequest => Some("INVALID_REQUEST"),
            ApiError::TodoNotFound => Some("TODO_NOT_FOUND"),
            ApiError::NotFound(_) | ApiError::InvalidBody(_) | ApiError::Storage(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest | ApiError::TodoNotFound | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::InvalidBody(status) => *status,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidRequest => "Todo id is required".to_string(),
            ApiError::TodoNotFound => "Todo not found".to_string(),
            ApiError::NotFound(message) => message.clone(),
            ApiError::InvalidBody(_) => "Invalid request body".to_string(),
            ApiError::Storage(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "todos storage failure");
        }

        let body = match self.code() {
            Some(code) => json!({ "code": code, "message": self.message() }),
            None => json!({ "message": self.message() }),
        };

        (self.status(), Json(body)).into_response()
    }
}
