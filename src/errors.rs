use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

use crate::filters::FilterError;

/// Domain failures raised by the repository
///
/// Repository functions return `anyhow::Result`; these errors travel inside
/// the `anyhow::Error` so the HTTP layer can recover their status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("A {entity} named '{name}' already exists")]
    NameConflict { entity: &'static str, name: String },
    #[error("Card set '{0}' cannot be nested under itself or one of its descendants")]
    ParentLoop(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(anyhow::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
    #[error("{0}")]
    BadRequest(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => ApiError::NotFound(err.to_string()),
            RepoError::NameConflict { .. } | RepoError::ParentLoop(_) => ApiError::Conflict(err.to_string()),
            RepoError::Invalid(message) => ApiError::BadRequest(message),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RepoError>() {
            Ok(repo_error) => repo_error.into(),
            Err(err) => match err.downcast::<FilterError>() {
                Ok(filter_error) => ApiError::InvalidFilter(filter_error),
                Err(err) => ApiError::Database(err),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidFilter(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
