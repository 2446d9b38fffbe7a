use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Message for logs, without SQL, schema details or server URLs
    pub fn log_safe(&self) -> String {
        match self {
            Error::Database(_) => "Catalog query failed".to_string(),
            Error::Migration(_) => "Catalog migration failed".to_string(),
            Error::Http(_) => "Search server request failed".to_string(),

            Error::Internal(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("password")
                    || lower.contains("secret")
                    || lower.contains("token")
                    || lower.contains("key")
                {
                    "Internal error (details redacted)".to_string()
                } else {
                    format!("Internal error: {msg}")
                }
            }

            Error::Json(_) => "Malformed JSON document".to_string(),
            Error::Search(msg) => format!("Search error: {msg}"),
            Error::InvalidUrl(_) => "Invalid URL provided".to_string(),
            Error::Io(_) => "File system operation failed".to_string(),
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::NotFound(msg) => format!("Not found: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("Request error: {}", self.log_safe());

        let (status, error_message) = match &self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            Error::Search(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Search error".to_string(),
            ),
            Error::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "External service error".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
