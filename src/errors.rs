use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::{migrate::MigrateError, Error as SqlxError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    MigrateError(#[from] MigrateError),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Message safe to show to a user. Server-side failures collapse into a
    /// generic string so database or template details never reach the page.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            AppError::InternalServerError.to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MigrateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TemplateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SessionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.public_message())
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::other(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON flavour of [`AppError`] for the `/api` routes: renders `{"error": "..."}`.
#[derive(Debug, Error)]
#[error("{inner}")]
pub struct ApiError {
    inner: AppError,
    server_message: Option<&'static str>,
}

impl ApiError {
    /// Replaces the generic 5xx text with a route-specific message.
    pub fn or_server_message(mut self, message: &'static str) -> Self {
        self.server_message = Some(message);
        self
    }

    fn message(&self) -> String {
        match self.server_message {
            Some(message) if self.status_code().is_server_error() => message.to_owned(),
            _ => self.inner.public_message(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.message(),
        })
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        ApiError {
            inner,
            server_message: None,
        }
    }
}

impl From<SqlxError> for ApiError {
    fn from(err: SqlxError) -> Self {
        ApiError::from(AppError::DatabaseError(err))
    }
}
