use reqwest::StatusCode;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Remote error {status}: {message}")]
    RemoteError { status: u16, message: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Maps a non-success HTTP status and its body text onto the error taxonomy.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::AuthError(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => AppError::RemoteError {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::MigrationError(_) => "MIGRATION_ERROR",
            AppError::HttpError(_) => "HTTP_ERROR",
            AppError::RemoteError { .. } => "REMOTE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// The HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::RemoteError { status, .. } => Some(*status),
            AppError::HttpError(e) => e.status().map(|s| s.as_u16()),
            AppError::AuthError(_) => Some(StatusCode::UNAUTHORIZED.as_u16()),
            AppError::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            _ => None,
        }
    }

    /// True for transport failures and server-side (5xx) answers.
    pub fn is_network(&self) -> bool {
        match self {
            AppError::HttpError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            AppError::RemoteError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for display. Database internals stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::InternalError(msg) => msg.clone(),
            AppError::RemoteError { message, .. } => message.clone(),
            AppError::HttpError(_) => "Connection failed".to_string(),
            AppError::DatabaseError(_) | AppError::MigrationError(_) => {
                "A local storage error occurred".to_string()
            }
        }
    }

    pub fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::InternalError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::RemoteError { status, message } => {
                error!(status, message = %message, "Remote error");
            }
            AppError::HttpError(e) => {
                error!(error = ?e, "HTTP error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::MigrationError(e) => {
                error!(error = ?e, "Migration error");
            }
        }
    }
}
