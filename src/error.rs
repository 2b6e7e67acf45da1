use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid configuration value for {name}: {value:?}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("The CSRF token is missing or invalid")]
    InvalidCsrfToken,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(AuthError::NotAuthenticated)
            | AppError::Auth(AuthError::InvalidSession) => {
                tracing::warn!("Authentication required, redirecting to login: {}", self);
                Redirect::to("/login").into_response()
            }

            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!("Rejected login attempt");
                redirect_with_error("/login", "Invalid username or password.")
            }

            AppError::Auth(AuthError::DuplicateUsername) => {
                redirect_with_error("/register", "Username already exists.")
            }

            AppError::Auth(AuthError::PasswordHash(ref reason)) => {
                tracing::error!("Password hashing failed: {}", reason);
                server_error("Authentication error", "Failed to process credentials.")
            }

            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>Not Found</h1><p>The requested item does not exist.</p>"),
            )
                .into_response(),

            AppError::InvalidCsrfToken => {
                tracing::warn!("Rejected form submission with a bad CSRF token");
                (
                    StatusCode::BAD_REQUEST,
                    "The CSRF token is missing or invalid.",
                )
                    .into_response()
            }

            AppError::Database(ref db_error) => {
                tracing::error!("Database error: {}", db_error);
                server_error(
                    "Database error",
                    "A database error occurred. Please try again later.",
                )
            }

            AppError::Template(ref template_error) => {
                tracing::error!("Template error: {}", template_error);
                server_error("Template error", "A page rendering error occurred.")
            }

            AppError::InvalidConfig { .. } => {
                tracing::error!("Configuration error: {}", self);
                server_error("Configuration error", "Server configuration error.")
            }

            AppError::Migration(ref migration_error) => {
                tracing::error!("Migration error: {}", migration_error);
                server_error(
                    "Database migration error",
                    "Database initialization failed.",
                )
            }
        }
    }
}

fn redirect_with_error(path: &str, message: &str) -> Response {
    let url = format!("{}?error={}", path, urlencoding::encode(message));
    Redirect::to(&url).into_response()
}

fn server_error(error: &str, message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": error,
            "message": message,
        })),
    )
        .into_response()
}
