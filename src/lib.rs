pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod templates;

pub use auth::AuthService;
pub use config::Config;
pub use database::{Database, ItemRepository, UserRepository};
pub use error::{AppError, AuthError};
pub use handlers::AppState;
pub use routes::app;
pub use session::{require_auth, AuthenticatedUser, SessionExt, SessionManager};
