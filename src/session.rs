use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::{
    error::{AppError, AuthError},
    models::{CurrentUser, Flash, FlashLevel, User},
};

// Session keys
const CURRENT_USER_KEY: &str = "current_user";
const FLASHES_KEY: &str = "_flashes";
const CSRF_TOKEN_KEY: &str = "csrf_token";

#[derive(Debug, Clone)]
pub struct SessionManager {
    store: MemoryStore,
    secure: bool,
}

impl SessionManager {
    pub fn new(secure: bool) -> Self {
        Self {
            store: MemoryStore::default(),
            secure,
        }
    }

    pub fn layer(&self) -> SessionManagerLayer<MemoryStore> {
        SessionManagerLayer::new(self.store.clone())
            .with_secure(self.secure)
            .with_same_site(tower_sessions::cookie::SameSite::Lax)
            .with_http_only(true)
            .with_name("inventory_session")
    }
}

/// Authentication, flash and CSRF state carried by the request session.
pub trait SessionExt {
    async fn current_user(&self) -> Result<Option<CurrentUser>, AppError>;
    async fn login(&self, user: &User) -> Result<(), AppError>;
    async fn logout(&self) -> Result<(), AppError>;
    async fn flash(&self, level: FlashLevel, message: &str) -> Result<(), AppError>;
    async fn take_flashes(&self) -> Result<Vec<Flash>, AppError>;
    async fn csrf_token(&self) -> Result<String, AppError>;
    async fn verify_csrf_token(&self, submitted: &str) -> Result<(), AppError>;
}

impl SessionExt for Session {
    async fn current_user(&self) -> Result<Option<CurrentUser>, AppError> {
        self.get::<CurrentUser>(CURRENT_USER_KEY).await.map_err(|e| {
            tracing::error!("Failed to get user session: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })
    }

    async fn login(&self, user: &User) -> Result<(), AppError> {
        // New session id on sign-in; the anonymous id must not carry over.
        self.cycle_id().await.map_err(|e| {
            tracing::error!("Failed to rotate session id: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })?;
        self.insert(CURRENT_USER_KEY, CurrentUser::from(user))
            .await
            .map_err(|e| {
                tracing::error!("Failed to set user session: {}", e);
                AppError::Auth(AuthError::InvalidSession)
            })?;

        tracing::info!("User session created for user ID: {}", user.id);
        Ok(())
    }

    async fn logout(&self) -> Result<(), AppError> {
        self.remove::<CurrentUser>(CURRENT_USER_KEY)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear user session: {}", e);
                AppError::Auth(AuthError::InvalidSession)
            })?;
        self.remove::<String>(CSRF_TOKEN_KEY).await.map_err(|e| {
            tracing::error!("Failed to clear CSRF token: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })?;
        self.cycle_id().await.map_err(|e| {
            tracing::error!("Failed to rotate session id: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })?;

        tracing::info!("User session cleared");
        Ok(())
    }

    async fn flash(&self, level: FlashLevel, message: &str) -> Result<(), AppError> {
        let mut flashes = self
            .get::<Vec<Flash>>(FLASHES_KEY)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read flash messages: {}", e);
                AppError::Auth(AuthError::InvalidSession)
            })?
            .unwrap_or_default();
        flashes.push(Flash::new(level, message));

        self.insert(FLASHES_KEY, flashes).await.map_err(|e| {
            tracing::error!("Failed to store flash message: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })
    }

    async fn take_flashes(&self) -> Result<Vec<Flash>, AppError> {
        let flashes = self
            .remove::<Vec<Flash>>(FLASHES_KEY)
            .await
            .map_err(|e| {
                tracing::error!("Failed to take flash messages: {}", e);
                AppError::Auth(AuthError::InvalidSession)
            })?;

        Ok(flashes.unwrap_or_default())
    }

    async fn csrf_token(&self) -> Result<String, AppError> {
        let existing = self.get::<String>(CSRF_TOKEN_KEY).await.map_err(|e| {
            tracing::error!("Failed to get CSRF token: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })?;
        if let Some(token) = existing {
            return Ok(token);
        }

        let token = Uuid::new_v4().simple().to_string();
        self.insert(CSRF_TOKEN_KEY, &token).await.map_err(|e| {
            tracing::error!("Failed to set CSRF token: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })?;
        Ok(token)
    }

    async fn verify_csrf_token(&self, submitted: &str) -> Result<(), AppError> {
        let expected = self.get::<String>(CSRF_TOKEN_KEY).await.map_err(|e| {
            tracing::error!("Failed to get CSRF token: {}", e);
            AppError::Auth(AuthError::InvalidSession)
        })?;

        match expected {
            Some(token) if !submitted.is_empty() && token == submitted => Ok(()),
            _ => Err(AppError::InvalidCsrfToken),
        }
    }
}

/// Extractor for handlers that need the signed-in user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Auth(AuthError::InvalidSession))?;

        match session.current_user().await? {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => Err(AppError::Auth(AuthError::NotAuthenticated)),
        }
    }
}

/// Route guard: lets signed-in requests through and sends everyone else to
/// the login page with a warning flash.
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.current_user().await? {
        Some(_) => Ok(next.run(request).await),
        None => {
            session
                .flash(FlashLevel::Warning, "Please log in to access this page.")
                .await?;
            Err(AppError::Auth(AuthError::NotAuthenticated))
        }
    }
}
