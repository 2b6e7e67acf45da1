use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    database::UserRepository,
    error::{AppError, AuthError},
    models::User,
};

/// Password registration and login against the user store.
///
/// Session bookkeeping is left to the caller; see `SessionExt`.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repository: UserRepository,
}

impl AuthService {
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        if self
            .user_repository
            .find_by_username(username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUsername.into());
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repository
            .create_user(username, &password_hash)
            .await?;

        tracing::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored PHC hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::TempDir;

    async fn setup_test_auth_service() -> (AuthService, TempDir) {
        let dir = TempDir::new().unwrap();
        let database_url = format!("sqlite:{}", dir.path().join("auth.db").display());
        let db = Database::new(&database_url).await.unwrap();
        let auth_service = AuthService::new(UserRepository::new(db.pool().clone()));
        (auth_service, dir)
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("hunter22").unwrap();
        let second = hash_password("hunter22").unwrap();

        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
        assert!(verify_password("hunter22", &first).is_ok());
        assert!(verify_password("hunter22", &second).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (auth_service, _dir) = setup_test_auth_service().await;

        let user = auth_service.register("alice", "wonderland").await.unwrap();
        assert_ne!(user.password_hash, "wonderland");

        let logged_in = auth_service.login("alice", "wonderland").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (auth_service, _dir) = setup_test_auth_service().await;

        auth_service.register("alice", "wonderland").await.unwrap();
        let result = auth_service.register("alice", "looking-glass").await;

        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::DuplicateUsername))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (auth_service, _dir) = setup_test_auth_service().await;

        auth_service.register("alice", "wonderland").await.unwrap();

        for attempt in ["", "Wonderland", "wonderland ", "looking-glass"] {
            let result = auth_service.login("alice", attempt).await;
            assert!(matches!(
                result,
                Err(AppError::Auth(AuthError::InvalidCredentials))
            ));
        }
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (auth_service, _dir) = setup_test_auth_service().await;

        let result = auth_service.login("ghost", "whatever").await;
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
    }
}
