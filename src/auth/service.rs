// Authentication service - business logic layer

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{TokenPair, User},
    password::PasswordService,
    repository::UserStore,
    token::{TokenCodec, TokenKind},
};

/// Length of generated worker passwords.
const WORKER_PASSWORD_LEN: usize = 32;

/// Orchestrates login, refresh and registration over a [`UserStore`].
///
/// Stateless across calls; every method is an independent computation whose
/// only suspension point is the store lookup.
pub struct AuthService<S> {
    store: S,
    codec: TokenCodec,
    allow_register: bool,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: S, codec: TokenCodec, allow_register: bool) -> Self {
        Self {
            store,
            codec,
            allow_register,
        }
    }

    fn issue_pair(&self, subject: i32) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access = self
            .codec
            .issue(subject, TokenKind::Access, now)
            .map_err(|_| AuthError::TokenEncoding)?;
        let refresh = self
            .codec
            .issue(subject, TokenKind::Refresh, now)
            .map_err(|_| AuthError::TokenEncoding)?;

        Ok(TokenPair {
            token_type: "bearer".to_string(),
            access_token: access.token,
            expire_at: access.expires_at,
            refresh_token: refresh.token,
            refresh_expire_at: refresh.expires_at,
        })
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// Unknown username and wrong password collapse into the same error so
    /// the response cannot reveal which usernames exist.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &user.hashed_password) {
            tracing::debug!("Password mismatch for login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_pair(user.id)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Both tokens are reissued, not just the access token. Access-kind
    /// tokens are rejected here regardless of validity.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .codec
            .decode(refresh_token, Utc::now())
            .map_err(|_| AuthError::Forbidden)?;

        if !claims.refresh {
            tracing::warn!("Access token presented on the refresh endpoint");
            return Err(AuthError::Forbidden);
        }

        let subject: i32 = claims.sub.parse().map_err(|_| AuthError::Forbidden)?;
        let user = self
            .store
            .find_by_id(subject)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.issue_pair(user.id)
    }

    /// Create a new account, subject to the registration flag and the
    /// password policy.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if !self.allow_register {
            return Err(AuthError::RegistrationDisabled);
        }

        if self.store.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        if let Some(violation) = PasswordService::password_violation(password) {
            return Err(AuthError::WeakPassword(violation.to_string()));
        }

        let hashed = PasswordService::hash_password(password)?;
        let user = self.store.insert(username, &hashed, false).await?;
        tracing::info!("Registered new user id={}", user.id);
        Ok(user)
    }

    /// Create a worker account with generated credentials.
    ///
    /// The username is a UUID and the password is random; the plaintext is
    /// returned exactly once so the caller can hand it to the worker, and is
    /// never stored or logged.
    pub async fn create_worker_account(&self) -> Result<(User, String), AuthError> {
        let username = Uuid::new_v4().to_string();
        let password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(WORKER_PASSWORD_LEN)
            .map(char::from)
            .collect();

        let hashed = PasswordService::hash_password(&password)?;
        let user = self.store.insert(&username, &hashed, true).await?;
        tracing::info!("Created worker account id={}", user.id);
        Ok((user, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::testing::MemoryUserStore;

    fn test_service(allow_register: bool) -> AuthService<MemoryUserStore> {
        let codec = TokenCodec::new(b"test_secret_key_for_testing_purposes", 15, 60);
        AuthService::new(MemoryUserStore::new(), codec, allow_register)
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test_secret_key_for_testing_purposes", 15, 60)
    }

    #[tokio::test]
    async fn test_register_then_login_roundtrip() {
        let service = test_service(true);

        let user = service.register("alice", "Zaq1@WSX!23$").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(!user.is_maintainer && !user.is_root && !user.is_worker);

        let pair = service.login("alice", "Zaq1@WSX!23$").await.unwrap();
        assert_eq!(pair.token_type, "bearer");
        assert!(pair.refresh_expire_at > pair.expire_at);

        // The issued access token carries the right subject and kind
        let claims = codec().decode(&pair.access_token, Utc::now()).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert!(!claims.refresh);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = test_service(true);
        service.register("alice", "Zaq1@WSX!23$").await.unwrap();

        let unknown_user = service.login("bob", "Zaq1@WSX!23$").await.unwrap_err();
        let wrong_password = service.login("alice", "WrongPass1!").await.unwrap_err();

        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_refresh_reissues_both_tokens() {
        let service = test_service(true);
        let user = service.register("alice", "Zaq1@WSX!23$").await.unwrap();
        let pair = service.login("alice", "Zaq1@WSX!23$").await.unwrap();

        let renewed = service.refresh(&pair.refresh_token).await.unwrap();
        let access = codec().decode(&renewed.access_token, Utc::now()).unwrap();
        let refresh = codec().decode(&renewed.refresh_token, Utc::now()).unwrap();
        assert_eq!(access.sub, user.id.to_string());
        assert!(!access.refresh);
        assert!(refresh.refresh);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_tokens() {
        let service = test_service(true);
        service.register("alice", "Zaq1@WSX!23$").await.unwrap();
        let pair = service.login("alice", "Zaq1@WSX!23$").await.unwrap();

        let err = service.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage_tokens() {
        let service = test_service(true);
        let err = service.refresh("not.a.token").await.unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }

    #[tokio::test]
    async fn test_refresh_of_deleted_user_is_not_found() {
        let codec = TokenCodec::new(b"test_secret_key_for_testing_purposes", 15, 60);
        let store = MemoryUserStore::new();
        let service = AuthService::new(store, codec, true);

        let user = service.register("alice", "Zaq1@WSX!23$").await.unwrap();
        let pair = service.login("alice", "Zaq1@WSX!23$").await.unwrap();

        service.store.remove(user.id);
        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_register_disabled() {
        let service = test_service(false);
        let err = service.register("alice", "Zaq1@WSX!23$").await.unwrap_err();
        assert!(matches!(err, AuthError::RegistrationDisabled));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = test_service(true);
        service.register("alice", "Zaq1@WSX!23$").await.unwrap();
        let err = service.register("alice", "Other1!pass").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let service = test_service(true);
        let err = service.register("alice", "abcdefg1").await.unwrap_err();
        match err {
            AuthError::WeakPassword(msg) => {
                assert_eq!(msg, "Password must contain at least one uppercase letter")
            }
            other => panic!("Expected WeakPassword, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_account_creation() {
        let service = test_service(true);
        let (worker, password) = service.create_worker_account().await.unwrap();

        assert!(worker.is_worker);
        assert!(!worker.is_maintainer && !worker.is_root);
        assert_eq!(password.len(), WORKER_PASSWORD_LEN);
        // The generated credentials actually authenticate
        let pair = service.login(&worker.username, &password).await.unwrap();
        assert_eq!(pair.token_type, "bearer");
    }
}
