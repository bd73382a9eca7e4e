// User persistence: the lookup capability the auth core depends on,
// plus the administration queries used by the users endpoints

use axum::async_trait;
use sqlx::PgPool;

use crate::auth::{error::AuthError, models::User};

/// The user-lookup capability the auth core is written against.
///
/// Login, refresh, registration and the request guards only ever need these
/// three operations; everything else on `PgUserStore` belongs to the user
/// administration endpoints and stays off the trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError>;

    /// Insert a new account; `is_worker` marks machine accounts created by
    /// worker registration. Username uniqueness is enforced here, by the
    /// storage layer.
    async fn insert(
        &self,
        username: &str,
        hashed_password: &str,
        is_worker: bool,
    ) -> Result<User, AuthError>;
}

const USER_COLUMNS: &str =
    "id, username, full_name, hashed_password, is_maintainer, is_root, is_worker";

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users for the maintainer overview, oldest first.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, AuthError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id OFFSET $1 LIMIT $2",
            USER_COLUMNS
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Apply a profile update as one statement; absent fields keep their
    /// current values, so a fault can never leave a half-applied profile.
    /// Returns the updated row, or `None` when the user is gone.
    pub async fn update_profile(
        &self,
        id: i32,
        hashed_password: Option<&str>,
        full_name: Option<&str>,
        is_maintainer: Option<bool>,
        is_root: Option<bool>,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
             hashed_password = COALESCE($2, hashed_password), \
             full_name = COALESCE($3, full_name), \
             is_maintainer = COALESCE($4, is_maintainer), \
             is_root = COALESCE($5, is_root) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(hashed_password)
        .bind(full_name)
        .bind(is_maintainer)
        .bind(is_root)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(
        &self,
        username: &str,
        hashed_password: &str,
        is_worker: bool,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, hashed_password, is_worker) VALUES ($1, $2, $3) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(hashed_password)
        .bind(is_worker)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::UsernameTaken;
                }
            }
            AuthError::Database(e)
        })?;

        Ok(user)
    }
}

/// In-memory store backing the service and guard unit tests.
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    pub struct MemoryUserStore {
        users: Mutex<Vec<User>>,
        next_id: Mutex<i32>,
    }

    impl MemoryUserStore {
        pub fn new() -> Self {
            Self {
                users: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
            }
        }

        /// Seed an account directly, bypassing registration.
        pub fn seed(&self, user: User) {
            self.users.lock().unwrap().push(user);
        }

        pub fn set_maintainer(&self, id: i32, is_maintainer: bool) {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == id) {
                user.is_maintainer = is_maintainer;
            }
        }

        pub fn remove(&self, id: i32) {
            self.users.lock().unwrap().retain(|u| u.id != id);
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn insert(
            &self,
            username: &str,
            hashed_password: &str,
            is_worker: bool,
        ) -> Result<User, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == username) {
                return Err(AuthError::UsernameTaken);
            }
            let mut next_id = self.next_id.lock().unwrap();
            let user = User {
                id: *next_id,
                username: username.to_string(),
                full_name: None,
                hashed_password: hashed_password.to_string(),
                is_maintainer: false,
                is_root: false,
                is_worker,
            };
            *next_id += 1;
            users.push(user.clone());
            Ok(user)
        }
    }
}
