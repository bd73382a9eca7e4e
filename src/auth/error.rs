// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Authentication and authorization failures.
///
/// Every variant maps to a fixed wire response. Two body shapes exist for
/// historical reasons: the token endpoints answer with `{"detail": ...}`
/// while the registration and lookup paths answer with `{"message": ...}`,
/// and existing clients match on the keys.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bad username or password at login. Deliberately covers both cases so
    /// responses cannot be used to enumerate usernames.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// Token missing, malformed, expired, wrong kind, or role check failed.
    #[error("could not validate credentials")]
    Forbidden,

    /// Refresh token was valid but its subject no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Bearer token was valid but the account behind it is gone (guard path,
    /// legacy `message` body shape).
    #[error("user not found")]
    AccountNotFound,

    #[error("user registration is disabled")]
    RegistrationDisabled,

    #[error("username is already taken")]
    UsernameTaken,

    /// Password rejected by the strength policy; carries the first failing
    /// rule's message.
    #[error("{0}")]
    WeakPassword(String),

    /// Request DTO failed structural validation (field lengths etc.)
    #[error("validation error")]
    Validation(#[from] validator::ValidationErrors),

    #[error("invalid worker register key")]
    InvalidRegisterKey,

    /// Operation on a root account attempted by a non-root caller
    #[error("root permission required")]
    RootRequired,

    /// Repository fault. Propagated unrecovered to the boundary and surfaced
    /// as a 500 with details kept out of the response.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error")]
    Hash,

    /// Token signing failed. Same 500 surface as `Hash`, kept apart so the
    /// logs name the faulting subsystem.
    #[error("token encoding error")]
    TokenEncoding,
}

enum BodyKey {
    Detail,
    Message,
}

impl AuthError {
    fn response_parts(&self) -> (StatusCode, BodyKey, String) {
        match self {
            AuthError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                BodyKey::Detail,
                "Incorrect username or password".to_string(),
            ),
            AuthError::Forbidden => {
                warn!("Request rejected: could not validate credentials");
                (
                    StatusCode::FORBIDDEN,
                    BodyKey::Detail,
                    "Could not validate credentials".to_string(),
                )
            }
            AuthError::UserNotFound => (
                StatusCode::NOT_FOUND,
                BodyKey::Detail,
                "User not found".to_string(),
            ),
            AuthError::AccountNotFound => (
                StatusCode::NOT_FOUND,
                BodyKey::Message,
                "User not found".to_string(),
            ),
            AuthError::RegistrationDisabled => (
                StatusCode::BAD_REQUEST,
                BodyKey::Message,
                "This endpoint is optional and was disabled by administrator.".to_string(),
            ),
            AuthError::UsernameTaken => (
                StatusCode::BAD_REQUEST,
                BodyKey::Message,
                "This username is already taken".to_string(),
            ),
            // 404 for a policy violation is part of the frozen wire contract
            AuthError::WeakPassword(msg) => {
                (StatusCode::NOT_FOUND, BodyKey::Message, msg.clone())
            }
            AuthError::Validation(errors) => {
                debug_assert!(!errors.is_empty());
                (
                    StatusCode::BAD_REQUEST,
                    BodyKey::Message,
                    "Request validation failed".to_string(),
                )
            }
            AuthError::InvalidRegisterKey => (
                StatusCode::NOT_FOUND,
                BodyKey::Message,
                "Provided register key is not valid.".to_string(),
            ),
            AuthError::RootRequired => (
                StatusCode::FORBIDDEN,
                BodyKey::Message,
                "Root permission required".to_string(),
            ),
            AuthError::Database(e) => {
                error!("Database error in auth: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    BodyKey::Message,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Hash => {
                error!("Password hashing error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    BodyKey::Message,
                    "Internal server error".to_string(),
                )
            }
            AuthError::TokenEncoding => {
                error!("Token encoding error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    BodyKey::Message,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, key, message) = self.response_parts();
        let body = match key {
            BodyKey::Detail => json!({ "detail": message }),
            BodyKey::Message => json!({ "message": message }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(err: AuthError) -> (StatusCode, String) {
        let (status, key, message) = err.response_parts();
        let key = match key {
            BodyKey::Detail => "detail",
            BodyKey::Message => "message",
        };
        (status, format!("{}={}", key, message))
    }

    #[test]
    fn test_login_failure_is_a_generic_400() {
        assert_eq!(
            parts(AuthError::InvalidCredentials),
            (
                StatusCode::BAD_REQUEST,
                "detail=Incorrect username or password".to_string()
            )
        );
    }

    #[test]
    fn test_forbidden_is_403_with_detail_body() {
        assert_eq!(
            parts(AuthError::Forbidden),
            (
                StatusCode::FORBIDDEN,
                "detail=Could not validate credentials".to_string()
            )
        );
    }

    #[test]
    fn test_not_found_body_keys_differ_by_path() {
        assert_eq!(
            parts(AuthError::UserNotFound),
            (StatusCode::NOT_FOUND, "detail=User not found".to_string())
        );
        assert_eq!(
            parts(AuthError::AccountNotFound),
            (StatusCode::NOT_FOUND, "message=User not found".to_string())
        );
    }

    #[test]
    fn test_weak_password_keeps_legacy_404() {
        let (status, body) = parts(AuthError::WeakPassword(
            "Password must contain at least one digit".to_string(),
        ));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "message=Password must contain at least one digit");
    }

    #[test]
    fn test_database_details_never_leak() {
        let (status, body) = parts(AuthError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "message=Internal server error");
    }

    #[test]
    fn test_infrastructure_faults_share_the_500_surface() {
        for err in [AuthError::Hash, AuthError::TokenEncoding] {
            let (status, body) = parts(err);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "message=Internal server error");
        }
    }
}
