// Request guards: bearer-token authentication and role checks

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    models::User,
    repository::{PgUserStore, UserStore},
    token::TokenCodec,
};
use crate::AppState;

/// Role predicate a protected operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated account
    Any,
    /// `is_maintainer` or `is_root`
    MaintainerOrRoot,
    /// `is_root` only
    Root,
    /// `is_worker` only
    Worker,
}

impl RoleRequirement {
    fn satisfied_by(self, user: &User) -> bool {
        match self {
            RoleRequirement::Any => true,
            RoleRequirement::MaintainerOrRoot => user.is_maintainer || user.is_root,
            RoleRequirement::Root => user.is_root,
            RoleRequirement::Worker => user.is_worker,
        }
    }
}

/// Decode a bearer token and resolve it to a stored account.
///
/// Refresh-kind tokens are rejected here: only access tokens authorize
/// requests. A valid token whose subject no longer exists yields
/// `AccountNotFound` (404), everything else `Forbidden` (403).
pub async fn authenticate<S: UserStore>(
    store: &S,
    codec: &TokenCodec,
    bearer: &str,
) -> Result<User, AuthError> {
    let claims = codec.decode(bearer, Utc::now()).map_err(|e| {
        debug!("Bearer token rejected: {}", e);
        AuthError::Forbidden
    })?;

    if claims.refresh {
        warn!("Refresh token presented as a request credential");
        return Err(AuthError::Forbidden);
    }

    let subject: i32 = claims.sub.parse().map_err(|_| AuthError::Forbidden)?;
    store
        .find_by_id(subject)
        .await?
        .ok_or(AuthError::AccountNotFound)
}

/// Enforce a role predicate on an already-authenticated account.
pub fn require_role(user: &User, requirement: RoleRequirement) -> Result<(), AuthError> {
    if requirement.satisfied_by(user) {
        Ok(())
    } else {
        warn!(
            "Authorization failed: user_id={} requirement={:?}",
            user.id, requirement
        );
        Err(AuthError::Forbidden)
    }
}

fn bearer_from_parts(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Forbidden)?
        .to_str()
        .map_err(|_| AuthError::Forbidden)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Forbidden)
}

async fn guard(parts: &Parts, state: &AppState, requirement: RoleRequirement) -> Result<User, AuthError> {
    let bearer = bearer_from_parts(parts)?;
    let store = PgUserStore::new(state.db.clone());
    let user = authenticate(&store, &state.codec, bearer).await?;
    require_role(&user, requirement)?;
    Ok(user)
}

macro_rules! role_extractor {
    ($name:ident, $requirement:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone)]
        pub struct $name(pub User);

        #[async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = AuthError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                guard(parts, state, $requirement).await.map($name)
            }
        }
    };
}

role_extractor!(CurrentUser, RoleRequirement::Any, "Any authenticated account.");
role_extractor!(
    MaintainerUser,
    RoleRequirement::MaintainerOrRoot,
    "Account with the maintainer or root flag."
);
role_extractor!(RootUser, RoleRequirement::Root, "Account with the root flag.");
role_extractor!(WorkerUser, RoleRequirement::Worker, "Worker account.");
