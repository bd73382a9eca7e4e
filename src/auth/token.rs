// JWT issue/decode for access and refresh tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token kind carried in the claims as the `refresh` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure.
///
/// The subject is the account id rendered as a string; `refresh`
/// discriminates the two token kinds so an access token can never stand in
/// for a refresh token or vice versa.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub refresh: bool,
}

impl Claims {
    pub fn kind(&self) -> TokenKind {
        if self.refresh {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }
}

/// Decode failure taxonomy.
///
/// Expired and invalid are kept apart for logging and tests; every caller
/// maps both to the same 403 response, so the split is never wire-visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
}

/// A freshly issued token together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless JWT codec.
///
/// Holds the process-wide signing secret and the per-kind lifetimes; the
/// algorithm is pinned to HS256 on both encode and decode so a client can
/// never negotiate it.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

impl TokenCodec {
    pub fn new(secret: &[u8], access_minutes: i64, refresh_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::minutes(refresh_minutes),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a signed token for `subject` expiring `ttl(kind)` after `now`.
    pub fn issue(
        &self,
        subject: i32,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl(kind);
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            refresh: kind == TokenKind::Refresh,
        };

        let token = jsonwebtoken::encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| {
            tracing::error!("Token encoding failed: {}", e);
            TokenError::Invalid
        })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and structure, then check expiry against `now`.
    ///
    /// Expiry is evaluated here rather than by the jsonwebtoken validator so
    /// the clock can be injected; `now` strictly past `exp` fails.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?;

        if now.timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ACCESS_MINUTES: i64 = 15;
    const REFRESH_MINUTES: i64 = 60 * 24 * 7;

    fn test_codec() -> TokenCodec {
        TokenCodec::new(b"test_secret_key_for_testing_purposes", ACCESS_MINUTES, REFRESH_MINUTES)
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_roundtrip_preserves_subject_and_kind() {
        let codec = test_codec();
        let now = t0();

        let issued = codec.issue(42, TokenKind::Access, now).unwrap();
        let claims = codec.decode(&issued.token, now).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind(), TokenKind::Access);

        let issued = codec.issue(42, TokenKind::Refresh, now).unwrap();
        let claims = codec.decode(&issued.token, now).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind(), TokenKind::Refresh);
    }

    #[test]
    fn test_expiry_follows_configured_lifetimes() {
        let codec = test_codec();
        let now = t0();

        let access = codec.issue(1, TokenKind::Access, now).unwrap();
        assert_eq!(access.expires_at, now + Duration::minutes(ACCESS_MINUTES));

        let refresh = codec.issue(1, TokenKind::Refresh, now).unwrap();
        assert_eq!(refresh.expires_at, now + Duration::minutes(REFRESH_MINUTES));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = test_codec();
        let now = t0();
        let issued = codec.issue(1, TokenKind::Access, now).unwrap();

        // Still valid exactly at expiry, rejected one second past it
        assert!(codec.decode(&issued.token, issued.expires_at).is_ok());
        let late = issued.expires_at + Duration::seconds(1);
        assert_eq!(codec.decode(&issued.token, late), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid_not_expired() {
        let codec = test_codec();
        let other = TokenCodec::new(b"another_secret_entirely", ACCESS_MINUTES, REFRESH_MINUTES);
        let now = t0();

        let issued = codec.issue(1, TokenKind::Access, now).unwrap();
        assert_eq!(other.decode(&issued.token, now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_algorithm_is_pinned() {
        // Sign with the same secret but HS384; decode must refuse it
        let now = t0();
        let claims = Claims {
            sub: "1".to_string(),
            exp: (now + Duration::minutes(5)).timestamp(),
            refresh: false,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_for_testing_purposes"),
        )
        .unwrap();

        let codec = test_codec();
        assert_eq!(codec.decode(&token, now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let codec = test_codec();
        let now = t0();
        for garbage in ["", "not.a.token", "a.b", "eyJhbGciOiJIUzI1NiJ9.x.y"] {
            assert_eq!(codec.decode(garbage, now), Err(TokenError::Invalid));
        }
    }

    #[test]
    fn test_missing_refresh_claim_is_invalid() {
        // A token without the `refresh` field fails claim deserialization
        #[derive(serde::Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }
        let now = t0();
        let token = jsonwebtoken::encode(
            &Header::new(JWT_ALGORITHM),
            &Partial { sub: "1".to_string(), exp: (now + Duration::minutes(5)).timestamp() },
            &EncodingKey::from_secret(b"test_secret_key_for_testing_purposes"),
        )
        .unwrap();

        let codec = test_codec();
        assert_eq!(codec.decode(&token, now), Err(TokenError::Invalid));
    }

    proptest! {
        // Roundtrip holds for any subject id and both kinds
        #[test]
        fn prop_roundtrip(subject in 1i32..1_000_000, refresh in proptest::bool::ANY) {
            let codec = test_codec();
            let now = t0();
            let kind = if refresh { TokenKind::Refresh } else { TokenKind::Access };

            let issued = codec.issue(subject, kind, now).unwrap();
            let claims = codec.decode(&issued.token, now).unwrap();
            prop_assert_eq!(claims.sub.clone(), subject.to_string());
            prop_assert_eq!(claims.kind(), kind);
        }

        // Random strings never decode
        #[test]
        fn prop_random_strings_rejected(garbage in "[a-zA-Z0-9]{10,60}") {
            let codec = test_codec();
            prop_assert_eq!(codec.decode(&garbage, t0()), Err(TokenError::Invalid));
        }
    }
}
