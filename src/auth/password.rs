// Password hashing and strength policy

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Symbols accepted by the strength policy. Note the leading space: a space
/// counts as a symbol, matching the deployed rule set.
const POLICY_SYMBOLS: &str = " !\"#$%&'()*+,-./[\\]^_`{|}~";

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh random salt.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                AuthError::Hash
            })
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed stored hash is a verification failure, not an error:
    /// whatever is in the column, a wrong password never authenticates and
    /// never takes the process down.
    pub fn verify_password(password: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            tracing::warn!("Stored password hash is malformed, treating as mismatch");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Evaluate the password strength policy.
    ///
    /// Returns `None` when the password is acceptable, or the message of the
    /// first failing rule. Rules run in a fixed order (length, digit,
    /// uppercase, lowercase, symbol) and only the first violation is
    /// reported; callers needing exhaustive feedback must iterate.
    pub fn password_violation(password: &str) -> Option<&'static str> {
        if password.chars().count() < 8 {
            return Some("Password must have 8 characters length or more");
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Some("Password must contain at least one digit");
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Some("Password must contain at least one uppercase letter");
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Some("Password must contain at least one lowercase letter");
        }
        if !password.chars().any(|c| POLICY_SYMBOLS.contains(c)) {
            return Some("Password must contain at least one symbol");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = PasswordService::hash_password("Zaq1@WSX!23$").unwrap();
        assert!(PasswordService::verify_password("Zaq1@WSX!23$", &hash));
        assert!(!PasswordService::verify_password("Zaq1@WSX!23#", &hash));
    }

    #[test]
    fn test_hashing_salts_every_call() {
        let first = PasswordService::hash_password("Abcdef1!").unwrap();
        let second = PasswordService::hash_password("Abcdef1!").unwrap();
        assert_ne!(first, second);
        assert!(PasswordService::verify_password("Abcdef1!", &first));
        assert!(PasswordService::verify_password("Abcdef1!", &second));
    }

    #[test]
    fn test_malformed_stored_hash_is_a_mismatch() {
        assert!(!PasswordService::verify_password("Abcdef1!", ""));
        assert!(!PasswordService::verify_password("Abcdef1!", "not-a-phc-string"));
        assert!(!PasswordService::verify_password("Abcdef1!", "$argon2id$garbage"));
    }

    #[test]
    fn test_policy_accepts_strong_password() {
        assert_eq!(PasswordService::password_violation("Abcdef1!"), None);
        assert_eq!(PasswordService::password_violation("Zaq1@WSX!23$"), None);
    }

    #[test]
    fn test_policy_reports_first_failure_only() {
        // "abcdefg1" has length and a digit; the first failing rule is uppercase,
        // even though the symbol rule would also fail
        assert_eq!(
            PasswordService::password_violation("abcdefg1"),
            Some("Password must contain at least one uppercase letter")
        );
    }

    #[test]
    fn test_policy_rules_in_order() {
        assert_eq!(
            PasswordService::password_violation("Ab1!"),
            Some("Password must have 8 characters length or more")
        );
        assert_eq!(
            PasswordService::password_violation("Abcdefg!"),
            Some("Password must contain at least one digit")
        );
        assert_eq!(
            PasswordService::password_violation("abcdefg1!"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            PasswordService::password_violation("ABCDEFG1!"),
            Some("Password must contain at least one lowercase letter")
        );
        assert_eq!(
            PasswordService::password_violation("Abcdefg1"),
            Some("Password must contain at least one symbol")
        );
    }

    #[test]
    fn test_space_counts_as_symbol() {
        assert_eq!(PasswordService::password_violation("Abcdef1 "), None);
    }

    proptest! {
        // Anything shorter than 8 characters fails on length, regardless of content
        #[test]
        fn prop_short_passwords_fail_on_length(password in ".{0,7}") {
            prop_assume!(password.chars().count() < 8);
            prop_assert_eq!(
                PasswordService::password_violation(&password),
                Some("Password must have 8 characters length or more")
            );
        }

        // Long alphanumeric-with-case-and-digit passwords still need a symbol
        #[test]
        fn prop_alphanumeric_passwords_need_symbol(
            body in "[a-z]{4}[A-Z]{4}[0-9]{2}"
        ) {
            prop_assert_eq!(
                PasswordService::password_violation(&body),
                Some("Password must contain at least one symbol")
            );
        }
    }
}
