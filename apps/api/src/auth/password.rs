//! Password hashing (Argon2id), policy checks and server-side generation.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng as SaltRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

pub const GENERATED_PASSWORD_LEN: usize = 12;
pub const MIN_PASSWORD_LEN: usize = 8;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
pub const SPECIAL: &[u8] = b"!@#$%&*?-_+=";

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// Hash a plaintext password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut SaltRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| HashError(e.to_string()))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| HashError(format!("invalid hash format: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HashError(format!("verify error: {e}"))),
    }
}

/// Hash that no submitted password matches, computed once per process.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password(&generate_password()).ok())
        .as_deref()
}

/// Runs one full verification against a throwaway hash. Called when the
/// account does not exist so that lookups cost the same either way.
pub fn verify_dummy(password: &str) -> bool {
    dummy_hash()
        .map(|hash| verify_password(password, hash).unwrap_or(false))
        .unwrap_or(false)
}

/// Rules a user-chosen password must satisfy. Returns the violated rules;
/// an empty list means the password is acceptable.
pub fn check_policy(password: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain a digit".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        violations.push("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        violations.push("Password must contain an uppercase letter".to_string());
    }
    if password.chars().all(char::is_alphanumeric) {
        violations.push("Password must contain a non-alphanumeric character".to_string());
    }
    violations
}

/// Generates a 12-character password with at least one uppercase letter,
/// lowercase letter, digit and symbol from [`SPECIAL`], shuffled so the
/// guaranteed characters land in random positions.
pub fn generate_password() -> String {
    let mut rng = OsRng;
    let classes = [UPPERCASE, LOWERCASE, DIGITS, SPECIAL];
    let alphabet: Vec<u8> = classes.concat();

    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    while chars.len() < GENERATED_PASSWORD_LEN {
        chars.push(alphabet[rng.gen_range(0..alphabet.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secreto123*").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secreto123*", &hash).unwrap());
        assert!(!verify_password("secreto123*", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        assert!(dummy_hash().unwrap().starts_with("$argon2id$"));
        assert!(!verify_dummy("Secreto123*"));
        assert!(!verify_dummy(""));
    }

    #[test]
    fn test_policy_accepts_strong_password() {
        assert!(check_policy("Secreto123*").is_empty());
    }

    #[test]
    fn test_policy_reports_every_violation() {
        let violations = check_policy("abc");
        assert_eq!(violations.len(), 4, "{violations:?}");
        assert_eq!(check_policy("Password123").len(), 1);
    }

    #[test]
    fn test_generated_password_has_every_class() {
        for _ in 0..200 {
            let pw = generate_password();
            assert_eq!(pw.len(), GENERATED_PASSWORD_LEN);
            assert!(pw.bytes().any(|b| UPPERCASE.contains(&b)), "{pw}");
            assert!(pw.bytes().any(|b| LOWERCASE.contains(&b)), "{pw}");
            assert!(pw.bytes().any(|b| DIGITS.contains(&b)), "{pw}");
            assert!(pw.bytes().any(|b| SPECIAL.contains(&b)), "{pw}");
            assert!(check_policy(&pw).is_empty(), "{pw}");
        }
    }

    #[test]
    fn test_generated_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
    }
}
