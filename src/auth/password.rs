//! Argon2 password hashing with per-password random salts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Constant result for unparseable hashes: a corrupted stored hash reads as
/// a failed login, not an error.
pub fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_its_own_hashes() {
        let hashed = hash("hunter2!").unwrap();
        assert!(verify("hunter2!", &hashed));
        assert!(!verify("hunter3!", &hashed));
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(hash("hunter2!").unwrap(), hash("hunter2!").unwrap());
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify("hunter2!", "not-a-phc-string"));
    }
}
