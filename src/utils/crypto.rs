use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::Result;

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hashed)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = assert_ok!(hash_password("s3cret"));
        assert_ne!(hash, "s3cret");
        assert!(assert_ok!(verify_password("s3cret", &hash)));
        assert!(!assert_ok!(verify_password("other", &hash)));
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        assert_err!(verify_password("s3cret", "not-a-phc-string"));
    }
}
