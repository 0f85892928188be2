//! Password hashing and verification.

use crate::error::{DbError, DbResult};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

/// One-way check of a plaintext secret against a stored hash.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> DbResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| DbError::internal(format!("create argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Argon2id RFC recommendations
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Verifies stored hashes by scheme: Argon2 PHC strings and bcrypt
/// (`$2a$`, `$2b$`, `$2y$`, the latter being what PHP `password_hash` writes).
///
/// Parameters and cost are read from the hash itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashVerifier;

const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

fn verify_argon2(plain: &str, hash: &str) -> bool {
    // A stored value that is not a PHC string never matches
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

impl PasswordVerifier for HashVerifier {
    fn verify(&self, plain: &str, hash: &str) -> bool {
        if is_bcrypt(hash) {
            bcrypt::verify(plain, hash).unwrap_or(false)
        } else {
            verify_argon2(plain, hash)
        }
    }
}

/// Hash a password with the given parameters or secure defaults.
pub fn hash_password_with_params(plain: &str, params: Option<Argon2Params>) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.unwrap_or_default().to_argon2()?;
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| DbError::internal(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Hash a password with default parameters, for seeding the credential store.
pub fn hash_password(plain: &str) -> DbResult<String> {
    hash_password_with_params(plain, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> Option<Argon2Params> {
        Some(Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password_with_params("s3cret", fast_params()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(HashVerifier.verify("s3cret", &hash));
        assert!(!HashVerifier.verify("wrong", &hash));
    }

    #[test]
    fn test_same_input_different_salts() {
        let a = hash_password_with_params("s3cret", fast_params()).unwrap();
        let b = hash_password_with_params("s3cret", fast_params()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!HashVerifier.verify("s3cret", "s3cret"));
        assert!(!HashVerifier.verify("", ""));
        assert!(!HashVerifier.verify("x", "$2y$10$abcdefghijklmnopqrstuv"));
        assert!(!HashVerifier.verify("x", "$argon2id$not-a-hash"));
    }

    #[test]
    fn test_php_bcrypt_hash() {
        let hash = "$2y$10$.vGA1O9wmRjrwAVXD98HNOgsNpDczlqm3Jq7KnEd1rVAGv3Fykk1a";
        assert!(HashVerifier.verify("rasmuslerdorf", hash));
        assert!(!HashVerifier.verify("rasmus", hash));
    }

    #[test]
    fn test_bcrypt_prefixes() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(HashVerifier.verify("s3cret", &hash));
        let legacy = hash.replacen("$2b$", "$2a$", 1);
        assert!(HashVerifier.verify("s3cret", &legacy));
    }
}
