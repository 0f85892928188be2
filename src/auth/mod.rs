//! User authentication.
//!
//! The credential lookup is a read-only join of `utilisateur` and `service`;
//! the hash check sits behind [`PasswordVerifier`].

pub mod login;
pub mod password;

pub use login::authenticate;
pub use password::{Argon2Params, HashVerifier, PasswordVerifier, hash_password};
