//! Password digests for stored credentials.
//!
//! Stored form is the lowercase hex SHA-256 of the UTF-8 password.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub fn hash_password(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

/// Compare `plain` against a stored digest without early exit.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(plain);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
