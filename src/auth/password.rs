/// Password Hashing and Verification
///
/// bcrypt with a per-call random salt embedded in the digest. Digests are
/// never compared for equality, only through `verify_password`.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// bcrypt cost factor
const BCRYPT_COST: u32 = 10;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns error only if bcrypt itself fails (e.g. the entropy source)
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its digest
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
/// Returns error if the digest is not a well-formed bcrypt hash
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    verify(password, digest)
        .map_err(|e| AppError::Internal(format!("Malformed password digest: {}", e)))
}
