/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes from a CSPRNG, hex encoded. They carry
/// no claims; all state lives in the refresh token store.

use rand::{thread_rng, RngCore};

use crate::error::AppError;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Generate a new refresh token
///
/// `thread_rng` is a ChaCha CSPRNG seeded and periodically reseeded from the
/// operating system.
///
/// # Errors
/// Returns error if the entropy source fails
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    thread_rng()
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("Entropy source failed: {}", e)))?;

    Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}
