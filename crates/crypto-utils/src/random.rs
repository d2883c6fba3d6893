use rand_core::{OsRng, RngCore};

use crate::error::CryptoError;

/// Draws `N` bytes from the operating system's secure random source.
///
/// Unlike `RngCore::fill_bytes`, a failing source is reported instead of
/// panicking, so callers can surface it as an entropy error.
pub fn try_random_bytes<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
    Ok(buf)
}
