//! SHA-256 checksum helpers for model payloads.

use crate::errors::VaultError;
use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 checksum of a payload.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compare a payload against a stored hex checksum.
///
/// # Errors
/// `IntegrityCheckFailed` if the checksums differ. Comparison is
/// case-insensitive on the hex encoding.
pub fn verify_checksum(data: &[u8], expected_hex: &str) -> Result<(), VaultError> {
    let computed = sha256_hex(data);
    if !computed.eq_ignore_ascii_case(expected_hex) {
        return Err(VaultError::IntegrityCheckFailed);
    }
    Ok(())
}
