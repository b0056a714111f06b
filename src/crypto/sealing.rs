//! Authenticated encryption of model payloads (AES-256-GCM).
//!
//! Sealed payload layout, sliced at fixed offsets on open:
//!
//! ```text
//! nonce (12 bytes) ‖ auth tag (16 bytes) ‖ ciphertext
//! ```
//!
//! Every seal generates a fresh random nonce; a nonce is never reused
//! under the same key. Open fails closed: a truncated payload or a tag
//! mismatch yields `AuthenticationFailed` and no plaintext.

use crate::errors::VaultError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

/// AEAD nonce length in bytes (96 bits, the GCM standard size).
pub const NONCE_LEN: usize = 12;

/// AEAD authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Symmetric key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Algorithm identifier stamped on encrypted model records.
pub const ALGORITHM: &str = "aes-256-gcm";

/// Generate a fresh random symmetric key, hex-encoded for storage in a
/// license record.
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    hex::encode(key)
}

/// Decode a hex-encoded symmetric key.
///
/// # Errors
/// A key of the wrong length is a configuration error, not a runtime
/// license error: fail fast with `ConfigError`.
pub fn decode_key(hex_key: &str) -> Result<[u8; KEY_LEN], VaultError> {
    let bytes = hex::decode(hex_key)
        .map_err(|e| VaultError::ConfigError(format!("Invalid encryption key hex: {}", e)))?;
    bytes.try_into().map_err(|_| {
        VaultError::ConfigError(format!(
            "Encryption key must be {} bytes ({} hex characters)",
            KEY_LEN,
            KEY_LEN * 2
        ))
    })
}

/// Encrypt a payload under the given key.
///
/// Returns the sealed `nonce ‖ tag ‖ ciphertext` buffer.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
    let cipher = Aes256Gcm::new(key.into());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the tag to the ciphertext; re-order into the
    // nonce ‖ tag ‖ ciphertext record layout.
    let tagged = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VaultError::AuthenticationFailed)?;
    let split_at = tagged.len() - TAG_LEN;

    let mut sealed = Vec::with_capacity(NONCE_LEN + tagged.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&tagged[split_at..]);
    sealed.extend_from_slice(&tagged[..split_at]);
    Ok(sealed)
}

/// Decrypt a sealed `nonce ‖ tag ‖ ciphertext` buffer.
///
/// # Errors
/// `AuthenticationFailed` on a truncated payload or AEAD tag mismatch.
/// No partial plaintext is ever returned.
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, VaultError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::AuthenticationFailed);
    }

    let nonce = Nonce::from_slice(&sealed[..NONCE_LEN]);
    let tag = &sealed[NONCE_LEN..NONCE_LEN + TAG_LEN];
    let ciphertext = &sealed[NONCE_LEN + TAG_LEN..];

    // Restore the ciphertext ‖ tag layout aes-gcm expects.
    let mut tagged = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    tagged.extend_from_slice(ciphertext);
    tagged.extend_from_slice(tag);

    let cipher = Aes256Gcm::new(key.into());
    cipher
        .decrypt(nonce, tagged.as_slice())
        .map_err(|_| VaultError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; KEY_LEN] {
        decode_key(&generate_key()).unwrap()
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = test_key();
        let plaintext = b"0123456789";
        let sealed = seal(&key, plaintext).unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), plaintext);
    }

    #[test]
    fn roundtrip_empty_payload() {
        let key = test_key();
        let sealed = seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + TAG_LEN);
        assert_eq!(open(&key, &sealed).unwrap(), b"");
    }

    #[test]
    fn sealed_layout_has_expected_length() {
        let key = test_key();
        let sealed = seal(&key, b"weights").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + TAG_LEN + 7);
    }

    #[test]
    fn nonces_are_fresh_per_seal() {
        let key = test_key();
        let a = seal(&key, b"same payload").unwrap();
        let b = seal(&key, b"same payload").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn any_flipped_bit_fails_authentication() {
        let key = test_key();
        let sealed = seal(&key, b"0123456789").unwrap();

        // Covers nonce, tag, and ciphertext regions.
        for index in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[index] ^= 0x01;
            assert!(
                matches!(open(&key, &tampered), Err(VaultError::AuthenticationFailed)),
                "bit flip at byte {} was not detected",
                index
            );
        }
    }

    #[test]
    fn truncated_payload_fails_closed() {
        let key = test_key();
        let result = open(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = seal(&test_key(), b"0123456789").unwrap();
        let result = open(&test_key(), &sealed);
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn generated_keys_decode() {
        let hex_key = generate_key();
        assert_eq!(hex_key.len(), KEY_LEN * 2);
        assert!(decode_key(&hex_key).is_ok());
    }

    #[test]
    fn wrong_key_length_is_config_error() {
        assert!(matches!(
            decode_key("00ff"),
            Err(VaultError::ConfigError(_))
        ));
        assert!(matches!(
            decode_key("not hex at all"),
            Err(VaultError::ConfigError(_))
        ));
    }
}
