//! Encryption Engine — authenticated encryption of model payloads under
//! a license's symmetric key.
//!
//! The engine owns the encrypt/decrypt transform and never mutates
//! license state. Decryption fails closed: any authentication or
//! integrity failure yields an error and no plaintext.

use crate::clock::{Clock, SystemClock};
use crate::crypto::{digest, sealing};
use crate::errors::VaultError;
use crate::records::{EncryptedModel, License, ModelMetadata, ResourceRequirements};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;

/// Caller-supplied description of a model being protected. Size and
/// checksum are computed by the engine, not trusted from the caller.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Model version string.
    pub version: String,

    /// Capability list, e.g. "text-generation".
    pub capabilities: Vec<String>,

    /// Hardware and resource requirements.
    pub requirements: ResourceRequirements,
}

/// Authenticated encryption/decryption of model payloads.
pub struct EncryptionEngine {
    clock: Arc<dyn Clock>,
}

impl Default for EncryptionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionEngine {
    /// Create an engine using the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Create an engine with an injected clock (for tests).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Encrypt a model payload under the license's symmetric key.
    ///
    /// Seals the payload as `nonce ‖ tag ‖ ciphertext` with a fresh
    /// random nonce, and records the plaintext SHA-256 checksum and size
    /// in the metadata so a later decryption can be verified end to end.
    ///
    /// # Errors
    /// `ConfigError` if the license's encryption key has the wrong
    /// length; `AuthenticationFailed` if sealing fails.
    pub fn encrypt(
        &self,
        model_name: &str,
        plaintext: &[u8],
        license: &License,
        descriptor: ModelDescriptor,
    ) -> Result<EncryptedModel, VaultError> {
        let key = sealing::decode_key(&license.encryption_key)?;
        let sealed = sealing::seal(&key, plaintext)?;

        let model = EncryptedModel {
            model_name: model_name.to_string(),
            encrypted_data: STANDARD.encode(&sealed),
            metadata: ModelMetadata {
                original_size: plaintext.len() as u64,
                checksum: digest::sha256_hex(plaintext),
                version: descriptor.version,
                capabilities: descriptor.capabilities,
                requirements: descriptor.requirements,
            },
            license_id: license.id.clone(),
            encryption_algorithm: sealing::ALGORITHM.to_string(),
            created_at: self.clock.now_utc(),
        };

        tracing::debug!(
            model_name,
            license_id = %license.id,
            size = model.metadata.original_size,
            "encrypted model payload"
        );
        Ok(model)
    }

    /// Decrypt a model payload with the license it was encrypted under.
    ///
    /// Pipeline:
    /// 1. Require the record's `licenseId` to match the supplied license
    ///    (fail closed before touching key material)
    /// 2. Base64-decode the sealed payload
    /// 3. AEAD-open (`AuthenticationFailed` on tag mismatch; no partial
    ///    plaintext)
    /// 4. Re-verify plaintext size and SHA-256 checksum against the
    ///    stored metadata (`IntegrityCheckFailed`) — catches stale or
    ///    reconciled-wrong metadata, which AEAD cannot see
    pub fn decrypt(
        &self,
        model: &EncryptedModel,
        license: &License,
    ) -> Result<Vec<u8>, VaultError> {
        if model.license_id != license.id {
            tracing::warn!(
                model_name = %model.model_name,
                expected = %model.license_id,
                supplied = %license.id,
                "decryption attempted with mismatched license"
            );
            return Err(VaultError::AuthenticationFailed);
        }

        let key = sealing::decode_key(&license.encryption_key)?;
        let sealed = STANDARD
            .decode(&model.encrypted_data)
            .map_err(|_| VaultError::AuthenticationFailed)?;

        let plaintext = sealing::open(&key, &sealed)?;

        if plaintext.len() as u64 != model.metadata.original_size {
            return Err(VaultError::IntegrityCheckFailed);
        }
        digest::verify_checksum(&plaintext, &model.metadata.checksum)?;

        Ok(plaintext)
    }
}
