//! The main public API: a vault composing the license manager, the
//! encryption engine, and the model store.
//!
//! Create one [`ModelVault`] per process and reuse it for all license
//! and model operations.

#[cfg(any(test, feature = "test-seams"))]
use crate::clock::Clock;
use crate::config::VaultConfig;
use crate::engine::{EncryptionEngine, ModelDescriptor};
use crate::errors::VaultError;
#[cfg(any(test, feature = "test-seams"))]
use crate::fingerprint::Fingerprinter;
use crate::manager::{IssueOptions, LicenseManager, ValidationResult};
use crate::records::{EncryptedModel, License, LicenseStatus};
use crate::store::model::FileModelStore;
#[cfg(any(test, feature = "test-seams"))]
use std::sync::Arc;

/// License-bound model protection: issue licenses, encrypt model
/// payloads under them, and gate every load on full license validation.
pub struct ModelVault {
    manager: LicenseManager,
    engine: EncryptionEngine,
    models: FileModelStore,
}

impl ModelVault {
    /// Create a vault with the given configuration.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails or the store
    /// directories cannot be created.
    pub fn new(config: VaultConfig) -> Result<Self, VaultError> {
        config.validate()?;
        let models = FileModelStore::new(config.store_root()?.join("models"))?;
        Ok(Self {
            manager: LicenseManager::new(config)?,
            engine: EncryptionEngine::new(),
            models,
        })
    }

    /// Create a vault with injected clock and fingerprint seams (for
    /// tests).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_seams(
        config: VaultConfig,
        clock: Arc<dyn Clock>,
        fingerprinter: Arc<dyn Fingerprinter>,
    ) -> Result<Self, VaultError> {
        config.validate()?;
        let models = FileModelStore::new(config.store_root()?.join("models"))?;
        Ok(Self {
            manager: LicenseManager::new_with_seams(config, clock.clone(), fingerprinter)?,
            engine: EncryptionEngine::with_clock(clock),
            models,
        })
    }

    /// Issue a license for a user and model.
    pub fn issue_license(
        &self,
        user_id: &str,
        model_name: &str,
        options: IssueOptions,
    ) -> Result<License, VaultError> {
        self.manager.issue(user_id, model_name, options)
    }

    /// Encrypt a model payload under an existing license and persist the
    /// encrypted record.
    ///
    /// # Errors
    /// `LicenseNotFound` if the license is absent, `LicenseRejected`
    /// if it was deactivated, plus any encryption or store failure.
    pub fn protect_model(
        &self,
        model_name: &str,
        plaintext: &[u8],
        license_id: &str,
        descriptor: ModelDescriptor,
    ) -> Result<EncryptedModel, VaultError> {
        let license = self
            .manager
            .get(license_id)?
            .ok_or_else(|| VaultError::LicenseNotFound(license_id.to_string()))?;
        if !license.is_active {
            return Err(VaultError::LicenseRejected(LicenseStatus::Deactivated));
        }

        let model = self
            .engine
            .encrypt(model_name, plaintext, &license, descriptor)?;
        self.models.save(&model)?;

        tracing::info!(model_name, license_id, "model protected");
        Ok(model)
    }

    /// Load and decrypt a model, gated on full license validation.
    ///
    /// Pipeline:
    /// 1. Validate the license key (signature, lookup, active flag,
    ///    expiry, hardware binding)
    /// 2. Load the encrypted record
    /// 3. Require the record to have been encrypted under this license
    /// 4. Decrypt and verify the plaintext checksum
    ///
    /// # Errors
    /// `LicenseRejected` with the reason code when validation does not
    /// come back `active`; `ModelNotFound` when no record exists;
    /// `AuthenticationFailed` / `IntegrityCheckFailed` from decryption.
    pub fn load_model(
        &self,
        model_name: &str,
        license_key: &str,
    ) -> Result<Vec<u8>, VaultError> {
        let validation = self.manager.validate(license_key)?;
        let license = match validation {
            ValidationResult {
                valid: true,
                license: Some(license),
                ..
            } => license,
            ValidationResult { status, .. } => {
                return Err(VaultError::LicenseRejected(status));
            }
        };

        let model = self
            .models
            .load(model_name)?
            .ok_or_else(|| VaultError::ModelNotFound(model_name.to_string()))?;

        let plaintext = self.engine.decrypt(&model, &license)?;
        tracing::debug!(model_name, license_id = %license.id, "model loaded");
        Ok(plaintext)
    }

    /// Consume one activation slot on a license.
    pub fn activate(&self, license_id: &str) -> Result<License, VaultError> {
        self.manager.activate(license_id)
    }

    /// Deactivate a license; irreversible.
    pub fn deactivate(&self, license_id: &str) -> Result<License, VaultError> {
        self.manager.deactivate(license_id)
    }

    /// Validate a license key without loading any model.
    pub fn validate_license(&self, license_key: &str) -> Result<ValidationResult, VaultError> {
        self.manager.validate(license_key)
    }

    /// Read-only status projection for a license identifier.
    pub fn license_status(&self, license_id: &str) -> Result<ValidationResult, VaultError> {
        self.manager.status(license_id)
    }

    /// List the encrypted model records in the store.
    pub fn list_models(&self) -> Result<Vec<EncryptedModel>, VaultError> {
        self.models.list()
    }

    /// Access the underlying license manager.
    pub fn manager(&self) -> &LicenseManager {
        &self.manager
    }
}
