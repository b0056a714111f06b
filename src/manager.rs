//! License Manager — issuance, validation, and the activation state
//! machine.
//!
//! States: issued (active, unexpired) → activated (1..=max) →
//! deactivated (terminal). "Expired" is derived at check time from the
//! expiration timestamp, never stored. There is no transition out of
//! deactivated.

use crate::clock::{Clock, SystemClock};
use crate::config::VaultConfig;
use crate::crypto::{keymac, sealing};
use crate::errors::VaultError;
use crate::fingerprint::{Fingerprinter, HostFingerprint};
use crate::records::{License, LicenseStatus};
use crate::store::license::FileLicenseStore;
use std::sync::Arc;
use uuid::Uuid;

/// Options for issuing a new license.
#[derive(Debug, Clone)]
pub struct IssueOptions {
    /// Feature flags enabled on the license.
    pub features: Vec<String>,

    /// Maximum permitted activations.
    pub max_activations: u32,

    /// Validity period in days from issuance.
    pub validity_days: i64,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            max_activations: 1,
            validity_days: 365,
        }
    }
}

/// Outcome of a license validation or status query.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether every check passed.
    pub valid: bool,

    /// Machine-readable reason code.
    pub status: LicenseStatus,

    /// The license record, when one was found.
    pub license: Option<License>,
}

impl ValidationResult {
    fn negative(status: LicenseStatus, license: Option<License>) -> Self {
        Self {
            valid: false,
            status,
            license,
        }
    }
}

/// License state machine: issue, validate, activate, deactivate, status.
///
/// The manager exclusively owns license mutation. Create one instance
/// per process and reuse it.
pub struct LicenseManager {
    config: VaultConfig,
    clock: Arc<dyn Clock>,
    fingerprinter: Arc<dyn Fingerprinter>,
    store: FileLicenseStore,
}

impl LicenseManager {
    /// Create a license manager with the given configuration.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails or the store
    /// directory cannot be created.
    pub fn new(config: VaultConfig) -> Result<Self, VaultError> {
        config.validate()?;
        Self::build(config, Arc::new(SystemClock), Arc::new(HostFingerprint))
    }

    /// Create a manager with injected clock and fingerprint seams (for
    /// tests).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_seams(
        config: VaultConfig,
        clock: Arc<dyn Clock>,
        fingerprinter: Arc<dyn Fingerprinter>,
    ) -> Result<Self, VaultError> {
        config.validate()?;
        Self::build(config, clock, fingerprinter)
    }

    fn build(
        config: VaultConfig,
        clock: Arc<dyn Clock>,
        fingerprinter: Arc<dyn Fingerprinter>,
    ) -> Result<Self, VaultError> {
        let store = FileLicenseStore::new(config.store_root()?.join("licenses"))?;
        Ok(Self {
            config,
            clock,
            fingerprinter,
            store,
        })
    }

    /// Issue a license for a user and model.
    ///
    /// Generates the identifier, a fresh symmetric encryption key, and
    /// the signed license key; binds the current hardware fingerprint;
    /// persists and returns the record. Duplicate licenses for the same
    /// user and model are permitted by design (multi-seat purchases are
    /// independent records).
    pub fn issue(
        &self,
        user_id: &str,
        model_name: &str,
        options: IssueOptions,
    ) -> Result<License, VaultError> {
        if options.max_activations == 0 {
            return Err(VaultError::ConfigError(
                "max_activations must be at least 1".to_string(),
            ));
        }

        let now = self.clock.now_utc();
        let id = Uuid::new_v4().to_string();
        let license_key = keymac::sign(
            &self.config.signing_secret,
            &id,
            user_id,
            model_name,
            now.timestamp_millis(),
        );

        let license = License {
            id,
            user_id: user_id.to_string(),
            model_name: model_name.to_string(),
            license_key,
            encryption_key: sealing::generate_key(),
            expiration_date: now + chrono::Duration::days(options.validity_days),
            activation_date: now,
            max_activations: options.max_activations,
            current_activations: 0,
            hardware_fingerprint: self.fingerprinter.fingerprint(),
            features: options.features,
            is_active: true,
            last_validation: now,
        };

        self.store.save(&license)?;
        tracing::info!(
            license_id = %license.id,
            user_id,
            model_name,
            max_activations = license.max_activations,
            "issued license"
        );
        Ok(license)
    }

    /// Validate a license key.
    ///
    /// Pipeline:
    /// 1. Verify the key's HMAC and extract the license identifier
    /// 2. Look up the record (`not_found`)
    /// 3. Check the active flag (`deactivated`)
    /// 4. Check expiry (`expired`; valid up to and including the
    ///    expiration instant)
    /// 5. Compare the current hardware fingerprint (`hardware_mismatch`)
    /// 6. Touch `lastValidation` and persist, return `active`
    ///
    /// Negative state outcomes come back as a structured result; a
    /// malformed or forged key is an error (and a forged signature is
    /// logged as a security event).
    pub fn validate(&self, license_key: &str) -> Result<ValidationResult, VaultError> {
        let claims =
            keymac::verify(&self.config.signing_secret, license_key).map_err(|e| {
                if matches!(e, VaultError::SignatureInvalid) {
                    tracing::warn!("license key signature verification failed");
                }
                e
            })?;

        let Some(license) = self.store.load(&claims.license_id)? else {
            return Ok(ValidationResult::negative(LicenseStatus::NotFound, None));
        };

        if !license.is_active {
            return Ok(ValidationResult::negative(
                LicenseStatus::Deactivated,
                Some(license),
            ));
        }

        let now = self.clock.now_utc();
        if license.is_expired(now) {
            return Ok(ValidationResult::negative(
                LicenseStatus::Expired,
                Some(license),
            ));
        }

        if self.fingerprinter.fingerprint() != license.hardware_fingerprint {
            tracing::warn!(license_id = %license.id, "hardware fingerprint mismatch");
            return Ok(ValidationResult::negative(
                LicenseStatus::HardwareMismatch,
                Some(license),
            ));
        }

        // Last-seen audit trail: touched on every successful validation.
        let license = self.store.update(&license.id, |record| {
            record.last_validation = now;
            Ok(record.clone())
        })?;

        tracing::debug!(license_id = %license.id, "license validated");
        Ok(ValidationResult {
            valid: true,
            status: LicenseStatus::Active,
            license: Some(license),
        })
    }

    /// Consume one activation slot on a license.
    ///
    /// Holds the per-record lock across the read-modify-write, so
    /// concurrent activations can never exceed the ceiling. Activation
    /// is a bare counter increment: it deliberately does not re-run the
    /// expiry or hardware checks — those gate every model load through
    /// [`validate`](Self::validate).
    ///
    /// # Errors
    /// `LicenseNotFound` if the record is absent,
    /// `MaxActivationsReached` at the ceiling.
    pub fn activate(&self, license_id: &str) -> Result<License, VaultError> {
        let license = self.store.update(license_id, |record| {
            if record.current_activations >= record.max_activations {
                return Err(VaultError::MaxActivationsReached);
            }
            record.current_activations += 1;
            Ok(record.clone())
        })?;

        tracing::info!(
            license_id,
            activations = license.current_activations,
            max = license.max_activations,
            "license activated"
        );
        Ok(license)
    }

    /// Deactivate a license. Irreversible: no operation re-activates a
    /// deactivated license.
    ///
    /// # Errors
    /// `LicenseNotFound` if the record is absent.
    pub fn deactivate(&self, license_id: &str) -> Result<License, VaultError> {
        let license = self.store.update(license_id, |record| {
            record.is_active = false;
            Ok(record.clone())
        })?;

        tracing::info!(license_id, "license deactivated");
        Ok(license)
    }

    /// Read-only status projection for a license identifier.
    ///
    /// Runs the same checks as [`validate`](Self::validate) minus the
    /// signature step (it is keyed by identifier, not license key) and
    /// without touching `lastValidation`.
    pub fn status(&self, license_id: &str) -> Result<ValidationResult, VaultError> {
        let Some(license) = self.store.load(license_id)? else {
            return Ok(ValidationResult::negative(LicenseStatus::NotFound, None));
        };

        if !license.is_active {
            return Ok(ValidationResult::negative(
                LicenseStatus::Deactivated,
                Some(license),
            ));
        }

        if license.is_expired(self.clock.now_utc()) {
            return Ok(ValidationResult::negative(
                LicenseStatus::Expired,
                Some(license),
            ));
        }

        if self.fingerprinter.fingerprint() != license.hardware_fingerprint {
            return Ok(ValidationResult::negative(
                LicenseStatus::HardwareMismatch,
                Some(license),
            ));
        }

        Ok(ValidationResult {
            valid: true,
            status: LicenseStatus::Active,
            license: Some(license),
        })
    }

    /// Load a license record by identifier.
    pub fn get(&self, license_id: &str) -> Result<Option<License>, VaultError> {
        self.store.load(license_id)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }
}
