//! Persisted record types and status codes.
//!
//! Field names serialize in camelCase to match the on-disk document
//! formats consumed by the surrounding platform:
//!
//! - License: `id, userId, modelName, licenseKey, encryptionKey,
//!   expirationDate, activationDate, maxActivations, currentActivations,
//!   hardwareFingerprint, features, isActive, lastValidation`
//! - Encrypted model: `modelName, encryptedData, metadata, licenseId,
//!   encryptionAlgorithm, createdAt`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The right for one user to use one named model on one bound machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// Globally unique license identifier.
    pub id: String,

    /// Owning user identifier.
    pub user_id: String,

    /// Name of the licensed model.
    pub model_name: String,

    /// Signed license key (opaque to callers).
    pub license_key: String,

    /// Hex-encoded symmetric encryption key. Generated once at issuance
    /// and never rotated for the life of the license.
    pub encryption_key: String,

    /// Instant after which the license is expired.
    pub expiration_date: DateTime<Utc>,

    /// Issuance instant.
    pub activation_date: DateTime<Utc>,

    /// Maximum permitted activations (>= 1).
    pub max_activations: u32,

    /// Current activation count (0 ..= max_activations).
    pub current_activations: u32,

    /// Hardware fingerprint bound at issuance; never migrated.
    pub hardware_fingerprint: String,

    /// Enabled feature flags.
    pub features: Vec<String>,

    /// Active flag. `false` is terminal: nothing re-activates a
    /// deactivated license.
    pub is_active: bool,

    /// Instant of the last successful validation.
    pub last_validation: DateTime<Utc>,
}

impl License {
    /// Whether the license is expired at `now`.
    ///
    /// The interval is closed on the lower bound: a license whose
    /// expiration equals `now` is still valid, and expired one
    /// millisecond later.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_date
    }

    /// Activations still available under the ceiling.
    pub fn remaining_activations(&self) -> u32 {
        self.max_activations.saturating_sub(self.current_activations)
    }

    /// Whether the license carries the given feature flag.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Hardware and resource requirements advertised with a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Minimum RAM, e.g. "8GB".
    pub ram: String,

    /// Minimum storage, e.g. "2GB".
    pub storage: String,

    /// GPU requirement, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
}

/// Metadata stored alongside an encrypted model payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    /// Plaintext size in bytes.
    pub original_size: u64,

    /// Hex SHA-256 checksum of the plaintext, verified again after every
    /// successful decryption.
    pub checksum: String,

    /// Model version string.
    pub version: String,

    /// Capability list, e.g. "text-generation".
    pub capabilities: Vec<String>,

    /// Resource requirements for running the model.
    pub requirements: ResourceRequirements,
}

/// The ciphertext artifact for one named model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedModel {
    /// Model name, unique within the store.
    pub model_name: String,

    /// Base64 of `nonce ‖ tag ‖ ciphertext`. Never stored without its
    /// authentication tag.
    pub encrypted_data: String,

    /// Plaintext metadata for the payload.
    pub metadata: ModelMetadata,

    /// Identifier of the license this model was encrypted under. Only
    /// that license can decrypt it.
    pub license_id: String,

    /// AEAD algorithm identifier.
    pub encryption_algorithm: String,

    /// Encryption instant.
    pub created_at: DateTime<Utc>,
}

/// Closed set of license status reason codes reported to callers.
///
/// These are the only reason codes that cross the API boundary; raw
/// internal errors never leak through status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// No license record exists for the identifier.
    NotFound,
    /// The license was deactivated; terminal.
    Deactivated,
    /// The license is past its expiration date.
    Expired,
    /// The current machine does not match the bound fingerprint.
    HardwareMismatch,
    /// All checks passed.
    Active,
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            LicenseStatus::NotFound => "not_found",
            LicenseStatus::Deactivated => "deactivated",
            LicenseStatus::Expired => "expired",
            LicenseStatus::HardwareMismatch => "hardware_mismatch",
            LicenseStatus::Active => "active",
        };
        f.write_str(code)
    }
}
