//! # Modelvault
//!
//! **License-bound authenticated encryption for distributable ML model
//! artifacts.**
//!
//! Modelvault binds a model artifact to a specific purchaser and
//! machine: it issues HMAC-signed license keys, encrypts the model
//! payload under a per-license AES-256-GCM key, and gates every load on
//! full license validation (signature, expiry, activation binding,
//! hardware match).
//!
//! ## Features
//!
//! - **Tamper-evident license keys** — `base64(payload).hex(HMAC-SHA-256)`,
//!   verified in constant time
//! - **Per-license AEAD** — each license carries its own AES-256-GCM key;
//!   payloads are stored as `nonce ‖ tag ‖ ciphertext`
//! - **Checksum double-check** — plaintext SHA-256 re-verified after every
//!   successful decryption, catching storage bugs AEAD cannot see
//! - **Activation ceilings** — per-record locking keeps concurrent
//!   activations at or under the purchased maximum
//! - **Fail-closed security** — malformed keys, forged signatures, and
//!   tag mismatches deny access; no partial plaintext ever escapes
//!
//! ## Quickstart
//!
//! ```no_run
//! use modelvault::{IssueOptions, ModelDescriptor, ModelVault, ResourceRequirements, VaultConfig};
//!
//! fn main() -> Result<(), modelvault::VaultError> {
//!     let vault = ModelVault::new(VaultConfig::from_env()?)?;
//!
//!     let license = vault.issue_license("user-7", "academic-base-v1", IssueOptions::default())?;
//!
//!     let descriptor = ModelDescriptor {
//!         version: "1.0.0".to_string(),
//!         capabilities: vec!["inference".to_string()],
//!         requirements: ResourceRequirements {
//!             ram: "8GB".to_string(),
//!             storage: "2GB".to_string(),
//!             gpu: None,
//!         },
//!     };
//!     vault.protect_model("academic-base-v1", b"model weights", &license.id, descriptor)?;
//!
//!     let weights = vault.load_model("academic-base-v1", &license.license_key)?;
//!     assert_eq!(weights, b"model weights");
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Modelvault protects against:
//! - **License key forgery** — keys are MAC'd with a process-wide secret;
//!   any payload or signature tampering is rejected
//! - **Payload tampering** — AES-256-GCM authentication plus a plaintext
//!   checksum double-check
//! - **Casual license sharing** — licenses are bound to a hardware
//!   fingerprint at issuance
//!
//! The hardware fingerprint is a deterrent, not a security boundary, and
//! client-side licensing can always be bypassed by a determined attacker
//! with access to the binary and the signing secret's host.
//!
//! ## Configuration
//!
//! - `MODELVAULT_SECRET` — process-wide HMAC signing secret (required,
//!   at least 32 bytes; there is no fallback). Rotating it invalidates
//!   every outstanding license key.
//! - `MODELVAULT_DATA_DIR` — store root override (defaults to the
//!   platform data directory)
//!
//! See [`VaultConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Host binding
pub mod fingerprint;

// Crypto layer
pub mod crypto;

// Record types
pub mod records;

// Persistence layer
pub mod store;

// License state machine
pub mod manager;

// Model payload encryption
pub mod engine;

// Vault (main public API)
pub mod vault;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::VaultConfig;
pub use engine::{EncryptionEngine, ModelDescriptor};
pub use errors::VaultError;
pub use manager::{IssueOptions, LicenseManager, ValidationResult};
pub use records::{EncryptedModel, License, LicenseStatus, ModelMetadata, ResourceRequirements};
pub use vault::ModelVault;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "test-seams"))]
pub use fingerprint::FixedFingerprint;
