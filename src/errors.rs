//! Modelvault error types.

use crate::records::LicenseStatus;
use thiserror::Error;

/// Errors that can occur during license management and model encryption.
///
/// Expected negative validation outcomes (expired, deactivated, hardware
/// mismatch, not found) are NOT errors — they are reported through
/// [`crate::records::LicenseStatus`] reason codes. This enum covers
/// configuration faults, security events, and infrastructure failures.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Configuration is invalid (missing/weak secret, wrong key length).
    /// Fatal: never retried.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// License key string is malformed (missing separator, bad encoding,
    /// wrong payload shape).
    #[error("Malformed license key")]
    MalformedLicenseKey,

    /// License key HMAC verification failed. Logged as a security event,
    /// distinct from format errors.
    #[error("License key signature verification failed")]
    SignatureInvalid,

    /// No license record exists for the given identifier.
    #[error("License not found: {0}")]
    LicenseNotFound(String),

    /// No encrypted model record exists for the given name.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Activation ceiling reached; no further activations permitted.
    #[error("Maximum activations reached")]
    MaxActivationsReached,

    /// An operation that requires a usable license was attempted with one
    /// whose validation did not come back `active`. Carries the
    /// machine-readable reason code.
    #[error("License rejected: {0}")]
    LicenseRejected(LicenseStatus),

    /// AEAD tag verification failed during decryption. Fail closed:
    /// no partial plaintext is ever returned.
    #[error("Model decryption failed authentication")]
    AuthenticationFailed,

    /// Decrypted plaintext does not match the stored metadata checksum.
    /// Catches storage/reconciliation bugs, not forgery (AEAD covers that).
    #[error("Model integrity check failed after decryption")]
    IntegrityCheckFailed,

    /// Store I/O failure. Retryable: must never be confused with a
    /// validation failure.
    #[error("Store I/O error: {0}")]
    StoreIo(String),
}
