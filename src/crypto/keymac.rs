//! License key construction and verification.
//!
//! A license key is a tamper-evident token binding a license identifier
//! to its purchaser and model:
//!
//! ```text
//! base64("{licenseId}:{userId}:{modelName}:{issuedAtMillis}") "." hex(HMAC-SHA-256(payload))
//! ```
//!
//! The MAC uses the process-wide signing secret from
//! [`crate::config::VaultConfig`]. Rotating that secret invalidates
//! every key ever issued under it.

use crate::errors::VaultError;
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the payload and signature segments.
const SEGMENT_SEPARATOR: char = '.';

/// Claims embedded in a verified license key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseKeyClaims {
    /// License identifier, used for record lookup.
    pub license_id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Name of the licensed model.
    pub model_name: String,
    /// Issuance instant, milliseconds since the Unix epoch.
    pub issued_at_millis: i64,
}

/// Build the canonical payload string for signing.
fn canonical_payload(
    license_id: &str,
    user_id: &str,
    model_name: &str,
    issued_at_millis: i64,
) -> String {
    format!("{}:{}:{}:{}", license_id, user_id, model_name, issued_at_millis)
}

fn mac_for(secret: &str, payload: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    mac
}

/// Sign a license key for the given identity.
pub fn sign(
    secret: &str,
    license_id: &str,
    user_id: &str,
    model_name: &str,
    issued_at_millis: i64,
) -> String {
    let payload = canonical_payload(license_id, user_id, model_name, issued_at_millis);
    let tag = mac_for(secret, payload.as_bytes()).finalize().into_bytes();
    format!(
        "{}{}{}",
        STANDARD.encode(payload.as_bytes()),
        SEGMENT_SEPARATOR,
        hex::encode(tag)
    )
}

/// Verify a license key and extract its claims.
///
/// The MAC comparison is constant-time (`Mac::verify_slice`).
///
/// # Errors
/// * `MalformedLicenseKey` — missing separator, invalid base64/hex, or a
///   payload that does not have the four expected segments.
/// * `SignatureInvalid` — MAC mismatch; the payload was tampered with or
///   signed under a different secret.
pub fn verify(secret: &str, license_key: &str) -> Result<LicenseKeyClaims, VaultError> {
    let (payload_b64, tag_hex) = license_key
        .split_once(SEGMENT_SEPARATOR)
        .ok_or(VaultError::MalformedLicenseKey)?;

    let payload = STANDARD
        .decode(payload_b64)
        .map_err(|_| VaultError::MalformedLicenseKey)?;
    let tag = hex::decode(tag_hex).map_err(|_| VaultError::MalformedLicenseKey)?;

    mac_for(secret, &payload)
        .verify_slice(&tag)
        .map_err(|_| VaultError::SignatureInvalid)?;

    parse_claims(&payload)
}

/// Parse a verified payload into claims.
fn parse_claims(payload: &[u8]) -> Result<LicenseKeyClaims, VaultError> {
    let payload = std::str::from_utf8(payload).map_err(|_| VaultError::MalformedLicenseKey)?;

    let mut parts = payload.splitn(4, ':');
    let license_id = parts.next().ok_or(VaultError::MalformedLicenseKey)?;
    let user_id = parts.next().ok_or(VaultError::MalformedLicenseKey)?;
    let model_name = parts.next().ok_or(VaultError::MalformedLicenseKey)?;
    let issued_at_millis = parts
        .next()
        .ok_or(VaultError::MalformedLicenseKey)?
        .parse::<i64>()
        .map_err(|_| VaultError::MalformedLicenseKey)?;

    Ok(LicenseKeyClaims {
        license_id: license_id.to_string(),
        user_id: user_id.to_string(),
        model_name: model_name.to_string(),
        issued_at_millis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-0123456789abcdef";

    fn sample_key() -> String {
        sign(SECRET, "lic-1", "user-7", "academic-base-v1", 1748736000000)
    }

    #[test]
    fn sign_verify_roundtrip() {
        let claims = verify(SECRET, &sample_key()).unwrap();
        assert_eq!(claims.license_id, "lic-1");
        assert_eq!(claims.user_id, "user-7");
        assert_eq!(claims.model_name, "academic-base-v1");
        assert_eq!(claims.issued_at_millis, 1748736000000);
    }

    #[test]
    fn wire_format_is_base64_dot_hex() {
        let key = sample_key();
        let (payload_b64, tag_hex) = key.split_once('.').unwrap();
        let payload = STANDARD.decode(payload_b64).unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            "lic-1:user-7:academic-base-v1:1748736000000"
        );
        assert_eq!(tag_hex.len(), 64);
        assert!(tag_hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let result = verify(SECRET, "no-separator-here");
        assert!(matches!(result, Err(VaultError::MalformedLicenseKey)));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let result = verify(SECRET, "!!!not-base64!!!.00ff");
        assert!(matches!(result, Err(VaultError::MalformedLicenseKey)));
    }

    #[test]
    fn invalid_hex_tag_is_malformed() {
        let key = sample_key();
        let (payload_b64, _) = key.split_once('.').unwrap();
        let result = verify(SECRET, &format!("{}.zzzz", payload_b64));
        assert!(matches!(result, Err(VaultError::MalformedLicenseKey)));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let key = sample_key();
        let (_, tag_hex) = key.split_once('.').unwrap();
        let forged_payload =
            STANDARD.encode("lic-1:user-8:academic-base-v1:1748736000000".as_bytes());
        let result = verify(SECRET, &format!("{}.{}", forged_payload, tag_hex));
        assert!(matches!(result, Err(VaultError::SignatureInvalid)));
    }

    #[test]
    fn tampered_signature_fails() {
        let key = sample_key();
        // Flip the last hex digit of the tag.
        let mut chars: Vec<char> = key.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        let result = verify(SECRET, &tampered);
        assert!(matches!(result, Err(VaultError::SignatureInvalid)));
    }

    #[test]
    fn wrong_secret_fails_signature() {
        let result = verify("another-secret-with-enough-bytes!", &sample_key());
        assert!(matches!(result, Err(VaultError::SignatureInvalid)));
    }

    #[test]
    fn wrong_payload_arity_is_malformed() {
        let payload = STANDARD.encode("only:three:segments".as_bytes());
        let tag = hex::encode(
            mac_for(SECRET, "only:three:segments".as_bytes())
                .finalize()
                .into_bytes(),
        );
        let result = verify(SECRET, &format!("{}.{}", payload, tag));
        assert!(matches!(result, Err(VaultError::MalformedLicenseKey)));
    }
}
