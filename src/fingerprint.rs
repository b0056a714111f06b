//! Hardware fingerprint generation for license binding.
//!
//! The fingerprint is a SHA-256 hash over the CPU model string, the OS
//! platform name and architecture, and a sorted serialization of the
//! network interface descriptors. It is deliberately cheap and
//! non-cryptographic: a deterrent against casual license sharing, not a
//! security boundary. A fingerprint match must never be treated as
//! proof of anything beyond "probably the same machine".

use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use sysinfo::{Networks, System};

/// Per-process cache of the computed fingerprint. Host introspection is
/// comparatively expensive and the inputs cannot change mid-process in
/// any way this binding is meant to detect.
static HOST_FINGERPRINT: OnceCell<String> = OnceCell::new();

/// Compute the stable fingerprint of the current machine.
///
/// Pure function of the host; no failure path. If OS introspection is
/// unavailable the affected component hashes as empty, which still
/// yields a deterministic value for this environment.
pub fn fingerprint() -> String {
    HOST_FINGERPRINT.get_or_init(compute_fingerprint).clone()
}

fn compute_fingerprint() -> String {
    let mut sys = System::new();
    sys.refresh_cpu_all();

    let cpu_model = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_default();

    // Sorted so enumeration order never changes the hash.
    let networks = Networks::new_with_refreshed_list();
    let mut interfaces: Vec<String> = networks
        .iter()
        .map(|(name, data)| format!("{}={}", name, data.mac_address()))
        .collect();
    interfaces.sort();

    let mut hasher = Sha256::new();
    hasher.update(cpu_model.as_bytes());
    hasher.update(std::env::consts::OS.as_bytes());
    hasher.update(std::env::consts::ARCH.as_bytes());
    hasher.update(interfaces.join(",").as_bytes());
    hex::encode(hasher.finalize())
}

/// Seam for fingerprint injection, mirroring the [`crate::clock::Clock`]
/// seam. Production code uses [`HostFingerprint`]; tests exercise the
/// hardware-mismatch path with [`FixedFingerprint`].
pub trait Fingerprinter: Send + Sync {
    /// Produce the fingerprint of the machine this process runs on.
    fn fingerprint(&self) -> String;
}

/// Production fingerprinter reading real host identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFingerprint;

impl Fingerprinter for HostFingerprint {
    fn fingerprint(&self) -> String {
        fingerprint()
    }
}

/// Fingerprinter returning a fixed value, for tests.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct FixedFingerprint(
    /// The fingerprint value to return.
    pub String,
);

#[cfg(any(test, feature = "test-seams"))]
impl Fingerprinter for FixedFingerprint {
    fn fingerprint(&self) -> String {
        self.0.clone()
    }
}
