//! Cryptographic primitives: license key MAC, model AEAD, checksums.

pub mod digest;
pub mod keymac;
pub mod sealing;
