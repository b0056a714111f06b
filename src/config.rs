//! Modelvault configuration.

use crate::errors::VaultError;
use std::path::PathBuf;

/// Environment variable holding the process-wide signing secret.
pub const SECRET_ENV_VAR: &str = "MODELVAULT_SECRET";

/// Environment variable overriding the store root directory.
pub const DATA_DIR_ENV_VAR: &str = "MODELVAULT_DATA_DIR";

/// Minimum accepted signing secret length in bytes.
///
/// Rejecting short secrets also rejects the class of hardcoded
/// development defaults that must never reach production.
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration for a modelvault instance.
///
/// There is no ambient global state: the signing secret is carried
/// explicitly and validated at construction time. Rotating the secret
/// invalidates every previously issued license key, so rotation must be
/// treated as a breaking, versioned operation.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Process-wide secret for HMAC signing and verification of license
    /// keys. Must be at least [`MIN_SECRET_LEN`] bytes.
    pub signing_secret: String,

    /// Namespace for the on-disk stores. Each deployment should use a
    /// unique namespace to avoid collisions.
    pub namespace: String,

    /// Store root directory. `None` resolves to
    /// `dirs::data_dir()/<namespace>`.
    pub data_dir: Option<PathBuf>,
}

impl VaultConfig {
    /// Build a config with the default namespace and store location.
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            namespace: "modelvault".to_string(),
            data_dir: None,
        }
    }

    /// Source the configuration from the environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if [`SECRET_ENV_VAR`] is unset. There is no
    /// fallback secret: a missing value is a fatal startup error.
    pub fn from_env() -> Result<Self, VaultError> {
        let signing_secret = std::env::var(SECRET_ENV_VAR).map_err(|_| {
            VaultError::ConfigError(format!("{} must be set", SECRET_ENV_VAR))
        })?;

        let data_dir = std::env::var_os(DATA_DIR_ENV_VAR).map(PathBuf::from);

        let config = Self {
            signing_secret,
            namespace: "modelvault".to_string(),
            data_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.signing_secret.is_empty() {
            return Err(VaultError::ConfigError(
                "signing_secret cannot be empty".to_string(),
            ));
        }
        if self.signing_secret.len() < MIN_SECRET_LEN {
            return Err(VaultError::ConfigError(format!(
                "signing_secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                self.signing_secret.len()
            )));
        }
        if self.namespace.is_empty() {
            return Err(VaultError::ConfigError(
                "namespace cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the store root directory.
    pub(crate) fn store_root(&self) -> Result<PathBuf, VaultError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|base| base.join(&self.namespace))
                .ok_or_else(|| {
                    VaultError::StoreIo("Could not find data directory".to_string())
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_secret() -> String {
        "0123456789abcdef0123456789abcdef".to_string()
    }

    #[test]
    fn accepts_valid_config() {
        let config = VaultConfig::new(valid_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_secret() {
        let config = VaultConfig::new("");
        assert!(matches!(
            config.validate(),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_short_secret() {
        // Typical hardcoded development default: far below the minimum.
        let config = VaultConfig::new("default-secret");
        assert!(matches!(
            config.validate(),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_empty_namespace() {
        let mut config = VaultConfig::new(valid_secret());
        config.namespace = String::new();
        assert!(matches!(
            config.validate(),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let mut config = VaultConfig::new(valid_secret());
        config.data_dir = Some(PathBuf::from("/tmp/vault-test"));
        assert_eq!(
            config.store_root().unwrap(),
            PathBuf::from("/tmp/vault-test")
        );
    }
}
