//! License record store with per-identifier write locking.
//!
//! `save`/`load`/`list` are the minimal CRUD surface. Mutations that
//! read-modify-write a record (`activate`, `deactivate`, the
//! `lastValidation` touch) must go through [`FileLicenseStore::update`],
//! which serializes them per license identifier: without that lock two
//! concurrent activations can both read count `k` and both persist
//! `k + 1`, losing one increment past the ceiling.

use crate::errors::VaultError;
use crate::records::License;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// File-backed license store.
pub struct FileLicenseStore {
    /// Directory holding one `<id>.json` per license.
    dir: PathBuf,

    /// Per-license-identifier write locks.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileLicenseStore {
    /// Open (creating if needed) a store rooted at the given directory.
    pub fn new(dir: PathBuf) -> Result<Self, VaultError> {
        fs::create_dir_all(&dir)
            .map_err(|e| VaultError::StoreIo(format!("Failed to create store dir: {}", e)))?;
        Ok(Self {
            dir,
            locks: Mutex::new(HashMap::new()),
        })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        // A poisoned map only means some holder panicked; the map itself
        // stays consistent, so recover the guard.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(id.to_string()).or_default().clone()
    }

    /// Persist a license record atomically.
    pub fn save(&self, license: &License) -> Result<(), VaultError> {
        let json = serde_json::to_string_pretty(license)
            .map_err(|e| VaultError::StoreIo(format!("Failed to serialize license: {}", e)))?;

        let target = self.record_path(&license.id);
        let temp = self.dir.join(format!("{}.tmp", license.id));

        fs::write(&temp, &json)
            .map_err(|e| VaultError::StoreIo(format!("Failed to write temp file: {}", e)))?;
        fs::rename(&temp, &target)
            .map_err(|e| VaultError::StoreIo(format!("Failed to rename record: {}", e)))?;

        Ok(())
    }

    /// Load a license record by identifier.
    pub fn load(&self, id: &str) -> Result<Option<License>, VaultError> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| VaultError::StoreIo(format!("Failed to read record: {}", e)))?;
        let license = serde_json::from_str(&json)
            .map_err(|e| VaultError::StoreIo(format!("Failed to parse record: {}", e)))?;
        Ok(Some(license))
    }

    /// List all license records in the store.
    pub fn list(&self) -> Result<Vec<License>, VaultError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| VaultError::StoreIo(format!("Failed to read store dir: {}", e)))?;

        let mut licenses = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| VaultError::StoreIo(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path)
                    .map_err(|e| VaultError::StoreIo(format!("Failed to read record: {}", e)))?;
                let license = serde_json::from_str(&json)
                    .map_err(|e| VaultError::StoreIo(format!("Failed to parse record: {}", e)))?;
                licenses.push(license);
            }
        }
        Ok(licenses)
    }

    /// Atomically mutate a license record.
    ///
    /// Holds the per-identifier lock across the whole load → mutate →
    /// save sequence, so concurrent updates to the same license cannot
    /// lose writes.
    ///
    /// # Errors
    /// `LicenseNotFound` if no record exists for `id`; any error the
    /// mutation closure returns is propagated without persisting.
    pub fn update<T, F>(&self, id: &str, mutate: F) -> Result<T, VaultError>
    where
        F: FnOnce(&mut License) -> Result<T, VaultError>,
    {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut license = self
            .load(id)?
            .ok_or_else(|| VaultError::LicenseNotFound(id.to_string()))?;

        let value = mutate(&mut license)?;
        self.save(&license)?;
        Ok(value)
    }
}
