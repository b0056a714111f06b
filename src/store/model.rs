//! Encrypted model store keyed by model name.
//!
//! Model names are caller-chosen and may not be path-safe, so filenames
//! are derived from a SHA-256 hash of the name rather than the name
//! itself. The full name lives inside the record.

use crate::errors::VaultError;
use crate::records::EncryptedModel;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

/// File-backed store for encrypted model records.
pub struct FileModelStore {
    /// Directory holding one JSON document per model.
    dir: PathBuf,
}

impl FileModelStore {
    /// Open (creating if needed) a store rooted at the given directory.
    pub fn new(dir: PathBuf) -> Result<Self, VaultError> {
        fs::create_dir_all(&dir)
            .map_err(|e| VaultError::StoreIo(format!("Failed to create store dir: {}", e)))?;
        Ok(Self { dir })
    }

    /// Derive the record path for a model name.
    fn record_path(&self, model_name: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(model_name.as_bytes()));
        self.dir.join(format!("{}.json", &hash[..16]))
    }

    /// Persist an encrypted model record atomically.
    pub fn save(&self, model: &EncryptedModel) -> Result<(), VaultError> {
        let json = serde_json::to_string_pretty(model)
            .map_err(|e| VaultError::StoreIo(format!("Failed to serialize model: {}", e)))?;

        let target = self.record_path(&model.model_name);
        let temp = target.with_extension("tmp");

        fs::write(&temp, &json)
            .map_err(|e| VaultError::StoreIo(format!("Failed to write temp file: {}", e)))?;
        fs::rename(&temp, &target)
            .map_err(|e| VaultError::StoreIo(format!("Failed to rename record: {}", e)))?;

        Ok(())
    }

    /// Load an encrypted model record by name.
    pub fn load(&self, model_name: &str) -> Result<Option<EncryptedModel>, VaultError> {
        let path = self.record_path(model_name);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| VaultError::StoreIo(format!("Failed to read record: {}", e)))?;
        let model = serde_json::from_str(&json)
            .map_err(|e| VaultError::StoreIo(format!("Failed to parse record: {}", e)))?;
        Ok(Some(model))
    }

    /// List all encrypted model records in the store.
    pub fn list(&self) -> Result<Vec<EncryptedModel>, VaultError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| VaultError::StoreIo(format!("Failed to read store dir: {}", e)))?;

        let mut models = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| VaultError::StoreIo(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path)
                    .map_err(|e| VaultError::StoreIo(format!("Failed to read record: {}", e)))?;
                let model = serde_json::from_str(&json)
                    .map_err(|e| VaultError::StoreIo(format!("Failed to parse record: {}", e)))?;
                models.push(model);
            }
        }
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ModelMetadata, ResourceRequirements};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_model(name: &str) -> EncryptedModel {
        EncryptedModel {
            model_name: name.to_string(),
            encrypted_data: "AAAA".to_string(),
            metadata: ModelMetadata {
                original_size: 10,
                checksum: "ab".repeat(32),
                version: "1.0.0".to_string(),
                capabilities: vec!["inference".to_string()],
                requirements: ResourceRequirements {
                    ram: "8GB".to_string(),
                    storage: "2GB".to_string(),
                    gpu: None,
                },
            },
            license_id: "lic-1".to_string(),
            encryption_algorithm: "aes-256-gcm".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf()).unwrap();

        store.save(&sample_model("academic-base-v1")).unwrap();
        let loaded = store.load("academic-base-v1").unwrap().unwrap();
        assert_eq!(loaded.model_name, "academic-base-v1");
        assert_eq!(loaded.metadata.original_size, 10);
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.load("ghost").unwrap().is_none());
    }

    #[test]
    fn path_unsafe_names_are_stored() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf()).unwrap();

        let name = "models/академия: v2?";
        store.save(&sample_model(name)).unwrap();
        assert_eq!(store.load(name).unwrap().unwrap().model_name, name);
    }

    #[test]
    fn save_overwrites_existing_record() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf()).unwrap();

        store.save(&sample_model("m")).unwrap();
        let mut updated = sample_model("m");
        updated.metadata.version = "1.0.1".to_string();
        store.save(&updated).unwrap();

        assert_eq!(store.load("m").unwrap().unwrap().metadata.version, "1.0.1");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn list_returns_all_records() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf()).unwrap();

        store.save(&sample_model("model-a")).unwrap();
        store.save(&sample_model("model-b")).unwrap();

        let mut names: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|m| m.model_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["model-a", "model-b"]);
    }
}
