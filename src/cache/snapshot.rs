//! Disk persistence for last-known-good fallback snapshots
//!
//! Stores the most recent successfully fetched collection per resource type
//! as a JSON file in an XDG-compliant cache directory. Snapshots carry no
//! expiry: they are overwritten only by the next successful fetch and exist
//! so the application can serve data after a restart while the upstream API
//! is unavailable.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Wrapper struct for snapshot data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<T> {
    /// The last successfully fetched collection
    data: T,
    /// When the collection was fetched
    saved_at: DateTime<Utc>,
}

/// Reads and writes fallback snapshots on disk
///
/// Uses `~/.cache/pricebook/` on Linux, or the equivalent XDG path on other
/// platforms. Each resource type gets one file, overwritten wholesale on
/// every successful fetch.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Directory where snapshot files are stored
    dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store in the XDG-compliant cache directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g. no home
    /// directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pricebook")?;
        Some(Self {
            dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a store over a custom directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Writes a snapshot for the given key, replacing any previous one
    pub fn save<T: Serialize>(&self, key: &str, data: &[T]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let snapshot = Snapshot {
            data,
            saved_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.path(key), json)
    }

    /// Reads the snapshot for the given key
    ///
    /// Returns `None` if no snapshot exists or it cannot be parsed. A
    /// corrupt file is treated the same as a missing one; the caller falls
    /// back to an empty collection.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let content = fs::read_to_string(self.path(key)).ok()?;
        let snapshot: Snapshot<Vec<T>> = serde_json::from_str(&content).ok()?;
        Some(snapshot.data)
    }

    /// Removes the snapshot for the given key, if present
    pub fn clear(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::data::Service;

    fn create_test_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SnapshotStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    fn sample_services() -> Vec<Service> {
        vec![Service {
            id: "svc-1".to_string(),
            name: "Haircut".to_string(),
            description: None,
            price: 1500.0,
            price_max: None,
            currency: "RUB".to_string(),
            duration: Some(45),
            category_id: Some("cat-1".to_string()),
        }]
    }

    #[test]
    fn test_save_creates_file_in_store_directory() {
        let (store, temp_dir) = create_test_store();

        store
            .save("services_fallback", &sample_services())
            .expect("Save should succeed");

        let expected_path = temp_dir.path().join("services_fallback.json");
        assert!(expected_path.exists(), "Snapshot file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"svc-1\""));
        assert!(content.contains("saved_at"));
    }

    #[test]
    fn test_load_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();

        let result: Option<Vec<Service>> = store.load("nonexistent");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (store, _temp_dir) = create_test_store();
        let services = sample_services();

        store
            .save("services_fallback", &services)
            .expect("Save should succeed");

        let loaded: Vec<Service> = store
            .load("services_fallback")
            .expect("Should load snapshot");

        assert_eq!(loaded, services);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let (store, _temp_dir) = create_test_store();
        let mut services = sample_services();

        store
            .save("services_fallback", &services)
            .expect("First save should succeed");

        services[0].price = 1800.0;
        store
            .save("services_fallback", &services)
            .expect("Second save should succeed");

        let loaded: Vec<Service> = store
            .load("services_fallback")
            .expect("Should load snapshot");

        assert!((loaded[0].price - 1800.0).abs() < 0.01);
    }

    #[test]
    fn test_load_corrupt_file_returns_none() {
        let (store, temp_dir) = create_test_store();

        fs::create_dir_all(temp_dir.path()).expect("Should create dir");
        fs::write(temp_dir.path().join("services_fallback.json"), "{ nope")
            .expect("Should write file");

        let result: Option<Vec<Service>> = store.load("services_fallback");

        assert!(result.is_none(), "Corrupt snapshot should load as None");
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let (store, temp_dir) = create_test_store();

        store
            .save("services_fallback", &sample_services())
            .expect("Save should succeed");
        store.clear("services_fallback").expect("Clear should succeed");

        assert!(!temp_dir.path().join("services_fallback.json").exists());
    }

    #[test]
    fn test_clear_is_idempotent_when_missing() {
        let (store, _temp_dir) = create_test_store();

        store
            .clear("never_saved")
            .expect("Clearing a missing snapshot should succeed");
    }

    #[test]
    fn test_save_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("snapshots");
        let store = SnapshotStore::with_dir(nested.clone());

        store
            .save("services_fallback", &sample_services())
            .expect("Save should succeed");

        assert!(nested.exists(), "Nested directory should be created");
    }

    #[test]
    fn test_new_uses_project_cache_path() {
        if let Some(store) = SnapshotStore::new() {
            let path_str = store.dir.to_string_lossy();
            assert!(
                path_str.contains("pricebook"),
                "Snapshot path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
