// # File Profile Store
//
// File-based implementation of ProfileStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "written_at": "2025-01-09T12:00:00Z",
//   "profiles": {
//     "foobar": {
//       "username": "foobar",
//       "firstName": "Foo",
//       "lastName": "Bar"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use crate::Error;
use crate::profile::Profile;
use crate::traits::profile_store::{InsertResult, ProfileStore, StoreAtomicity};

/// Profile file format version
const PROFILE_FILE_VERSION: &str = "1.0";

/// File-based profile store with crash recovery
///
/// Profiles are held in memory and written through to a JSON file on every
/// change.
///
/// # Example
///
/// ```rust,no_run
/// use profile_core::{FileProfileStore, Profile, ProfileStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileProfileStore::new("/var/lib/profiled/profiles.json").await?;
///
///     // Atomically written to disk
///     store.upsert(&Profile::new("foobar", "Foo", "Bar")).await?;
///
///     let profile = store.get("foobar").await?;
///     assert!(profile.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileProfileStore {
    path: PathBuf,
    /// Last state successfully written to disk
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
    /// Held across snapshot, write and commit; all mutations go through it
    write_lock: Mutex<()>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ProfileFileFormat {
    version: String,
    #[serde(default)]
    written_at: Option<chrono::DateTime<chrono::Utc>>,
    profiles: HashMap<String, Profile>,
}

impl FileProfileStore {
    /// Create or load a file profile store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing file
    /// 3. If corruption is detected, try to load from backup
    /// 4. If both fail, start with an empty store
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create profile directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let profiles = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            profiles: Arc::new(RwLock::new(profiles)),
            write_lock: Mutex::new(()),
        })
    }

    /// Load profiles from file with automatic recovery
    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, Profile>, Error> {
        let err = match Self::load(path).await {
            Ok(profiles) => {
                tracing::debug!("Loaded {} profile(s) from {}", profiles.len(), path.display());
                return Ok(profiles);
            }
            Err(e) => e,
        };

        // Only a parse failure counts as corruption; anything else is a real fault
        if !matches!(err, Error::Json(_)) {
            return Err(err);
        }

        tracing::warn!(
            "Profile file {} appears corrupted: {}. Attempting recovery from backup.",
            path.display(),
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty store.");
            return Ok(HashMap::new());
        }

        match Self::load(&backup_path).await {
            Ok(profiles) => {
                tracing::info!("Recovered {} profile(s) from backup", profiles.len());
                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!(
                        "Failed to restore profile file from backup: {}",
                        restore_err
                    );
                }
                Ok(profiles)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {}. Starting with empty store.",
                    backup_err
                );
                Ok(HashMap::new())
            }
        }
    }

    /// Load profiles from file
    ///
    /// A missing file is an empty store. Parse failures surface as
    /// [`Error::Json`].
    async fn load(path: &Path) -> Result<HashMap<String, Profile>, Error> {
        if !path.exists() {
            tracing::debug!("Profile file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to read profile file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: ProfileFileFormat = serde_json::from_str(&content)?;

        if file.version != PROFILE_FILE_VERSION {
            tracing::warn!(
                "Profile file version mismatch: expected {}, got {}. Attempting to load anyway.",
                PROFILE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.profiles)
    }

    /// Write `profiles` to file atomically
    ///
    /// Callers must hold `write_lock`.
    async fn write_file(&self, profiles: &HashMap<String, Profile>) -> Result<(), Error> {
        let file = ProfileFileFormat {
            version: PROFILE_FILE_VERSION.to_string(),
            written_at: Some(chrono::Utc::now()),
            profiles: profiles.clone(),
        };

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::storage(format!("Failed to serialize profiles: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut handle = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            handle.write_all(json.as_bytes()).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            handle.flush().await.map_err(|e| {
                Error::storage(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Profiles written to file: {}", self.path.display());
        Ok(())
    }

    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored profile file from backup");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the profiles, persist the copy, and only
    /// then make it visible. On a failed write the visible state is untouched.
    async fn write_through(
        &self,
        change: impl FnOnce(&mut HashMap<String, Profile>),
    ) -> Result<(), Error> {
        let _write_guard = self.write_lock.lock().await;

        let mut next = self.profiles.read().await.clone();
        change(&mut next);

        self.write_file(&next).await?;
        *self.profiles.write().await = next;

        Ok(())
    }

    /// Force immediate write to disk
    pub async fn sync(&self) -> Result<(), Error> {
        self.write_through(|_| ()).await
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn get(&self, username: &str) -> Result<Option<Profile>, Error> {
        let guard = self.profiles.read().await;
        Ok(guard.get(username).cloned())
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), Error> {
        // Immediate write for durability
        self.write_through(|profiles| {
            profiles.insert(profile.username.clone(), profile.clone());
        })
        .await
    }

    fn atomicity(&self) -> StoreAtomicity {
        StoreAtomicity::AtomicInsert
    }

    async fn insert_if_absent(&self, profile: &Profile) -> Result<InsertResult, Error> {
        let _write_guard = self.write_lock.lock().await;

        let mut next = {
            let committed = self.profiles.read().await;
            if let Some(existing) = committed.get(&profile.username) {
                return Ok(InsertResult::AlreadyExists(existing.clone()));
            }
            committed.clone()
        };
        next.insert(profile.username.clone(), profile.clone());

        self.write_file(&next).await?;
        *self.profiles.write().await = next;

        Ok(InsertResult::Inserted)
    }
}
