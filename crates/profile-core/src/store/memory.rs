// # Memory Profile Store
//
// In-memory implementation of ProfileStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and for deployments where profiles are disposable.
//
// ## Crash Behavior
//
// - All profiles are lost on restart/crash
// - No recovery possible (state is in-memory only)

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::profile::Profile;
use crate::traits::profile_store::{InsertResult, ProfileStore, StoreAtomicity};

/// In-memory profile store implementation
///
/// Profiles live in a HashMap protected by a RwLock. Clones share the same
/// map.
///
/// # Example
///
/// ```rust,no_run
/// use profile_core::{MemoryProfileStore, Profile, ProfileStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryProfileStore::new();
///
///     store.upsert(&Profile::new("foobar", "Foo", "Bar")).await?;
///
///     let profile = store.get("foobar").await?;
///     assert_eq!(profile, Some(Profile::new("foobar", "Foo", "Bar")));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryProfileStore {
    inner: Arc<RwLock<HashMap<String, Profile>>>,
}

impl MemoryProfileStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of profiles in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Remove all profiles from the store
    pub async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.clear();
        Ok(())
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, username: &str) -> Result<Option<Profile>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(username).cloned())
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(profile.username.clone(), profile.clone());
        Ok(())
    }

    fn atomicity(&self) -> StoreAtomicity {
        StoreAtomicity::AtomicInsert
    }

    async fn insert_if_absent(&self, profile: &Profile) -> Result<InsertResult, Error> {
        let mut guard = self.inner.write().await;
        if let Some(existing) = guard.get(&profile.username) {
            return Ok(InsertResult::AlreadyExists(existing.clone()));
        }
        guard.insert(profile.username.clone(), profile.clone());
        Ok(InsertResult::Inserted)
    }
}
