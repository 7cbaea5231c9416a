//! Test doubles and common utilities for orchestrator contract tests
//!
//! `MockProfileStore` implements only the two required store operations so
//! the orchestrator's best-effort creation path is exercised.
//! `FailingProfileStore` covers faults on both creation paths.

#![allow(dead_code)]

use async_trait::async_trait;
use profile_core::error::{Error, Result};
use profile_core::{InsertResult, Profile, ProfileStore, StoreAtomicity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// A best-effort store that counts calls
pub struct MockProfileStore {
    get_call_count: Arc<AtomicUsize>,
    upsert_call_count: Arc<AtomicUsize>,
    profiles: Arc<Mutex<HashMap<String, Profile>>>,
    /// When set, every `get` waits here before answering
    lookup_barrier: Option<Arc<Barrier>>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self {
            get_call_count: Arc::new(AtomicUsize::new(0)),
            upsert_call_count: Arc::new(AtomicUsize::new(0)),
            profiles: Arc::new(Mutex::new(HashMap::new())),
            lookup_barrier: None,
        }
    }

    /// Create a store that already holds `profiles`
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.profiles.lock().unwrap();
            for profile in profiles {
                guard.insert(profile.username.clone(), profile);
            }
        }
        store
    }

    /// Make `parties` lookups rendezvous before any of them returns
    pub fn with_lookup_barrier(mut self, parties: usize) -> Self {
        self.lookup_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    /// Get the number of times get() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times upsert() was called
    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of a stored profile, bypassing the counters
    pub fn stored(&self, username: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(username).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    /// Create a new MockProfileStore that shares counters and data with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            get_call_count: Arc::clone(&other.get_call_count),
            upsert_call_count: Arc::clone(&other.upsert_call_count),
            profiles: Arc::clone(&other.profiles),
            lookup_barrier: other.lookup_barrier.clone(),
        }
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn get(&self, username: &str) -> Result<Option<Profile>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        let found = self.profiles.lock().unwrap().get(username).cloned();
        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }
        Ok(found)
    }

    async fn upsert(&self, profile: &Profile) -> Result<()> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.username.clone(), profile.clone());
        Ok(())
    }
}

/// Which store operation should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Get,
    Upsert,
    /// The store declares `AtomicInsert` and its `insert_if_absent` fails
    Insert,
}

/// A store whose lookups or writes always fail
pub struct FailingProfileStore {
    fail_on: FailOn,
    get_call_count: AtomicUsize,
    upsert_call_count: AtomicUsize,
    insert_call_count: AtomicUsize,
    existing: Option<Profile>,
}

impl FailingProfileStore {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            fail_on,
            get_call_count: AtomicUsize::new(0),
            upsert_call_count: AtomicUsize::new(0),
            insert_call_count: AtomicUsize::new(0),
            existing: None,
        }
    }

    /// Lookups (when they succeed) return `profile`
    pub fn with_existing(mut self, profile: Profile) -> Self {
        self.existing = Some(profile);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    pub fn insert_call_count(&self) -> usize {
        self.insert_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for FailingProfileStore {
    async fn get(&self, _username: &str) -> Result<Option<Profile>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::Get {
            return Err(Error::storage("connection reset"));
        }
        Ok(self.existing.clone())
    }

    async fn upsert(&self, _profile: &Profile) -> Result<()> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::Upsert {
            return Err(Error::storage("disk full"));
        }
        Ok(())
    }

    fn atomicity(&self) -> StoreAtomicity {
        if self.fail_on == FailOn::Insert {
            StoreAtomicity::AtomicInsert
        } else {
            StoreAtomicity::BestEffort
        }
    }

    async fn insert_if_absent(&self, _profile: &Profile) -> Result<InsertResult> {
        self.insert_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::Insert {
            return Err(Error::storage("unique index unavailable"));
        }
        Err(Error::storage("insert_if_absent on a best-effort store"))
    }
}

pub fn foobar() -> Profile {
    Profile::new("foobar", "Foo", "Bar")
}
