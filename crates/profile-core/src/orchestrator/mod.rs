//! Profile orchestrator
//!
//! The ProfileOrchestrator is responsible for:
//! - Interpreting store lookups as existence checks
//! - Rejecting duplicate creations
//! - Replacing names on update, with identity taken from the addressed username
//! - Tagging every result with exactly one [`ProfileOutcome`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ProfileCommand   ┌─────────────────────┐
//! │  Boundary    │───────────────────▶│ ProfileOrchestrator │
//! │  (profiled)  │◀───────────────────│                     │
//! └──────────────┘   ProfileOutcome   └─────────────────────┘
//!                                                │
//!                                          get / upsert
//!                                                ▼
//!                                       ┌─────────────────┐
//!                                       │  ProfileStore   │
//!                                       └─────────────────┘
//! ```
//!
//! ## Operation Flow
//!
//! `Start → Lookup → Decide → [Upsert] → Outcome`
//!
//! No state persists across calls. Storage faults end the operation with
//! [`ProfileOutcome::StorageFailure`]; the orchestrator never retries.
//!
//! ## Creation Races
//!
//! Against a [`StoreAtomicity::BestEffort`] store, creation is a lookup
//! followed by an upsert: two concurrent creates for one username can both
//! see it absent and both write (last write wins). Against a
//! [`StoreAtomicity::AtomicInsert`] store, creation uses
//! [`ProfileStore::insert_if_absent`] and exactly one of them wins.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::profile::{Profile, PutProfileRequest};
use crate::traits::{InsertResult, ProfileStore, StoreAtomicity};

/// A decoded request for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileCommand {
    /// Read a profile
    Fetch { username: String },

    /// Create a profile that must not exist yet
    Create(Profile),

    /// Replace the names of an existing profile
    Update {
        username: String,
        request: PutProfileRequest,
    },
}

/// Terminal state of an orchestrator operation
#[must_use]
#[derive(Debug)]
pub enum ProfileOutcome {
    /// The profile exists
    Found(Profile),

    /// No profile under this username
    NotFound(String),

    /// A profile with this username already exists; nothing was written
    Conflict(String),

    /// The profile was created
    Created(Profile),

    /// The profile's names were replaced
    Updated(Profile),

    /// The store failed during lookup or upsert
    StorageFailure(Error),
}

/// Variant label of a [`ProfileOutcome`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Found,
    NotFound,
    Conflict,
    Created,
    Updated,
    StorageFailure,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeKind::Found => "found",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::Conflict => "conflict",
            OutcomeKind::Created => "created",
            OutcomeKind::Updated => "updated",
            OutcomeKind::StorageFailure => "storage_failure",
        };
        f.write_str(name)
    }
}

impl ProfileOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProfileOutcome::Found(_) => OutcomeKind::Found,
            ProfileOutcome::NotFound(_) => OutcomeKind::NotFound,
            ProfileOutcome::Conflict(_) => OutcomeKind::Conflict,
            ProfileOutcome::Created(_) => OutcomeKind::Created,
            ProfileOutcome::Updated(_) => OutcomeKind::Updated,
            ProfileOutcome::StorageFailure(_) => OutcomeKind::StorageFailure,
        }
    }

    /// The profile carried by `Found`, `Created` or `Updated`
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            ProfileOutcome::Found(p) | ProfileOutcome::Created(p) | ProfileOutcome::Updated(p) => {
                Some(p)
            }
            _ => None,
        }
    }
}

/// Stateless decision logic over a [`ProfileStore`]
///
/// Cloning is cheap; clones share the same store.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use profile_core::{MemoryProfileStore, Profile, ProfileOrchestrator, ProfileOutcome};
///
/// #[tokio::main]
/// async fn main() {
///     let orchestrator = ProfileOrchestrator::new(Arc::new(MemoryProfileStore::new()));
///
///     match orchestrator.create_profile(Profile::new("foobar", "Foo", "Bar")).await {
///         ProfileOutcome::Created(profile) => println!("created {}", profile.username),
///         other => println!("unexpected: {}", other.kind()),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct ProfileOrchestrator {
    store: Arc<dyn ProfileStore>,
}

impl ProfileOrchestrator {
    /// Create an orchestrator over `store`
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Dispatch a decoded command to the matching operation
    pub async fn handle(&self, command: ProfileCommand) -> ProfileOutcome {
        match command {
            ProfileCommand::Fetch { username } => self.fetch_profile(&username).await,
            ProfileCommand::Create(profile) => self.create_profile(profile).await,
            ProfileCommand::Update { username, request } => {
                self.update_profile(&username, request).await
            }
        }
    }

    /// Look up a profile. Never mutates the store.
    pub async fn fetch_profile(&self, username: &str) -> ProfileOutcome {
        match self.store.get(username).await {
            Ok(Some(profile)) => {
                debug!("Found profile {}", username);
                ProfileOutcome::Found(profile)
            }
            Ok(None) => {
                debug!("Profile {} not found", username);
                ProfileOutcome::NotFound(username.to_string())
            }
            Err(e) => storage_failure("fetch", username, e),
        }
    }

    /// Create a profile, or report a conflict if the username is taken
    pub async fn create_profile(&self, profile: Profile) -> ProfileOutcome {
        match self.store.atomicity() {
            StoreAtomicity::AtomicInsert => self.create_atomic(profile).await,
            StoreAtomicity::BestEffort => self.create_checked(profile).await,
        }
    }

    async fn create_atomic(&self, profile: Profile) -> ProfileOutcome {
        match self.store.insert_if_absent(&profile).await {
            Ok(InsertResult::Inserted) => {
                info!("Created profile {}", profile.username);
                ProfileOutcome::Created(profile)
            }
            Ok(InsertResult::AlreadyExists(_)) => conflict(profile.username),
            Err(e) => storage_failure("create", &profile.username, e),
        }
    }

    async fn create_checked(&self, profile: Profile) -> ProfileOutcome {
        match self.store.get(&profile.username).await {
            Ok(Some(_)) => return conflict(profile.username),
            Ok(None) => {}
            Err(e) => return storage_failure("create", &profile.username, e),
        }

        match self.store.upsert(&profile).await {
            Ok(()) => {
                info!("Created profile {}", profile.username);
                ProfileOutcome::Created(profile)
            }
            Err(e) => storage_failure("create", &profile.username, e),
        }
    }

    /// Replace both names of an existing profile
    ///
    /// The stored username is `username`, whatever the request carried.
    pub async fn update_profile(
        &self,
        username: &str,
        request: PutProfileRequest,
    ) -> ProfileOutcome {
        match self.store.get(username).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("Cannot update {}: profile not found", username);
                return ProfileOutcome::NotFound(username.to_string());
            }
            Err(e) => return storage_failure("update", username, e),
        }

        let profile = Profile::from_put_request(username, request);
        match self.store.upsert(&profile).await {
            Ok(()) => {
                info!("Updated profile {}", username);
                ProfileOutcome::Updated(profile)
            }
            Err(e) => storage_failure("update", username, e),
        }
    }
}

fn conflict(username: String) -> ProfileOutcome {
    warn!("Profile {} already exists, rejecting create", username);
    ProfileOutcome::Conflict(username)
}

fn storage_failure(operation: &str, username: &str, error: Error) -> ProfileOutcome {
    error!("Storage failure during {} of {}: {}", operation, username, error);
    ProfileOutcome::StorageFailure(error)
}
