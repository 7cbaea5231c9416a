// # Profile Store Trait
//
// Defines the persistence contract the orchestrator depends on.
//
// ## Purpose
//
// A profile store maps a username to at most one `Profile`. It offers
// lookup and upsert only: existence and conflict policy belong to the
// `ProfileOrchestrator`, not to the store.
//
// ## Implementations
//
// - In-memory: `MemoryProfileStore`
// - File-based: `FileProfileStore` (JSON, crash recovery)
//
// ## Usage
//
// ```rust
// use profile_core::{Profile, ProfileStore};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* ProfileStore implementation */;
//
//     store.upsert(&Profile::new("foobar", "Foo", "Bar")).await?;
//     let profile = store.get("foobar").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::profile::Profile;

/// Creation guarantee a store offers
///
/// The orchestrator reads this to decide between a check-then-upsert
/// sequence and a single [`ProfileStore::insert_if_absent`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAtomicity {
    /// Lookup and upsert are independent; concurrent creates of the same
    /// username may both succeed (last write wins).
    BestEffort,
    /// `insert_if_absent` checks and inserts as one indivisible step.
    AtomicInsert,
}

/// Result of an insert-if-absent attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// The profile was stored
    Inserted,
    /// A profile already existed under that username and was left untouched
    AlreadyExists(Profile),
}

/// Trait for profile store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Errors
///
/// `Err` is reserved for genuine storage faults (I/O, connectivity,
/// corruption). A missing profile is `Ok(None)`, never an error.
///
/// ## Implementation Guidelines
///
/// - **Async I/O only**: never block the runtime
/// - **No business logic**: `upsert` must not refuse to overwrite
/// - **No retries required**: if a backend retries, it does so internally
/// - **Declare atomicity**: override [`atomicity`](Self::atomicity) only when
///   [`insert_if_absent`](Self::insert_if_absent) is truly indivisible
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile by username
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Profile))`: The stored profile
    /// - `Ok(None)`: No profile for that username
    /// - `Err(Error)`: Storage error
    async fn get(&self, username: &str) -> Result<Option<Profile>, crate::Error>;

    /// Insert or replace the profile stored under `profile.username`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully stored
    /// - `Err(Error)`: Storage error
    async fn upsert(&self, profile: &Profile) -> Result<(), crate::Error>;

    /// The creation guarantee this store offers
    fn atomicity(&self) -> StoreAtomicity {
        StoreAtomicity::BestEffort
    }

    /// Store `profile` only if no profile exists under its username
    ///
    /// The default implementation is a plain lookup followed by an upsert
    /// and carries no atomicity. Stores returning
    /// [`StoreAtomicity::AtomicInsert`] must override it.
    async fn insert_if_absent(&self, profile: &Profile) -> Result<InsertResult, crate::Error> {
        if let Some(existing) = self.get(&profile.username).await? {
            return Ok(InsertResult::AlreadyExists(existing));
        }
        self.upsert(profile).await?;
        Ok(InsertResult::Inserted)
    }

    /// Persist any pending changes
    ///
    /// Stores that write through on every upsert can keep the default.
    async fn flush(&self) -> Result<(), crate::Error> {
        Ok(())
    }
}
