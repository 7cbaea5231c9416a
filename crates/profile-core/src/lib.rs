// # profile-core
//
// Core library for the profile directory service.
//
// ## Architecture Overview
//
// - **Profile**: The sole entity (username, first name, last name)
// - **ProfileStore**: Trait for lookup and upsert of profiles by username
// - **ProfileOrchestrator**: Create/fetch/update decisions over a store
// - **ProfileOutcome**: Closed set of terminal results returned to callers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions live in the orchestrator, persistence in stores
// 2. **Outcomes, not exceptions**: NotFound and Conflict are values, not errors
// 3. **Library-First**: The HTTP daemon is a thin layer over this crate
// 4. **Explicit atomicity**: Stores declare whether creation is race-free

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod profile;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{ServerConfig, ServiceConfig, StoreConfig};
pub use error::{Error, Result};
pub use orchestrator::{OutcomeKind, ProfileCommand, ProfileOrchestrator, ProfileOutcome};
pub use profile::{Profile, PutProfileRequest, validate_username};
pub use store::{FileProfileStore, MemoryProfileStore, open_store};
pub use traits::{InsertResult, ProfileStore, StoreAtomicity};
