//! Core traits for the profile service
//!
//! - [`ProfileStore`]: Persistence contract keyed by username

pub mod profile_store;

pub use profile_store::{InsertResult, ProfileStore, StoreAtomicity};
