// # Profile Store Implementations
//
// This module provides implementations of the ProfileStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileProfileStore;
pub use memory::MemoryProfileStore;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::traits::ProfileStore;

/// Build the store described by `config`
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn ProfileStore>> {
    config.validate()?;

    match config {
        StoreConfig::Memory => {
            tracing::info!("Using in-memory profile store");
            Ok(Arc::new(MemoryProfileStore::new()))
        }
        StoreConfig::File { path } => {
            tracing::info!("Using file profile store at {}", path);
            Ok(Arc::new(FileProfileStore::new(path).await?))
        }
    }
}
