//! Datastores — concrete [`GridDialect`] implementations.
//!
//! - [`InMemoryDialect`]: process-local tables, for tests and embedding
//! - [`SledDialect`]: durable storage on an embedded sled database
//!
//! [`DialectFactory`] picks one from a [`DialectConfig`].

pub mod codec;
pub mod memory;
pub mod sled_dialect;

pub use memory::InMemoryDialect;
pub use sled_dialect::SledDialect;

use crate::config::{DialectConfig, properties};
use crate::dialect::GridDialect;
use crate::error::{GridError, GridResult};
use std::str::FromStr;

/// Datastores bundled with gridmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatastoreProvider {
    #[default]
    Memory,
    Sled,
}

impl DatastoreProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatastoreProvider::Memory => "memory",
            DatastoreProvider::Sled => "sled",
        }
    }
}

impl FromStr for DatastoreProvider {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(DatastoreProvider::Memory),
            "sled" => Ok(DatastoreProvider::Sled),
            other => Err(GridError::Config(format!(
                "unknown datastore provider '{other}' (expected 'memory' or 'sled')"
            ))),
        }
    }
}

/// Factory for creating dialect instances
pub struct DialectFactory;

impl DialectFactory {
    /// Create the dialect named by [`properties::DATASTORE_PROVIDER`]
    /// (in-memory when unset).
    pub fn create(config: &DialectConfig) -> GridResult<Box<dyn GridDialect>> {
        let provider = match config.get(properties::DATASTORE_PROVIDER) {
            Some(name) => name.parse()?,
            None => DatastoreProvider::default(),
        };
        tracing::info!(target: "gridmap", provider = provider.as_str(), "creating dialect");

        match provider {
            DatastoreProvider::Memory => Ok(Box::new(InMemoryDialect::new())),
            DatastoreProvider::Sled => Ok(Box::new(SledDialect::from_config(config)?)),
        }
    }
}
