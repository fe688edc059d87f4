//! Entity persister — the engine-side write path over a [`GridDialect`].
//!
//! Applies the duplicate-insert prevention strategy the dialect declares:
//! with [`LookUp`](DuplicateInsertPreventionStrategy::LookUp) the persister
//! reads the key before inserting; with
//! [`Native`](DuplicateInsertPreventionStrategy::Native) it hands an `Insert`
//! tuple to the dialect and lets the backend reject duplicates.
//!
//! The look-up-then-write sequence is not atomic. Callers that need strict
//! uniqueness on a `LookUp` dialect must serialize inserts of the same key.

use crate::api::Entity;
use crate::dialect::{DuplicateInsertPreventionStrategy, GridDialect, LockMode};
use crate::error::{GridError, GridResult};
use crate::model::{EntityKey, EntityKeyMetadata, Tuple, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct EntityPersister<'a> {
    dialect: &'a dyn GridDialect,
    metadata: Arc<EntityKeyMetadata>,
}

impl<'a> EntityPersister<'a> {
    pub fn new(dialect: &'a dyn GridDialect, metadata: Arc<EntityKeyMetadata>) -> Self {
        Self { dialect, metadata }
    }

    /// Persister for a mapped type.
    pub fn of<E: Entity>(dialect: &'a dyn GridDialect) -> Self {
        Self::new(dialect, E::entity_key_metadata())
    }

    pub fn metadata(&self) -> &Arc<EntityKeyMetadata> {
        &self.metadata
    }

    /// Key of this persister's type from identifier values.
    pub fn key<I>(&self, values: I) -> GridResult<EntityKey>
    where
        I: IntoIterator<Item = Value>,
    {
        EntityKey::new(self.metadata.clone(), values)
    }

    pub fn duplicate_insert_prevention_strategy(&self) -> DuplicateInsertPreventionStrategy {
        self.dialect
            .get_duplicate_insert_prevention_strategy(&self.metadata)
    }

    pub fn load(&self, key: &EntityKey) -> GridResult<Option<Tuple>> {
        self.dialect.get_tuple(key)
    }

    /// Insert a new row with the given columns. Fails with
    /// [`GridError::DuplicateKey`] if the key is already stored.
    pub fn insert(&self, key: &EntityKey, columns: &Tuple) -> GridResult<()> {
        let strategy = self.duplicate_insert_prevention_strategy();
        if strategy == DuplicateInsertPreventionStrategy::LookUp
            && self.dialect.get_tuple(key)?.is_some()
        {
            return Err(GridError::DuplicateKey {
                table: key.table().to_string(),
                key: key.to_string(),
            });
        }

        let mut tuple = self.dialect.create_tuple(key)?;
        for (column, value) in columns.to_map() {
            // identifier columns come from the key
            if !self.metadata.is_key_column(&column) {
                tuple.put(column, value);
            }
        }
        debug!(target: "gridmap", dialect = self.dialect.name(), key = %key, ?strategy, "insert");
        self.dialect.insert_or_update_tuple(key, &tuple)
    }

    /// Write back a tuple previously obtained from [`load`](Self::load).
    pub fn update(&self, key: &EntityKey, tuple: &Tuple) -> GridResult<()> {
        self.dialect.insert_or_update_tuple(key, tuple)
    }

    pub fn delete(&self, key: &EntityKey) -> GridResult<()> {
        self.dialect.remove_tuple(key)
    }

    /// Lock one instance through the dialect's strategy for `mode`.
    pub fn lock(
        &self,
        key: &EntityKey,
        mode: LockMode,
        version: Option<&Value>,
        timeout: Option<Duration>,
    ) -> GridResult<()> {
        self.dialect
            .get_locking_strategy(&self.metadata, mode)
            .lock(key, version, timeout)
    }

    // ===== Typed helpers =====

    pub fn insert_entity<E: Entity>(&self, entity: &E) -> GridResult<()> {
        let key = entity.entity_key()?;
        self.insert(&key, &entity.to_tuple())
    }

    pub fn find<E: Entity>(&self, key: &EntityKey) -> GridResult<Option<E>> {
        self.load(key)?.as_ref().map(E::from_tuple).transpose()
    }

    /// Overwrite the stored columns of an existing entity.
    pub fn update_entity<E: Entity>(&self, entity: &E) -> GridResult<()> {
        let key = entity.entity_key()?;
        let mut tuple = self.load(&key)?.unwrap_or_default();
        for (column, value) in entity.to_tuple().to_map() {
            tuple.put(column, value);
        }
        self.update(&key, &tuple)
    }
}
