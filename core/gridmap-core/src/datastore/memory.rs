//! In-memory dialect using BTreeMap tables
//!
//! Rows live in per-table BTreeMaps keyed by the encoded entity key. Each
//! insert checks for an existing row under the same write lock, so this
//! dialect enforces unique inserts natively.

use crate::datastore::codec::{self, Row, StoredAssociationRow};
use crate::dialect::{DuplicateInsertPreventionStrategy, GridDialect, NextValueRequest, TupleScan};
use crate::error::{GridError, GridResult};
use crate::model::{
    Association, AssociationKey, EntityKey, EntityKeyMetadata, SnapshotType, Tuple,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type Table = BTreeMap<Vec<u8>, Row>;
type AssociationTable = BTreeMap<Vec<u8>, Vec<StoredAssociationRow>>;

/// Dialect storing everything in process memory
pub struct InMemoryDialect {
    entities: RwLock<HashMap<String, Table>>,
    associations: RwLock<HashMap<String, AssociationTable>>,
    // sequence name → next value to hand out
    sequences: DashMap<String, i64>,
}

impl InMemoryDialect {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            associations: RwLock::new(HashMap::new()),
            sequences: DashMap::new(),
        }
    }

    /// Number of rows stored for an entity table.
    pub fn count(&self, table: &str) -> usize {
        self.entities.read().get(table).map(|t| t.len()).unwrap_or(0)
    }

    /// Entity tables that hold at least one row.
    pub fn table_names(&self) -> Vec<String> {
        self.entities
            .read()
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for InMemoryDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl TupleScan for InMemoryDialect {
    fn tuples(&self, metadata: &EntityKeyMetadata) -> GridResult<Vec<Tuple>> {
        let entities = self.entities.read();
        Ok(entities
            .get(metadata.table())
            .map(|rows| {
                rows.values()
                    .map(|row| Tuple::from_snapshot(row.clone(), SnapshotType::Update))
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl GridDialect for InMemoryDialect {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_tuple(&self, key: &EntityKey) -> GridResult<Option<Tuple>> {
        let encoded = codec::encode_key(key.column_values())?;
        let entities = self.entities.read();
        Ok(entities
            .get(key.table())
            .and_then(|rows| rows.get(&encoded))
            .map(|row| Tuple::from_snapshot(row.clone(), SnapshotType::Update)))
    }

    fn insert_or_update_tuple(&self, key: &EntityKey, tuple: &Tuple) -> GridResult<()> {
        let encoded = codec::encode_key(key.column_values())?;
        let mut entities = self.entities.write();
        let rows = entities.entry(key.table().to_string()).or_default();

        if tuple.snapshot_type() == SnapshotType::Insert && rows.contains_key(&encoded) {
            return Err(codec::duplicate_key(key.table(), key));
        }
        let row = codec::merged_row(rows.remove(&encoded), tuple);
        rows.insert(encoded, row);
        tracing::trace!(target: "gridmap", table = key.table(), key = %key, "tuple written");
        Ok(())
    }

    fn remove_tuple(&self, key: &EntityKey) -> GridResult<()> {
        let encoded = codec::encode_key(key.column_values())?;
        let mut entities = self.entities.write();
        if let Some(rows) = entities.get_mut(key.table()) {
            rows.remove(&encoded);
        }
        Ok(())
    }

    fn get_association(&self, key: &AssociationKey) -> GridResult<Option<Association>> {
        let encoded = codec::encode_key(key.column_values())?;
        let stored = {
            let associations = self.associations.read();
            associations
                .get(key.table())
                .and_then(|t| t.get(&encoded))
                .cloned()
        };
        stored
            .map(|rows| codec::association_from_rows(key.metadata(), rows))
            .transpose()
    }

    fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
    ) -> GridResult<()> {
        let encoded = codec::encode_key(key.column_values())?;
        let mut associations = self.associations.write();
        let table = associations.entry(key.table().to_string()).or_default();
        if association.is_empty() {
            table.remove(&encoded);
        } else {
            table.insert(encoded, codec::association_to_rows(association));
        }
        Ok(())
    }

    fn remove_association(&self, key: &AssociationKey) -> GridResult<()> {
        let encoded = codec::encode_key(key.column_values())?;
        let mut associations = self.associations.write();
        if let Some(table) = associations.get_mut(key.table()) {
            table.remove(&encoded);
        }
        Ok(())
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn next_value(&self, request: &NextValueRequest) -> GridResult<i64> {
        let mut next = self
            .sequences
            .entry(request.sequence.clone())
            .or_insert(request.initial_value);
        let value = *next;
        *next = value.checked_add(request.increment).ok_or_else(|| {
            GridError::Backend(format!("sequence '{}' overflowed", request.sequence))
        })?;
        Ok(value)
    }

    fn get_duplicate_insert_prevention_strategy(
        &self,
        _metadata: &EntityKeyMetadata,
    ) -> DuplicateInsertPreventionStrategy {
        DuplicateInsertPreventionStrategy::Native
    }

    fn tuple_scan(&self) -> Option<&dyn TupleScan> {
        Some(self)
    }
}
