//! sled-backed dialect — durable rows with native unique inserts.
//!
//! Each entity table maps to a sled `Tree` named `entity/<table>`, each
//! association table to `association/<table>`. Sequences live in the
//! `sequences` tree. Rows are `bincode`-encoded column maps.
//!
//! Writes that must not race (unique inserts, row merges, sequence bumps) go
//! through `compare_and_swap`, retrying when another writer got in between.

use crate::config::{DialectConfig, properties};
use crate::datastore::codec::{self, Row, StoredAssociationRow};
use crate::dialect::{
    CharacterAsStringType, DuplicateInsertPreventionStrategy, GridDialect, GridType, LogicalType,
    NextValueRequest, TupleScan, UuidAsStringType,
};
use crate::error::{GridError, GridResult};
use crate::model::{
    Association, AssociationKey, EntityKey, EntityKeyMetadata, SnapshotType, Tuple,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const ENTITY_PREFIX: &str = "entity/";
const ASSOCIATION_PREFIX: &str = "association/";
const SEQUENCES_TREE: &str = "sequences";

/// Dialect persisting to an embedded sled database.
pub struct SledDialect {
    db: sled::Db,
}

impl SledDialect {
    /// Open (or create) the database at the given directory path.
    #[instrument(skip(path))]
    pub fn open(path: &Path) -> GridResult<Self> {
        info!(target: "gridmap", "Opening sled dialect at {:?}", path);
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open a temporary database (for testing). Data is deleted on drop.
    pub fn open_temporary() -> GridResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Open from [`properties::SLED_PATH`], or a temporary database when
    /// [`properties::SLED_TEMPORARY`] is `true`.
    pub fn from_config(config: &DialectConfig) -> GridResult<Self> {
        let mut sled_config = sled::Config::new();
        if let Some(capacity) = config.get_u64(properties::SLED_CACHE_CAPACITY)? {
            sled_config = sled_config.cache_capacity(capacity);
        }

        if config.get_bool(properties::SLED_TEMPORARY)?.unwrap_or(false) {
            sled_config = sled_config.temporary(true);
        } else {
            let path = config.require(properties::SLED_PATH)?;
            info!(target: "gridmap", path, "Opening sled dialect");
            sled_config = sled_config.path(path);
        }
        Ok(Self {
            db: sled_config.open()?,
        })
    }

    /// Persist buffered writes.
    pub fn flush(&self) -> GridResult<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Number of rows stored for an entity table.
    pub fn count(&self, table: &str) -> GridResult<usize> {
        Ok(self.entity_tree(table)?.len())
    }

    fn entity_tree(&self, table: &str) -> GridResult<sled::Tree> {
        Ok(self.db.open_tree(format!("{ENTITY_PREFIX}{table}"))?)
    }

    fn association_tree(&self, table: &str) -> GridResult<sled::Tree> {
        Ok(self.db.open_tree(format!("{ASSOCIATION_PREFIX}{table}"))?)
    }
}

impl TupleScan for SledDialect {
    fn tuples(&self, metadata: &EntityKeyMetadata) -> GridResult<Vec<Tuple>> {
        let tree = self.entity_tree(metadata.table())?;
        let mut result = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item?;
            let row: Row = codec::decode(&bytes)?;
            result.push(Tuple::from_snapshot(row, SnapshotType::Update));
        }
        Ok(result)
    }
}

impl GridDialect for SledDialect {
    fn name(&self) -> &str {
        "sled"
    }

    fn get_tuple(&self, key: &EntityKey) -> GridResult<Option<Tuple>> {
        let tree = self.entity_tree(key.table())?;
        let encoded = codec::encode_key(key.column_values())?;
        match tree.get(&encoded)? {
            Some(bytes) => {
                let row: Row = codec::decode(&bytes)?;
                Ok(Some(Tuple::from_snapshot(row, SnapshotType::Update)))
            }
            None => Ok(None),
        }
    }

    fn insert_or_update_tuple(&self, key: &EntityKey, tuple: &Tuple) -> GridResult<()> {
        let tree = self.entity_tree(key.table())?;
        let encoded = codec::encode_key(key.column_values())?;

        if tuple.snapshot_type() == SnapshotType::Insert {
            let bytes = codec::encode(&tuple.to_map())?;
            return match tree.compare_and_swap(&encoded, None::<&[u8]>, Some(bytes))? {
                Ok(()) => Ok(()),
                Err(_) => Err(codec::duplicate_key(key.table(), key)),
            };
        }

        loop {
            let current = tree.get(&encoded)?;
            let existing: Option<Row> = current.as_deref().map(codec::decode).transpose()?;
            let bytes = codec::encode(&codec::merged_row(existing, tuple))?;
            match tree.compare_and_swap(&encoded, current, Some(bytes))? {
                Ok(()) => return Ok(()),
                Err(_) => debug!(target: "gridmap", key = %key, "concurrent write, retrying merge"),
            }
        }
    }

    fn remove_tuple(&self, key: &EntityKey) -> GridResult<()> {
        let tree = self.entity_tree(key.table())?;
        tree.remove(codec::encode_key(key.column_values())?)?;
        Ok(())
    }

    fn get_association(&self, key: &AssociationKey) -> GridResult<Option<Association>> {
        let tree = self.association_tree(key.table())?;
        let encoded = codec::encode_key(key.column_values())?;
        match tree.get(&encoded)? {
            Some(bytes) => {
                let rows: Vec<StoredAssociationRow> = codec::decode(&bytes)?;
                Ok(Some(codec::association_from_rows(key.metadata(), rows)?))
            }
            None => Ok(None),
        }
    }

    fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
    ) -> GridResult<()> {
        let tree = self.association_tree(key.table())?;
        let encoded = codec::encode_key(key.column_values())?;
        if association.is_empty() {
            tree.remove(encoded)?;
        } else {
            tree.insert(encoded, codec::encode(&codec::association_to_rows(association))?)?;
        }
        Ok(())
    }

    fn remove_association(&self, key: &AssociationKey) -> GridResult<()> {
        let tree = self.association_tree(key.table())?;
        tree.remove(codec::encode_key(key.column_values())?)?;
        Ok(())
    }

    fn override_type(&self, logical_type: &LogicalType) -> Option<Arc<dyn GridType>> {
        match logical_type {
            LogicalType::Uuid => Some(Arc::new(UuidAsStringType)),
            LogicalType::Character => Some(Arc::new(CharacterAsStringType)),
            _ => None,
        }
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn next_value(&self, request: &NextValueRequest) -> GridResult<i64> {
        let tree = self.db.open_tree(SEQUENCES_TREE)?;
        let name = request.sequence.as_bytes();
        loop {
            let current = tree.get(name)?;
            let value = match current.as_deref() {
                Some(bytes) => codec::decode::<i64>(bytes)?,
                None => request.initial_value,
            };
            let next = value.checked_add(request.increment).ok_or_else(|| {
                GridError::Backend(format!("sequence '{}' overflowed", request.sequence))
            })?;
            if tree
                .compare_and_swap(name, current, Some(codec::encode(&next)?))?
                .is_ok()
            {
                return Ok(value);
            }
        }
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
