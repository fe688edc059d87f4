//! Grid dialect contract — the capability set every datastore adapter implements.
//!
//! All datastores implement the [`GridDialect`] trait. The persistence engine
//! depends only on this trait, never on a concrete backend.
//!
//! # Defaults
//!
//! Most backends share the same answers to the engine's capability questions,
//! so the trait supplies them and adapters override only what differs:
//!
//! | Method | Default |
//! |--------|---------|
//! | [`get_locking_strategy`](GridDialect::get_locking_strategy) | strategy that fails with `UnsupportedCapability` |
//! | [`override_type`](GridDialect::override_type) | `None` |
//! | [`supports_sequences`](GridDialect::supports_sequences) | `false` |
//! | [`get_duplicate_insert_prevention_strategy`](GridDialect::get_duplicate_insert_prevention_strategy) | [`DuplicateInsertPreventionStrategy::LookUp`] |
//! | [`tuple_scan`](GridDialect::tuple_scan) | `None` |
//! | [`for_each_tuple`](GridDialect::for_each_tuple) | fan-out over [`TupleScan::tuples`] |
//!
//! # Contract
//!
//! - Implementations are `Send + Sync`; the engine may call them from many
//!   threads. Operations on distinct keys must not interfere.
//! - Operations on the same key need no ordering guarantee from the dialect.
//! - Backend failures are propagated, never swallowed or retried here.

pub mod grid_type;
pub mod locking;

pub use grid_type::{CharacterAsStringType, GridType, LogicalType, UuidAsStringType};
pub use locking::{ExceptionThrowingLockingStrategy, LockMode, LockingStrategy};

use crate::error::{GridError, GridResult};
use crate::model::{
    Association, AssociationKey, AssociationKeyMetadata, EntityKey, EntityKeyMetadata, Tuple,
};
use std::sync::Arc;

/// How the engine keeps an insert from overwriting an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicateInsertPreventionStrategy {
    /// The engine reads the key before inserting.
    #[default]
    LookUp,
    /// The backend rejects the insert atomically; no read is needed.
    Native,
}

/// Request for the next value of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextValueRequest {
    pub sequence: String,
    pub increment: i64,
    pub initial_value: i64,
}

impl NextValueRequest {
    pub fn new(sequence: impl Into<String>, increment: i64, initial_value: i64) -> Self {
        Self {
            sequence: sequence.into(),
            increment,
            initial_value,
        }
    }
}

/// Receives tuples during bulk enumeration.
///
/// The tuple is only borrowed for the duration of the call.
pub trait ModelConsumer {
    fn consume(&mut self, tuple: &Tuple);
}

impl<F> ModelConsumer for F
where
    F: FnMut(&Tuple),
{
    fn consume(&mut self, tuple: &Tuple) {
        self(tuple)
    }
}

/// Optional bulk-read capability: all tuples stored for one entity type.
///
/// Dialects that can scan a whole table expose it through
/// [`GridDialect::tuple_scan`].
pub trait TupleScan: Send + Sync {
    /// Every tuple currently stored for the type, in backend order.
    /// An empty vector means the table is empty.
    fn tuples(&self, metadata: &EntityKeyMetadata) -> GridResult<Vec<Tuple>>;
}

/// Capability contract between the persistence engine and one datastore.
pub trait GridDialect: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    // ===== Entity tuples =====

    /// Read the tuple stored under `key`, `None` if absent.
    fn get_tuple(&self, key: &EntityKey) -> GridResult<Option<Tuple>>;

    /// New tuple for a row that is about to be inserted, carrying the key columns.
    fn create_tuple(&self, key: &EntityKey) -> GridResult<Tuple> {
        let mut tuple = Tuple::for_insert();
        for (column, value) in key.column_names().iter().zip(key.column_values()) {
            tuple.put(column.clone(), value.clone());
        }
        Ok(tuple)
    }

    /// Write `tuple` under `key`.
    ///
    /// Dialects declaring [`DuplicateInsertPreventionStrategy::Native`] must
    /// fail with [`GridError::DuplicateKey`] when `tuple` is an
    /// [`Insert`](crate::model::SnapshotType::Insert) snapshot and the key exists.
    fn insert_or_update_tuple(&self, key: &EntityKey, tuple: &Tuple) -> GridResult<()>;

    fn remove_tuple(&self, key: &EntityKey) -> GridResult<()>;

    // ===== Associations =====

    fn get_association(&self, key: &AssociationKey) -> GridResult<Option<Association>>;

    fn create_association(&self, _key: &AssociationKey) -> GridResult<Association> {
        Ok(Association::new())
    }

    fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
    ) -> GridResult<()>;

    fn remove_association(&self, key: &AssociationKey) -> GridResult<()>;

    /// Whether rows of this association live inside the owning entity's tuple.
    fn is_stored_in_entity_structure(&self, _metadata: &AssociationKeyMetadata) -> bool {
        false
    }

    // ===== Capabilities with defaults =====

    /// Locking strategy for `lock_mode` on entities of type `lockable`.
    ///
    /// The default strategy fails on every lock request: a backend without
    /// row locks must not pretend a lock was taken.
    fn get_locking_strategy(
        &self,
        _lockable: &EntityKeyMetadata,
        lock_mode: LockMode,
    ) -> Box<dyn LockingStrategy> {
        Box::new(ExceptionThrowingLockingStrategy::new(self.name(), lock_mode))
    }

    /// Backend-specific serialization for a logical type; `None` keeps the
    /// engine's generic handling.
    fn override_type(&self, _logical_type: &LogicalType) -> Option<Arc<dyn GridType>> {
        None
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    /// Next value of a sequence. Only meaningful when
    /// [`supports_sequences`](Self::supports_sequences) returns `true`.
    fn next_value(&self, request: &NextValueRequest) -> GridResult<i64> {
        Err(GridError::unsupported(
            self.name(),
            format!("sequence '{}'", request.sequence),
        ))
    }

    fn get_duplicate_insert_prevention_strategy(
        &self,
        _metadata: &EntityKeyMetadata,
    ) -> DuplicateInsertPreventionStrategy {
        DuplicateInsertPreventionStrategy::LookUp
    }

    /// Bulk-read capability, if the backend has one.
    fn tuple_scan(&self) -> Option<&dyn TupleScan> {
        None
    }

    /// Hand every stored tuple of each given type to `consumer`, once each.
    ///
    /// No ordering is guaranteed. With no metadata the consumer is never
    /// called. A type with no stored tuples contributes no calls. Fails with
    /// [`GridError::UnsupportedCapability`] when types are requested from a
    /// dialect without a [`TupleScan`].
    fn for_each_tuple(
        &self,
        consumer: &mut dyn ModelConsumer,
        metadata: &[&EntityKeyMetadata],
    ) -> GridResult<()> {
        if metadata.is_empty() {
            return Ok(());
        }
        let scan = self
            .tuple_scan()
            .ok_or_else(|| GridError::unsupported(self.name(), "bulk tuple scan"))?;

        for entity in metadata {
            let tuples = scan.tuples(entity)?;
            tracing::debug!(target: "gridmap", dialect = self.name(), table = entity.table(), tuples = tuples.len(), "bulk scan");
            for tuple in &tuples {
                consumer.consume(tuple);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use std::collections::HashMap;

    /// Dialect overriding nothing but the required operations.
    struct BareDialect;

    impl GridDialect for BareDialect {
        fn get_tuple(&self, _key: &EntityKey) -> GridResult<Option<Tuple>> {
            Ok(None)
        }
        fn insert_or_update_tuple(&self, _key: &EntityKey, _tuple: &Tuple) -> GridResult<()> {
            Ok(())
        }
        fn remove_tuple(&self, _key: &EntityKey) -> GridResult<()> {
            Ok(())
        }
        fn get_association(&self, _key: &AssociationKey) -> GridResult<Option<Association>> {
            Ok(None)
        }
        fn insert_or_update_association(
            &self,
            _key: &AssociationKey,
            _association: &Association,
        ) -> GridResult<()> {
            Ok(())
        }
        fn remove_association(&self, _key: &AssociationKey) -> GridResult<()> {
            Ok(())
        }
    }

    /// Dialect whose only extra is a fixed table of tuples per type.
    struct ScanningDialect {
        tables: HashMap<String, Vec<Tuple>>,
    }

    impl TupleScan for ScanningDialect {
        fn tuples(&self, metadata: &EntityKeyMetadata) -> GridResult<Vec<Tuple>> {
            Ok(self.tables.get(metadata.table()).cloned().unwrap_or_default())
        }
    }

    impl GridDialect for ScanningDialect {
        fn get_tuple(&self, _key: &EntityKey) -> GridResult<Option<Tuple>> {
            Ok(None)
        }
        fn insert_or_update_tuple(&self, _key: &EntityKey, _tuple: &Tuple) -> GridResult<()> {
            Ok(())
        }
        fn remove_tuple(&self, _key: &EntityKey) -> GridResult<()> {
            Ok(())
        }
        fn get_association(&self, _key: &AssociationKey) -> GridResult<Option<Association>> {
            Ok(None)
        }
        fn insert_or_update_association(
            &self,
            _key: &AssociationKey,
            _association: &Association,
        ) -> GridResult<()> {
            Ok(())
        }
        fn remove_association(&self, _key: &AssociationKey) -> GridResult<()> {
            Ok(())
        }
        fn tuple_scan(&self) -> Option<&dyn TupleScan> {
            Some(self)
        }
    }

    fn row(id: i64, name: &str) -> Tuple {
        [("id", Value::Int(id)), ("name", Value::from(name))]
            .into_iter()
            .collect()
    }

    fn scanning() -> ScanningDialect {
        let mut tables = HashMap::new();
        tables.insert("m".to_string(), vec![row(1, "x"), row(2, "y")]);
        tables.insert("t2".to_string(), vec![row(3, "z")]);
        tables.insert("t3".to_string(), vec![row(4, "never")]);
        tables.insert("empty".to_string(), Vec::new());
        ScanningDialect { tables }
    }

    #[test]
    fn defaults_are_conservative() {
        let dialect = BareDialect;
        let meta = EntityKeyMetadata::new("users", ["id"]);

        assert!(!dialect.supports_sequences());
        for logical_type in [
            LogicalType::Boolean,
            LogicalType::Integer,
            LogicalType::Long,
            LogicalType::Double,
            LogicalType::String,
            LogicalType::Character,
            LogicalType::Binary,
            LogicalType::Uuid,
            LogicalType::Timestamp,
            LogicalType::Custom("money".to_string()),
        ] {
            assert!(
                dialect.override_type(&logical_type).is_none(),
                "{logical_type:?}"
            );
        }
        assert_eq!(
            dialect.get_duplicate_insert_prevention_strategy(&meta),
            DuplicateInsertPreventionStrategy::LookUp
        );
        assert!(dialect.tuple_scan().is_none());
        assert!(!dialect.is_stored_in_entity_structure(&AssociationKeyMetadata::new(
            "user_roles",
            ["user_id"],
            ["user_id", "role"]
        )));
    }

    #[test]
    fn default_locking_fails_for_every_mode() {
        let dialect = BareDialect;
        let meta = Arc::new(EntityKeyMetadata::new("users", ["id"]));
        let key = EntityKey::new(meta.clone(), [Value::Int(1)]).unwrap();

        for mode in LockMode::ALL {
            let err = dialect
                .get_locking_strategy(&meta, mode)
                .lock(&key, None, None)
                .unwrap_err();
            assert!(
                matches!(err, GridError::UnsupportedCapability { .. }),
                "{mode}: {err}"
            );
        }
    }

    #[test]
    fn default_next_value_is_unsupported() {
        let err = BareDialect
            .next_value(&NextValueRequest::new("hibernate_sequence", 1, 1))
            .unwrap_err();
        assert!(err.to_string().contains("hibernate_sequence"));
    }

    #[test]
    fn create_tuple_carries_key_columns() {
        let meta = Arc::new(EntityKeyMetadata::new("users", ["tenant", "id"]));
        let key = EntityKey::new(meta, [Value::from("acme"), Value::Int(9)]).unwrap();
        let tuple = BareDialect.create_tuple(&key).unwrap();

        assert_eq!(tuple.snapshot_type(), crate::model::SnapshotType::Insert);
        assert_eq!(tuple.get("tenant"), Some(&Value::from("acme")));
        assert_eq!(tuple.get("id"), Some(&Value::Int(9)));
    }

    #[test]
    fn for_each_tuple_without_scan_capability() {
        let meta = EntityKeyMetadata::new("users", ["id"]);
        let mut calls = 0;
        let err = BareDialect
            .for_each_tuple(&mut |_: &Tuple| calls += 1, &[&meta])
            .unwrap_err();
        assert!(matches!(err, GridError::UnsupportedCapability { .. }));

        // nothing requested, nothing to scan
        BareDialect
            .for_each_tuple(&mut |_: &Tuple| calls += 1, &[])
            .unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn for_each_tuple_scenario_two_tuples() {
        let dialect = scanning();
        let m = EntityKeyMetadata::new("m", ["id"]);

        let mut seen = Vec::new();
        dialect
            .for_each_tuple(&mut |t: &Tuple| seen.push(t.clone()), &[&m])
            .unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&row(1, "x")));
        assert!(seen.contains(&row(2, "y")));

        let mut calls = 0;
        dialect
            .for_each_tuple(&mut |_: &Tuple| calls += 1, &[])
            .unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn for_each_tuple_is_union_of_requested_types() {
        let dialect = scanning();
        let t1 = EntityKeyMetadata::new("m", ["id"]);
        let t2 = EntityKeyMetadata::new("t2", ["id"]);
        let empty = EntityKeyMetadata::new("empty", ["id"]);

        let mut seen = Vec::new();
        dialect
            .for_each_tuple(&mut |t: &Tuple| seen.push(t.clone()), &[&t1, &t2, &empty])
            .unwrap();

        let mut ids: Vec<i64> = seen
            .iter()
            .map(|t| t.get("id").unwrap().as_i64().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
