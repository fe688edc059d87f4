//! Tuple — one logical row as the engine's backend-agnostic currency.
//!
//! A tuple is the snapshot a dialect read from the backend plus a log of the
//! changes the engine made since. Reads see the log layered over the snapshot;
//! write-back calls hand the whole tuple to the dialect, which decides whether
//! to apply [`Tuple::operations`] incrementally or to store [`Tuple::to_map`].

use crate::model::value::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Where a tuple's snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotType {
    /// Created for a row that is not stored yet
    Insert,
    /// Read from the backend
    Update,
    /// Built by hand
    #[default]
    Unknown,
}

/// A pending change to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum TupleOperation {
    Put { column: String, value: Value },
    PutNull { column: String },
    Remove { column: String },
}

impl TupleOperation {
    pub fn column(&self) -> &str {
        match self {
            TupleOperation::Put { column, .. }
            | TupleOperation::PutNull { column }
            | TupleOperation::Remove { column } => column,
        }
    }
}

/// Column name → value mapping, iterated in column-name order.
#[derive(Debug, Clone, Default)]
pub struct Tuple {
    snapshot: BTreeMap<String, Value>,
    // at most one pending operation per column; the latest wins
    operations: BTreeMap<String, TupleOperation>,
    snapshot_type: SnapshotType,
}

impl Tuple {
    /// Empty tuple with an unknown origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tuple for a row that does not exist yet.
    pub fn for_insert() -> Self {
        Self {
            snapshot_type: SnapshotType::Insert,
            ..Self::default()
        }
    }

    /// Wrap columns read from a backend.
    pub fn from_snapshot(columns: BTreeMap<String, Value>, snapshot_type: SnapshotType) -> Self {
        Self {
            snapshot: columns,
            operations: BTreeMap::new(),
            snapshot_type,
        }
    }

    pub fn snapshot_type(&self) -> SnapshotType {
        self.snapshot_type
    }

    pub fn set_snapshot_type(&mut self, snapshot_type: SnapshotType) {
        self.snapshot_type = snapshot_type;
    }

    /// Current value of a column, `None` if absent or removed.
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self.operations.get(column) {
            Some(TupleOperation::Put { value, .. }) => Some(value),
            Some(TupleOperation::PutNull { .. }) => Some(&Value::Null),
            Some(TupleOperation::Remove { .. }) => None,
            None => self.snapshot.get(column),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Set a column. A [`Value::Null`] is recorded as a `PutNull`.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let op = match value.into() {
            Value::Null => TupleOperation::PutNull {
                column: column.clone(),
            },
            value => TupleOperation::Put {
                column: column.clone(),
                value,
            },
        };
        self.operations.insert(column, op);
    }

    pub fn remove(&mut self, column: &str) {
        match self.operations.entry(column.to_string()) {
            Entry::Occupied(mut e) => {
                if self.snapshot.contains_key(column) {
                    e.insert(TupleOperation::Remove {
                        column: column.to_string(),
                    });
                } else {
                    // never stored, nothing to remove in the backend
                    e.remove();
                }
            }
            Entry::Vacant(e) => {
                if self.snapshot.contains_key(column) {
                    e.insert(TupleOperation::Remove {
                        column: column.to_string(),
                    });
                }
            }
        }
    }

    /// Pending changes in column-name order.
    pub fn operations(&self) -> impl Iterator<Item = &TupleOperation> {
        self.operations.values()
    }

    pub fn has_pending_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Current column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .snapshot
            .keys()
            .filter(|c| !matches!(self.operations.get(*c), Some(TupleOperation::Remove { .. })))
            .map(String::as_str)
            .collect();
        for (column, op) in &self.operations {
            if !matches!(op, TupleOperation::Remove { .. }) && !self.snapshot.contains_key(column)
            {
                names.push(column.as_str());
            }
        }
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.column_names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the current state.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = self.snapshot.clone();
        for (column, op) in &self.operations {
            match op {
                TupleOperation::Put { value, .. } => {
                    map.insert(column.clone(), value.clone());
                }
                TupleOperation::PutNull { .. } => {
                    map.insert(column.clone(), Value::Null);
                }
                TupleOperation::Remove { .. } => {
                    map.remove(column);
                }
            }
        }
        map
    }

    /// Fold pending operations into the snapshot, as after a successful write.
    pub fn apply_operations(&mut self) {
        self.snapshot = self.to_map();
        self.operations.clear();
        self.snapshot_type = SnapshotType::Update;
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Tuple {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let snapshot = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_snapshot(snapshot, SnapshotType::Unknown)
    }
}
