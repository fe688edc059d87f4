//! Association — the rows of one relationship or embedded collection.
//!
//! Mirrors [`Tuple`]: the rows read from the backend plus a log of changes.
//! Rows are kept in insertion order; row keys are compared by value.

use crate::model::key::RowKey;
use crate::model::tuple::Tuple;

/// A pending change to an association.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationOperation {
    Put { key: RowKey, row: Tuple },
    Remove { key: RowKey },
    Clear,
}

#[derive(Debug, Clone, Default)]
pub struct Association {
    snapshot: Vec<(RowKey, Tuple)>,
    rows: Vec<(RowKey, Tuple)>,
    operations: Vec<AssociationOperation>,
}

impl Association {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap rows read from a backend.
    pub fn from_snapshot(rows: Vec<(RowKey, Tuple)>) -> Self {
        Self {
            snapshot: rows.clone(),
            rows,
            operations: Vec::new(),
        }
    }

    pub fn get(&self, key: &RowKey) -> Option<&Tuple> {
        self.rows.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.get(key).is_some()
    }

    /// Add or replace a row.
    pub fn put(&mut self, key: RowKey, row: Tuple) {
        match self.rows.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = row.clone(),
            None => self.rows.push((key.clone(), row.clone())),
        }
        self.operations.push(AssociationOperation::Put { key, row });
    }

    pub fn remove(&mut self, key: &RowKey) {
        let before = self.rows.len();
        self.rows.retain(|(k, _)| k != key);
        if self.rows.len() != before {
            self.operations
                .push(AssociationOperation::Remove { key: key.clone() });
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.operations.push(AssociationOperation::Clear);
    }

    /// Current rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = (&RowKey, &Tuple)> {
        self.rows.iter().map(|(k, t)| (k, t))
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.iter().map(|(k, _)| k)
    }

    /// Rows as they were when read.
    pub fn snapshot(&self) -> &[(RowKey, Tuple)] {
        &self.snapshot
    }

    pub fn operations(&self) -> &[AssociationOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
