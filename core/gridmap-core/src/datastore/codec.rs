//! Row and key encoding shared by the bundled datastores.
//!
//! Keys are the `bincode` encoding of their ordered value list, so equal keys
//! always produce equal bytes. Float components are canonicalized first:
//! `-0.0` encodes as `0.0` and every NaN as the same NaN. Rows are stored as
//! column-name → value maps.

use crate::error::{GridError, GridResult};
use crate::model::{
    Association, AssociationKeyMetadata, SnapshotType, Tuple, TupleOperation, Value,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column map as stored.
pub type Row = BTreeMap<String, Value>;

/// One association row as stored: row key values plus columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssociationRow {
    pub key_values: Vec<Value>,
    pub columns: Row,
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> GridResult<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> GridResult<T> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn encode_key(values: &[Value]) -> GridResult<Vec<u8>> {
    if !values.iter().any(|v| matches!(v, Value::Float(_))) {
        return encode(values);
    }
    let canonical: Vec<Value> = values
        .iter()
        .map(|v| match v {
            Value::Float(f) if *f == 0.0 => Value::Float(0.0),
            Value::Float(f) if f.is_nan() => Value::Float(f64::NAN),
            other => other.clone(),
        })
        .collect();
    encode(&canonical)
}

/// Row to store when writing `tuple` over `existing`.
///
/// An `Update` tuple replays its operations on the stored row so concurrent
/// writes to other columns survive; any other tuple replaces the row.
pub fn merged_row(existing: Option<Row>, tuple: &Tuple) -> Row {
    match (existing, tuple.snapshot_type()) {
        (Some(mut row), SnapshotType::Update) => {
            for op in tuple.operations() {
                match op {
                    TupleOperation::Put { column, value } => {
                        row.insert(column.clone(), value.clone());
                    }
                    TupleOperation::PutNull { column } => {
                        row.insert(column.clone(), Value::Null);
                    }
                    TupleOperation::Remove { column } => {
                        row.remove(column);
                    }
                }
            }
            row
        }
        _ => tuple.to_map(),
    }
}

pub fn association_to_rows(association: &Association) -> Vec<StoredAssociationRow> {
    association
        .rows()
        .map(|(key, tuple)| StoredAssociationRow {
            key_values: key.column_values().to_vec(),
            columns: tuple.to_map(),
        })
        .collect()
}

pub fn association_from_rows(
    metadata: &AssociationKeyMetadata,
    rows: Vec<StoredAssociationRow>,
) -> GridResult<Association> {
    let rows = rows
        .into_iter()
        .map(|row| {
            let key = metadata.row_key(row.key_values)?;
            Ok((key, Tuple::from_snapshot(row.columns, SnapshotType::Update)))
        })
        .collect::<GridResult<Vec<_>>>()?;
    Ok(Association::from_snapshot(rows))
}

/// Error for an insert that hit an existing key.
pub fn duplicate_key(table: &str, key: &impl std::fmt::Display) -> GridError {
    GridError::DuplicateKey {
        table: table.to_string(),
        key: key.to_string(),
    }
}
