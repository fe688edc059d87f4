//! Entity, association and row keys with their static metadata.
//!
//! Metadata descriptors are built once per mapped type and shared read-only
//! through `Arc`. Keys are built per operation and checked against their
//! metadata on construction: a key always carries exactly one value per
//! metadata column, in the same order.

use crate::error::{GridError, GridResult};
use crate::model::value::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Identifier values of one key. Most identifiers have one or two columns.
pub type KeyValues = SmallVec<[Value; 2]>;

fn check_shape(table: &str, expected: usize, actual: usize) -> GridResult<()> {
    if expected != actual {
        return Err(GridError::InconsistentKeyShape {
            table: table.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn write_pairs(f: &mut fmt::Formatter<'_>, names: &[String], values: &[Value]) -> fmt::Result {
    for (i, (name, value)) in names.iter().zip(values).enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}={value}")?;
    }
    Ok(())
}

/// Table and identifier columns of a mapped entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKeyMetadata {
    table: String,
    column_names: Vec<String>,
}

impl EntityKeyMetadata {
    pub fn new<I, S>(table: impl Into<String>, column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            column_names: column_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn is_key_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }
}

/// Identifier of one entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityKey {
    metadata: Arc<EntityKeyMetadata>,
    column_values: KeyValues,
}

impl EntityKey {
    /// Fails with [`GridError::InconsistentKeyShape`] when the value count
    /// differs from the metadata's column count.
    pub fn new<I>(metadata: Arc<EntityKeyMetadata>, column_values: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let column_values: KeyValues = column_values.into_iter().collect();
        check_shape(
            metadata.table(),
            metadata.column_names().len(),
            column_values.len(),
        )?;
        Ok(Self {
            metadata,
            column_values,
        })
    }

    pub fn metadata(&self) -> &Arc<EntityKeyMetadata> {
        &self.metadata
    }

    pub fn table(&self) -> &str {
        self.metadata.table()
    }

    pub fn column_names(&self) -> &[String] {
        self.metadata.column_names()
    }

    pub fn column_values(&self) -> &[Value] {
        &self.column_values
    }

    /// Value of one identifier column.
    pub fn value_of(&self, column: &str) -> Option<&Value> {
        self.column_names()
            .iter()
            .position(|c| c == column)
            .map(|i| &self.column_values[i])
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.table())?;
        write_pairs(f, self.column_names(), &self.column_values)?;
        f.write_str("]")
    }
}

/// How an association is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssociationKind {
    /// Links between entities
    #[default]
    Association,
    /// Collection of embeddables or basic values owned by one entity
    EmbeddedCollection,
}

/// Table and key columns of an association.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssociationKeyMetadata {
    table: String,
    column_names: Vec<String>,
    row_key_column_names: Vec<String>,
    collection_role: Option<String>,
    kind: AssociationKind,
}

impl AssociationKeyMetadata {
    /// `column_names` group the association (usually the owner's foreign key);
    /// `row_key_column_names` identify one row inside it.
    pub fn new<I, J, S, T>(table: impl Into<String>, column_names: I, row_key_column_names: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            table: table.into(),
            column_names: column_names.into_iter().map(Into::into).collect(),
            row_key_column_names: row_key_column_names.into_iter().map(Into::into).collect(),
            collection_role: None,
            kind: AssociationKind::default(),
        }
    }

    pub fn with_collection_role(mut self, role: impl Into<String>) -> Self {
        self.collection_role = Some(role.into());
        self
    }

    pub fn with_kind(mut self, kind: AssociationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn row_key_column_names(&self) -> &[String] {
        &self.row_key_column_names
    }

    pub fn collection_role(&self) -> Option<&str> {
        self.collection_role.as_deref()
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// Build a row key over this association's row key columns.
    pub fn row_key<I>(&self, values: I) -> GridResult<RowKey>
    where
        I: IntoIterator<Item = Value>,
    {
        RowKey::new(self.row_key_column_names.clone(), values)
    }
}

/// Identifier of one association (all rows sharing the grouping key).
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationKey {
    metadata: Arc<AssociationKeyMetadata>,
    column_values: KeyValues,
    owner: Option<EntityKey>,
}

impl AssociationKey {
    pub fn new<I>(metadata: Arc<AssociationKeyMetadata>, column_values: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let column_values: KeyValues = column_values.into_iter().collect();
        check_shape(
            metadata.table(),
            metadata.column_names().len(),
            column_values.len(),
        )?;
        Ok(Self {
            metadata,
            column_values,
            owner: None,
        })
    }

    /// Attach the key of the entity owning this association.
    pub fn with_owner(mut self, owner: EntityKey) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn metadata(&self) -> &Arc<AssociationKeyMetadata> {
        &self.metadata
    }

    pub fn table(&self) -> &str {
        self.metadata.table()
    }

    pub fn column_names(&self) -> &[String] {
        self.metadata.column_names()
    }

    pub fn column_values(&self) -> &[Value] {
        &self.column_values
    }

    pub fn owner(&self) -> Option<&EntityKey> {
        self.owner.as_ref()
    }
}

impl fmt::Display for AssociationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.table())?;
        write_pairs(f, self.column_names(), &self.column_values)?;
        f.write_str("]")
    }
}

/// Identifier of one row inside an association.
#[derive(Debug, Clone, PartialEq)]
pub struct RowKey {
    column_names: Vec<String>,
    column_values: KeyValues,
}

impl RowKey {
    pub fn new<I>(column_names: Vec<String>, column_values: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let column_values: KeyValues = column_values.into_iter().collect();
        check_shape("<row key>", column_names.len(), column_values.len())?;
        Ok(Self {
            column_names,
            column_values,
        })
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_values(&self) -> &[Value] {
        &self.column_values
    }

    pub fn value_of(&self, column: &str) -> Option<&Value> {
        self.column_names
            .iter()
            .position(|c| c == column)
            .map(|i| &self.column_values[i])
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_pairs(f, &self.column_names, &self.column_values)?;
        f.write_str("]")
    }
}
