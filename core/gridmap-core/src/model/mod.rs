//! Tuple & key model — the backend-agnostic data the dialect layer moves.
//!
//! Leaf module: nothing here depends on [`crate::dialect`].

pub mod association;
pub mod key;
pub mod tuple;
pub mod value;

pub use association::{Association, AssociationOperation};
pub use key::{
    AssociationKey, AssociationKeyMetadata, AssociationKind, EntityKey, EntityKeyMetadata,
    KeyValues, RowKey,
};
pub use tuple::{SnapshotType, Tuple, TupleOperation};
pub use value::Value;
