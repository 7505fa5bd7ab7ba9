//! Row structs for the approval schema.
//!
//! Each row type mirrors its table and converts into the matching
//! `depot-core` domain type with `TryFrom`, rejecting unknown enum text.

pub mod approval;
pub mod document;
pub mod user;

/// A text column held a value outside its enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Row decode error: {0}")]
pub struct RowDecodeError(pub String);

impl From<RowDecodeError> for depot_core::store::StoreError {
    fn from(err: RowDecodeError) -> Self {
        depot_core::store::StoreError::Backend(err.to_string())
    }
}
