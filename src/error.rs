//! Error types for table operations.

use thiserror::Error;

use crate::storage::StoreError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

/// Error type for table construction, mutation and lookup.
#[derive(Debug, Error)]
pub enum TableError {
    /// Conflicting or missing arguments to a constructor or mutation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value count does not match the column or row count it must fill.
    #[error("shape mismatch: expected {expected} {what}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} out of range for length {len}")]
    Index { index: isize, len: usize },

    #[error("unknown column `{0}`")]
    Key(String),

    /// Attribute-style lookup named neither a column nor `_<position>`.
    #[error("row/column `{0}` does not exist or is incorrectly spelt")]
    Attribute(String),

    #[error("invalid slice: {0}")]
    InvalidSlice(&'static str),

    /// The backing store rejected a statement.
    #[error("backing store error: {0}")]
    Store(#[from] StoreError),
}
