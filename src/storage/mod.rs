//! SQLite storage layer for tables.
//!
//! Provides:
//! - Connection setup for volatile and persistent modes
//! - Statement text for the relation of each table
//! - Transactional mutations and full-table reads

pub mod schema;
pub mod store;

pub use store::Store;

use std::path::PathBuf;
use thiserror::Error;

/// Error type for backing store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection already closed")]
    Closed,
}
