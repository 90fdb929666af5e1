//! Test utilities for tabula integration tests.
//!
//! Provides:
//! - Temporary data directories for persistent tables
//! - Table constructors bound to a private relation registry

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tabula::observability::tracing::init_test_tracing;
use tabula::{RelationRegistry, StorageMode, Table, TableOptions};
use tempfile::TempDir;

/// Test fixture that manages a temporary data directory and a registry.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory for the persistent database
    pub temp_dir: TempDir,
    /// Registry private to this test
    pub registry: Arc<RelationRegistry>,
}

impl TestFixture {
    /// Create a new test fixture with a temporary data directory.
    pub fn new() -> Self {
        init_test_tracing();
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self {
            temp_dir,
            registry: Arc::new(RelationRegistry::new()),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("table_data")
    }

    /// Options for a volatile table using this fixture's registry.
    pub fn volatile(&self) -> TableOptions {
        TableOptions::default().registry(Arc::clone(&self.registry))
    }

    /// Options for a persistent table in this fixture's data directory.
    pub fn persistent(&self) -> TableOptions {
        self.volatile()
            .storage(StorageMode::persistent(self.data_dir()))
    }

    /// A volatile table of `rows` rows filled with `fill`.
    pub fn table(&self, columns: &[&str], fill: &str, rows: usize) -> Table {
        Table::new(columns, self.volatile().fill(fill).rows(rows)).expect("failed to create table")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the shape invariant: one cached row per row, one cell per column.
pub fn assert_shape(table: &Table) {
    assert_eq!(table.rows().count(), table.len(), "cache length != row count");
    for (i, row) in table.rows().enumerate() {
        assert_eq!(
            row.len(),
            table.column_count(),
            "row {i} has the wrong width"
        );
        assert_eq!(row.column_names(), table.column_names());
    }
}
