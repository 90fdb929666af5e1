//! Configuration for tables and the `tabula` binary.
//!
//! Supports:
//! - Per-table options with sensible defaults
//! - CLI arguments via clap, with environment variable overrides

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use crate::registry::RelationRegistry;
use crate::value::Cell;

/// File name of the shared database used by persistent tables.
pub const DB_FILE_NAME: &str = "tables.db";

/// Default directory for persistent tables.
pub const DEFAULT_DATA_DIR: &str = "./table_data";

/// Where a table's backing relation lives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Private in-memory database, discarded with the table.
    #[default]
    Volatile,
    /// File-backed database at `<data_dir>/tables.db`, shared by every
    /// persistent table pointing at the same directory.
    Persistent { data_dir: PathBuf },
}

impl StorageMode {
    pub fn persistent(data_dir: impl Into<PathBuf>) -> Self {
        Self::Persistent {
            data_dir: data_dir.into(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent { .. })
    }
}

/// Options for [`Table::new`](crate::Table::new).
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Value of every cell created without explicit data. `None` means NULL.
    pub default_fill: Option<Cell>,
    /// Rows inserted at construction, each filled with `default_fill`.
    pub initial_rows: usize,
    pub storage: StorageMode,
    /// Registry to reserve the relation name from. `None` uses the
    /// process-wide registry.
    pub registry: Option<Arc<RelationRegistry>>,
}

impl TableOptions {
    #[must_use]
    pub fn fill(mut self, fill: impl Into<Cell>) -> Self {
        self.default_fill = Some(fill.into());
        self
    }

    #[must_use]
    pub fn rows(mut self, initial_rows: usize) -> Self {
        self.initial_rows = initial_rows;
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: StorageMode) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<RelationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}

/// Tabula: build a SQLite-backed table and print it.
#[derive(Parser, Debug, Clone)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Column names, comma separated (empty entries are auto-named)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Number of rows created up front with the fill value
    #[arg(short = 'n', long, default_value_t = 0)]
    pub rows: usize,

    /// Value of every pre-populated cell (NULL when omitted)
    #[arg(short, long)]
    pub fill: Option<String>,

    /// Row to append, comma separated (repeatable)
    #[arg(long = "row")]
    pub append: Vec<String>,

    /// Keep the backing relation in a file instead of memory
    #[arg(long)]
    pub persistent: bool,

    /// Data directory for the persistent database
    #[arg(short, long, env = "TABULA_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: {s}")),
        }
    }
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Rows given with `--row`, split into cells.
    pub fn appended_rows(&self) -> Vec<Vec<Cell>> {
        self.append
            .iter()
            .map(|row| row.split(',').map(Cell::from).collect())
            .collect()
    }

    /// Table options described by this configuration.
    pub fn table_options(&self) -> TableOptions {
        let storage = if self.persistent {
            StorageMode::persistent(&self.data_dir)
        } else {
            StorageMode::Volatile
        };
        TableOptions {
            default_fill: self.fill.as_deref().map(Cell::from),
            initial_rows: self.rows,
            storage,
            registry: None,
        }
    }
}
