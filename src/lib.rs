//! Tabula: in-process tables of named columns backed by SQLite.
//!
//! A [`Table`] owns a uniquely named relation in a volatile (in-memory) or
//! persistent (file-backed) SQLite database, and a cache of its rows. Every
//! mutation is written to the relation and the cache is then pulled again in
//! full; reads only touch the cache.
//!
//! # Architecture
//!
//! - **Sanitized statements**: identifiers and values pass a denylist filter
//!   before reaching SQL text; values are also bound as parameters
//! - **Row snapshots**: a [`Row`] owns its cells and keeps its shape when the
//!   table later changes
//! - **Live columns**: a [`Col`] borrows the table and reads its current cache
//! - **Generalized indexing**: [`Table::index`] takes positions, names, slices
//!   and tuples of them
//!
//! # Modules
//!
//! - [`config`]: table options and CLI configuration
//! - [`error`]: error types
//! - [`observability`]: tracing setup
//! - [`registry`]: live relation names
//! - [`sanitize`]: denylist filter and sanitized identifiers
//! - [`storage`]: SQLite persistence layer
//! - [`table`]: tables, rows, columns and index keys
//!
//! # Example
//!
//! ```
//! use tabula::{Cell, ColSpec, Table, TableOptions};
//!
//! let mut table = Table::new(["a", "b"], TableOptions::default().fill("x").rows(2))?;
//! table.push_row(["p", "q"])?;
//! table.add_col(ColSpec::named("c").with_default("z"))?;
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table[2]["b"], Cell::from("q"));
//! assert_eq!(table.col("c")?.to_vec(), vec![Cell::from("z"); 3]);
//! # Ok::<(), tabula::TableError>(())
//! ```
//!
//! # Limitations
//!
//! The denylist filter is not a defense against adversarial input on its own.
//! Table and column names are interpolated into SQL after filtering; only cell
//! values are bound as parameters.

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // table::TableOptions is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::needless_raw_string_hashes, // r#""# is fine for SQL
    clippy::cast_sign_loss,             // positions are range-checked first
    clippy::cast_possible_wrap          // i32 -> isize keys
)]

pub mod config;
pub mod error;
pub mod observability;
pub mod registry;
pub mod sanitize;
pub mod storage;
pub mod table;
pub mod value;

pub use config::{StorageMode, TableOptions};
pub use error::{Result, TableError};
pub use registry::RelationRegistry;
pub use sanitize::sanitize;
pub use storage::StoreError;
pub use table::{Col, ColSpec, Item, Key, NameRange, Row, RowSpec, Selection, Slice, Table};
pub use value::Cell;
