//! tabula: build a SQLite-backed table from the command line and print it.
//!
//! # Usage
//!
//! ```bash
//! tabula --columns a,b --rows 2 --fill x --row p,q --output json
//! ```
//!
//! Environment variables can also be used:
//! - `TABULA_DATA_DIR`: Data directory for `--persistent`
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use anyhow::{Context, Result};
use tabula::config::{Config, OutputFormat};
use tabula::observability::tracing::init_tracing;
use tabula::Table;

fn main() -> Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    let mut table = Table::new(&config.columns, config.table_options())
        .context("failed to create table")?;

    for (i, values) in config.appended_rows().into_iter().enumerate() {
        table
            .push_row(values)
            .with_context(|| format!("failed to append row {}", i + 1))?;
    }

    match config.output {
        OutputFormat::Text => println!("{table}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }

    tracing::debug!(relation = table.relation(), rows = table.len(), "Done");
    Ok(())
}
