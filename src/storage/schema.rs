//! Connection pragmas and statement text for table relations.
//!
//! Every identifier arrives here as an [`Ident`], already sanitized. Cell
//! values are bound as parameters except in the `DEFAULT` clause.

use std::time::Duration;

use rusqlite::Connection;

use crate::sanitize::Ident;
use crate::value::Cell;

/// Declared type of every column.
pub const COLUMN_TYPE: &str = "VARCHAR(255)";

/// Busy timeout for persistent connections sharing one database file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply pragmas for a file-backed connection.
///
/// - `journal_mode=WAL`: readers and the writer of other tables don't block
/// - `synchronous=FULL`: committed mutations survive power loss
/// - `busy_timeout`: wait for other tables' writers instead of failing
pub fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    conn.pragma_update(None, "synchronous", "FULL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

/// Apply pragmas for an in-memory connection.
pub fn apply_volatile_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update_and_check(None, "journal_mode", "MEMORY", |row| {
        row.get::<_, String>(0)
    })?;
    Ok(())
}

fn column_list(columns: &[Ident]) -> String {
    columns
        .iter()
        .map(Ident::quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_table_sql(relation: &Ident, columns: &[Ident], fill: &Cell) -> String {
    let defaults = fill.to_literal();
    let attributes = columns
        .iter()
        .map(|col| format!("{} {COLUMN_TYPE} DEFAULT {defaults}", col.quoted()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({attributes})", relation.quoted())
}

/// `INSERT` of one row with `width` positional parameters.
pub fn insert_row_sql(relation: &Ident, width: usize) -> String {
    let params = (1..=width)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} VALUES ({params})", relation.quoted())
}

pub fn add_column_sql(relation: &Ident, column: &Ident) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {} {COLUMN_TYPE}",
        relation.quoted(),
        column.quoted()
    )
}

/// Single-cell update addressed by physical row position (`?1` value, `?2` rowid).
pub fn update_cell_sql(relation: &Ident, column: &Ident) -> String {
    format!(
        "UPDATE {} SET {} = ?1 WHERE rowid = ?2",
        relation.quoted(),
        column.quoted()
    )
}

/// Projection of every declared column in declared order, rows in insertion order.
pub fn select_all_sql(relation: &Ident, columns: &[Ident]) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY rowid",
        column_list(columns),
        relation.quoted()
    )
}

pub fn drop_table_sql(relation: &Ident) -> String {
    format!("DROP TABLE IF EXISTS {}", relation.quoted())
}
