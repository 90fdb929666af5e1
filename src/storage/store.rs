//! One SQLite connection backing one table.

use std::fs;
use std::path::PathBuf;

use rusqlite::{params, params_from_iter, Connection, OpenFlags};

use super::schema;
use super::StoreError;
use crate::config::{StorageMode, DB_FILE_NAME};
use crate::sanitize::Ident;
use crate::value::Cell;

/// Connection to the backing store of a single table.
///
/// Each mutation runs in its own transaction: a failing statement rolls back
/// everything the mutation did before it.
#[derive(Debug)]
pub struct Store {
    conn: Option<Connection>,
    mode: StorageMode,
}

impl Store {
    /// Open a connection for the given storage mode.
    ///
    /// Persistent mode creates the data directory when missing.
    pub fn open(mode: &StorageMode) -> Result<Self, StoreError> {
        let conn = match mode {
            StorageMode::Volatile => {
                let conn = Connection::open_in_memory()?;
                schema::apply_volatile_pragmas(&conn)?;
                conn
            }
            StorageMode::Persistent { data_dir } => {
                fs::create_dir_all(data_dir)?;
                let path = data_dir.join(DB_FILE_NAME);
                let conn = Connection::open_with_flags(
                    &path,
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_CREATE
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|source| StoreError::Open {
                    path: path.clone(),
                    source,
                })?;
                schema::apply_pragmas(&conn)?;
                conn
            }
        };
        tracing::debug!(mode = ?mode, "Opened backing store");
        Ok(Self {
            conn: Some(conn),
            mode: mode.clone(),
        })
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }

    fn conn_mut(&mut self) -> Result<&mut Connection, StoreError> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }

    pub fn mode(&self) -> &StorageMode {
        &self.mode
    }

    /// Path of the database file, if file-backed.
    pub fn path(&self) -> Option<PathBuf> {
        match &self.mode {
            StorageMode::Volatile => None,
            StorageMode::Persistent { data_dir } => Some(data_dir.join(DB_FILE_NAME)),
        }
    }

    /// Create the relation and insert `rows` rows of `fill`.
    pub fn create_relation(
        &mut self,
        relation: &Ident,
        columns: &[Ident],
        fill: &Cell,
        rows: usize,
    ) -> Result<(), StoreError> {
        let tx = self.conn_mut()?.transaction()?;
        let create = schema::create_table_sql(relation, columns, fill);
        tracing::debug!(sql = %create, "Executing");
        tx.execute(&create, [])?;

        if rows > 0 {
            let insert = schema::insert_row_sql(relation, columns.len());
            tracing::debug!(sql = %insert, rows, "Executing");
            let mut stmt = tx.prepare(&insert)?;
            for _ in 0..rows {
                stmt.execute(params_from_iter(std::iter::repeat(fill).take(columns.len())))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Append one row. `cells` must already be sanitized.
    pub fn insert_row(&mut self, relation: &Ident, cells: &[Cell]) -> Result<(), StoreError> {
        let insert = schema::insert_row_sql(relation, cells.len());
        tracing::debug!(sql = %insert, "Executing");
        let tx = self.conn_mut()?.transaction()?;
        tx.execute(&insert, params_from_iter(cells))?;
        tx.commit()?;
        Ok(())
    }

    /// Add a column and fill it row by row; `cells[i]` goes to rowid `i + 1`.
    pub fn add_column(
        &mut self,
        relation: &Ident,
        column: &Ident,
        cells: &[Cell],
    ) -> Result<(), StoreError> {
        let tx = self.conn_mut()?.transaction()?;
        let alter = schema::add_column_sql(relation, column);
        tracing::debug!(sql = %alter, "Executing");
        tx.execute(&alter, [])?;

        if !cells.is_empty() {
            let update = schema::update_cell_sql(relation, column);
            tracing::debug!(sql = %update, rows = cells.len(), "Executing");
            let mut stmt = tx.prepare(&update)?;
            for (rowid, cell) in (1_i64..).zip(cells) {
                stmt.execute(params![cell, rowid])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Read every row, projecting `columns` in order.
    pub fn fetch_all(
        &self,
        relation: &Ident,
        columns: &[Ident],
    ) -> Result<Vec<Vec<Cell>>, StoreError> {
        let select = schema::select_all_sql(relation, columns);
        let mut stmt = self.conn()?.prepare(&select)?;
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Cell>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        tracing::trace!(sql = %select, rows = rows.len(), "Fetched");
        Ok(rows)
    }

    /// Number of rows physically present in the relation.
    #[cfg(test)]
    pub(crate) fn count_rows(&self, relation: &Ident) -> Result<usize, StoreError> {
        let count: i64 = self.conn()?.query_row(
            &format!("SELECT COUNT(*) FROM {}", relation.quoted()),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn drop_relation(&mut self, relation: &Ident) -> Result<(), StoreError> {
        let drop = schema::drop_table_sql(relation);
        tracing::debug!(sql = %drop, "Executing");
        self.conn()?.execute(&drop, [])?;
        Ok(())
    }

    /// Whether a relation with this name exists in the store.
    #[cfg(test)]
    pub(crate) fn has_relation(&self, relation: &Ident) -> Result<bool, StoreError> {
        let exists = self.conn()?.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [relation.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Close the connection, reporting any error SQLite raises on close.
    ///
    /// Every later call fails with [`StoreError::Closed`]; closing twice is a
    /// no-op.
    pub fn close(&mut self) -> Result<(), StoreError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, err)| StoreError::Database(err)),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}
