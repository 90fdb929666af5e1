//! Live column views.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::key::{numeric_attr, resolve_pos, Slice};
use super::row::Row;
use super::Table;
use crate::error::{Result, TableError};
use crate::value::Cell;

/// One column of a table, read from the table's current row cache.
///
/// A `Col` holds no cells of its own. It borrows the table, so it cannot be
/// held across a mutation and always reflects the live cache.
#[derive(Clone, Copy)]
pub struct Col<'t> {
    table: &'t Table,
    position: usize,
}

impl<'t> Col<'t> {
    pub(crate) fn new(table: &'t Table, position: usize) -> Self {
        Self { table, position }
    }

    pub fn name(&self) -> &'t str {
        &self.table.column_names()[self.position]
    }

    /// Position of the column in the table's declaration order.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// Number of cells, equal to the table's row count.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The column's cell of every row, in row order.
    pub fn iter(&self) -> impl Iterator<Item = &'t Cell> + 't {
        let position = self.position;
        self.table.rows().map(move |row: &'t Row| &row[position])
    }

    /// Cell of one row; negative positions count from the end.
    pub fn get(&self, index: isize) -> Result<&'t Cell> {
        let row = resolve_pos(index, self.len())?;
        Ok(&self.table.rows_slice()[row][self.position])
    }

    pub fn slice(&self, slice: Slice) -> Result<Vec<&'t Cell>> {
        let rows = self.table.rows_slice();
        Ok(slice
            .indices(rows.len())?
            .into_iter()
            .map(|i| &rows[i][self.position])
            .collect())
    }

    /// Attribute-style lookup: only `_<n>` (row position `n`) is accepted.
    pub fn attr(&self, name: &str) -> Result<&'t Cell> {
        let index = numeric_attr(name).ok_or_else(|| TableError::Attribute(name.to_string()))?;
        self.get(index)
    }

    /// Copy the current cells out.
    pub fn to_vec(&self) -> Vec<Cell> {
        self.iter().cloned().collect()
    }
}

impl<'t> IntoIterator for Col<'t> {
    type Item = &'t Cell;
    type IntoIter = Box<dyn Iterator<Item = &'t Cell> + 't>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl PartialEq for Col<'_> {
    /// Columns are equal when they hold the same name and cells.
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for Col<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Col")
            .field("name", &self.name())
            .field("position", &self.position)
            .field("relation", &self.table.relation())
            .finish()
    }
}

impl fmt::Display for Col<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Col {} [", self.name())?;
        for (i, cell) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{cell}")?;
        }
        f.write_str("]>")
    }
}

impl Serialize for Col<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for cell in self.iter() {
            seq.serialize_element(cell)?;
        }
        seq.end()
    }
}
