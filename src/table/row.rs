//! Row snapshots.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::key::{numeric_attr, resolve_pos, Slice};
use crate::error::{Result, TableError};
use crate::value::Cell;

/// One record of a table, as materialized from the store.
///
/// A row is a snapshot: it shares the column names that were current when it
/// was pulled and owns its cells. Cloning a row and keeping it across a table
/// mutation yields a stale copy; re-index the table to see current data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Cell>,
}

impl Row {
    /// Build a row, checking that there is exactly one value per column.
    pub fn new(columns: Arc<[String]>, values: Vec<Cell>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(TableError::ShapeMismatch {
                what: "values for the row's columns",
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Cell> {
        self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.values.iter()
    }

    /// Cell by position; negative positions count from the end.
    pub fn get(&self, index: isize) -> Result<&Cell> {
        Ok(&self.values[resolve_pos(index, self.values.len())?])
    }

    /// Cell by column name.
    pub fn by_name(&self, name: &str) -> Result<&Cell> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
            .ok_or_else(|| TableError::Key(name.to_string()))
    }

    pub fn slice(&self, slice: Slice) -> Result<Vec<&Cell>> {
        Ok(slice
            .indices(self.values.len())?
            .into_iter()
            .map(|i| &self.values[i])
            .collect())
    }

    /// Attribute-style lookup: `_<n>` is position `n`, anything else a column name.
    pub fn attr(&self, name: &str) -> Result<&Cell> {
        if let Some(index) = numeric_attr(name) {
            return self.get(index);
        }
        self.by_name(name)
            .map_err(|_| TableError::Attribute(name.to_string()))
    }

    /// Pairs of column name and cell, in column order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(String::as_str).zip(&self.values)
    }
}

impl Index<usize> for Row {
    type Output = Cell;

    fn index(&self, index: usize) -> &Cell {
        &self.values[index]
    }
}

impl Index<&str> for Row {
    type Output = Cell;

    /// # Panics
    ///
    /// Panics if the row has no column named `name`.
    fn index(&self, name: &str) -> &Cell {
        match self.by_name(name) {
            Ok(cell) => cell,
            Err(_) => panic!("no column named `{name}`"),
        }
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<Row {")?;
        for (i, (name, cell)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {cell}")?;
        }
        f.write_str("}>")
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, cell) in self.entries() {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Row {
        let columns: Arc<[String]> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        Row::new(columns, values.iter().map(|v| Cell::from(*v)).collect()).unwrap()
    }

    #[test]
    fn test_row_width_is_checked() {
        let columns: Arc<[String]> = Arc::from(vec!["a".to_string()]);
        let err = Row::new(columns, vec![Cell::Null, Cell::Null]).unwrap_err();
        assert!(matches!(
            err,
            TableError::ShapeMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_lookup_by_position_and_name() {
        let r = row(&["x", "y", "z"]);

        assert_eq!(r.len(), 3);
        assert_eq!(r.get(0).unwrap(), &Cell::from("x"));
        assert_eq!(r.get(-1).unwrap(), &Cell::from("z"));
        assert!(r.get(3).is_err());
        assert_eq!(r.by_name("b").unwrap(), &Cell::from("y"));
        assert!(matches!(r.by_name("q"), Err(TableError::Key(_))));
        assert_eq!(r[1], Cell::from("y"));
        assert_eq!(r["c"], Cell::from("z"));
    }

    #[test]
    fn test_attr() {
        let r = row(&["x", "y", "z"]);

        assert_eq!(r.attr("_2").unwrap(), &Cell::from("z"));
        assert_eq!(r.attr("a").unwrap(), &Cell::from("x"));
        assert!(matches!(r.attr("nope"), Err(TableError::Attribute(_))));
        assert!(matches!(r.attr("_9"), Err(TableError::Index { .. })));
    }

    #[test]
    fn test_slice() {
        let r = row(&["x", "y", "z"]);
        let cells: Vec<_> = r.slice(Slice::from(1..)).unwrap();
        assert_eq!(cells, vec![&Cell::from("y"), &Cell::from("z")]);
    }

    #[test]
    fn test_display_and_serialize() {
        let r = row(&["x", "y", "z"]);
        assert_eq!(r.to_string(), r#"<Row {a: "x", b: "y", c: "z"}>"#);
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"a":"x","b":"y","c":"z"}"#
        );
    }
}
