//! Tables backed by a SQLite relation.
//!
//! A [`Table`] keeps every row in an in-memory cache. Mutations go to the
//! backing relation first, then the whole cache is pulled again; reads only
//! ever consult the cache.

mod col;
mod key;
mod mutation;
mod row;

pub use col::Col;
pub use key::{Item, Key, NameRange, Selection, Slice};
pub use mutation::{ColSpec, RowSpec};
pub use row::Row;

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::config::{StorageMode, TableOptions};
use crate::error::{Result, TableError};
use crate::registry::RelationRegistry;
use crate::sanitize::{sanitize, Ident};
use crate::storage::Store;
use crate::value::Cell;
use key::{numeric_attr, resolve_pos};

/// An ordered set of named columns and ordered rows.
///
/// Invariants, checked after every mutation:
/// - the cache holds exactly `len()` rows, the same number the relation holds
/// - every cached row has one cell per column
pub struct Table {
    columns: Vec<Ident>,
    names: Arc<[String]>,
    row_count: usize,
    relation: Ident,
    cache: Vec<Row>,
    default_fill: Cell,
    store: Store,
    registry: Arc<RelationRegistry>,
}

impl Table {
    /// Create a table and its backing relation.
    ///
    /// Empty column names become `no_name_<position>`. Fails with
    /// [`TableError::Configuration`] when `column_names` is empty or holds a
    /// name twice; a failed construction leaves no relation and no reserved
    /// name behind.
    #[tracing::instrument(skip_all, fields(relation))]
    pub fn new<I, S>(column_names: I, options: TableOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = declare_columns(column_names)?;
        let default_fill = options.default_fill.map_or(Cell::Null, Cell::sanitized);
        let mut store = Store::open(&options.storage)?;

        let registry = options.registry.unwrap_or_else(RelationRegistry::global);
        let relation = Ident::new(&registry.reserve());
        tracing::Span::current().record("relation", relation.as_str());

        if let Err(err) =
            store.create_relation(&relation, &columns, &default_fill, options.initial_rows)
        {
            registry.release(relation.as_str());
            return Err(err.into());
        }

        let names = column_strings(&columns);
        let mut table = Self {
            columns,
            names,
            row_count: options.initial_rows,
            relation,
            cache: Vec::new(),
            default_fill,
            store,
            registry,
        };
        // From here on, dropping `table` removes the relation again.
        table.refresh()?;

        tracing::info!(
            columns = table.columns.len(),
            rows = table.row_count,
            persistent = table.store.mode().is_persistent(),
            "Created table"
        );
        Ok(table)
    }

    /// Append a row and return it.
    ///
    /// Fails with [`TableError::Configuration`] if both `values` and `default`
    /// are set, and with [`TableError::ShapeMismatch`] if `values` does not
    /// have one cell per column.
    #[tracing::instrument(skip(self, spec), fields(relation = %self.relation))]
    pub fn add_row(&mut self, spec: RowSpec) -> Result<&Row> {
        let width = self.columns.len();
        let cells = match (spec.values, spec.default) {
            (Some(_), Some(_)) => {
                return Err(TableError::Configuration(
                    "either row values or a default may be set, not both".into(),
                ))
            }
            (Some(values), None) => {
                if values.len() != width {
                    return Err(TableError::ShapeMismatch {
                        what: "row values (one per column)",
                        expected: width,
                        actual: values.len(),
                    });
                }
                values.into_iter().map(Cell::sanitized).collect()
            }
            (None, Some(default)) => vec![default.sanitized(); width],
            (None, None) => vec![Cell::Null; width],
        };

        self.store.insert_row(&self.relation, &cells)?;
        self.row_count += 1;
        self.refresh()?;
        self.row(-1)
    }

    /// Append a row of `values`, one per column.
    pub fn push_row<I, V>(&mut self, values: I) -> Result<&Row>
    where
        I: IntoIterator<Item = V>,
        V: Into<Cell>,
    {
        self.add_row(RowSpec::values(values))
    }

    /// Append a column and return a view of it.
    ///
    /// Fails with [`TableError::Configuration`] if both `values` and `default`
    /// are set or the name is already declared, and with
    /// [`TableError::ShapeMismatch`] if `values` does not have one cell per
    /// row. Rows obtained before the call keep their old width.
    #[tracing::instrument(skip(self, spec), fields(relation = %self.relation))]
    pub fn add_col(&mut self, spec: ColSpec) -> Result<Col<'_>> {
        let cells = match (spec.values, spec.default) {
            (Some(_), Some(_)) => {
                return Err(TableError::Configuration(
                    "either column values or a default may be set, not both".into(),
                ))
            }
            (Some(values), None) => {
                if values.len() != self.row_count {
                    return Err(TableError::ShapeMismatch {
                        what: "column values (one per row)",
                        expected: self.row_count,
                        actual: values.len(),
                    });
                }
                values.into_iter().map(Cell::sanitized).collect()
            }
            (None, Some(default)) => vec![default.sanitized(); self.row_count],
            (None, None) => vec![Cell::Null; self.row_count],
        };

        let column = spec
            .name
            .map(|name| Ident::new(&name))
            .filter(|ident| !ident.is_empty())
            .unwrap_or_else(|| Ident::new(&format!("col_name_{}", self.columns.len() + 1)));
        check_column_name(&column, &self.columns)?;

        self.store.add_column(&self.relation, &column, &cells)?;
        tracing::debug!(column = %column, "Added column");
        self.columns.push(column);
        self.names = column_strings(&self.columns);
        self.refresh()?;

        let position = self.columns.len() - 1;
        Ok(Col::new(self, position))
    }

    /// Look up rows and columns by [`Key`].
    ///
    /// | key | result |
    /// |---|---|
    /// | position | [`Selection::Row`] |
    /// | column name | [`Selection::Col`] |
    /// | [`Slice`] | [`Selection::Rows`] |
    /// | [`NameRange`] | [`Selection::Cols`] |
    /// | tuple | [`Selection::Mixed`], each element resolved on its own |
    pub fn index(&self, key: impl Into<Key>) -> Result<Selection<'_>> {
        self.select(key.into())
    }

    fn select(&self, key: Key) -> Result<Selection<'_>> {
        Ok(match key {
            Key::Pos(i) => Selection::Row(self.row(i)?),
            Key::Name(name) => Selection::Col(self.col(&name)?),
            Key::Rows(slice) => Selection::Rows(
                slice
                    .indices(self.cache.len())?
                    .into_iter()
                    .map(|i| &self.cache[i])
                    .collect(),
            ),
            Key::Cols(range) => {
                let range = NameRange {
                    start: range.start.map(|n| sanitize(&n).into_owned()),
                    stop: range.stop.map(|n| sanitize(&n).into_owned()),
                    step: range.step,
                };
                Selection::Cols(
                    range
                        .indices(&self.names)?
                        .into_iter()
                        .map(|i| Col::new(self, i))
                        .collect(),
                )
            }
            Key::Tuple(keys) => {
                let mut items = Vec::new();
                for key in keys {
                    items.extend(self.select(key)?.into_items());
                }
                Selection::Mixed(items)
            }
        })
    }

    /// Attribute-style lookup: `_<n>` selects row `n`, a declared column name
    /// selects that column.
    pub fn attr(&self, name: &str) -> Result<Selection<'_>> {
        if let Some(index) = numeric_attr(name) {
            return self.select(Key::Pos(index));
        }
        match self.col(name) {
            Ok(col) => Ok(Selection::Col(col)),
            Err(_) => Err(TableError::Attribute(name.to_string())),
        }
    }

    /// Row by position; negative positions count from the end.
    pub fn row(&self, index: isize) -> Result<&Row> {
        Ok(&self.cache[resolve_pos(index, self.cache.len())?])
    }

    /// Column by name.
    pub fn col(&self, name: &str) -> Result<Col<'_>> {
        let wanted = sanitize(name);
        self.names
            .iter()
            .position(|n| *n == wanted)
            .map(|i| Col::new(self, i))
            .ok_or_else(|| TableError::Key(name.to_string()))
    }

    /// Rows in cache order. Call again to restart.
    pub fn rows(&self) -> std::slice::Iter<'_, Row> {
        self.cache.iter()
    }

    pub(crate) fn rows_slice(&self) -> &[Row] {
        &self.cache
    }

    /// Columns in declaration order. Call again to restart.
    pub fn cols(&self) -> impl Iterator<Item = Col<'_>> + '_ {
        (0..self.columns.len()).map(move |i| Col::new(self, i))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Declared column names, sanitized, in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Name of the backing relation.
    pub fn relation(&self) -> &str {
        self.relation.as_str()
    }

    pub fn default_fill(&self) -> &Cell {
        &self.default_fill
    }

    pub fn storage(&self) -> &StorageMode {
        self.store.mode()
    }

    /// Pull every row from the relation into the cache.
    fn refresh(&mut self) -> Result<()> {
        let rows = self.store.fetch_all(&self.relation, &self.columns)?;
        if rows.len() != self.row_count {
            return Err(TableError::ShapeMismatch {
                what: "rows in the backing relation",
                expected: self.row_count,
                actual: rows.len(),
            });
        }
        self.cache = rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&self.names), values))
            .collect::<Result<_>>()?;
        tracing::trace!(rows = self.cache.len(), "Refreshed cache");
        Ok(())
    }
}

/// Sanitize and auto-name the declared columns.
fn declare_columns<I, S>(column_names: I) -> Result<Vec<Ident>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let columns: Vec<Ident> = column_names
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let ident = Ident::new(raw.as_ref());
            if ident.is_empty() {
                Ident::new(&format!("no_name_{idx}"))
            } else {
                ident
            }
        })
        .collect();

    if columns.is_empty() {
        return Err(TableError::Configuration(
            "at least one column name is required to create a table".into(),
        ));
    }
    for (idx, column) in columns.iter().enumerate() {
        check_column_name(column, &columns[..idx])?;
    }
    Ok(columns)
}

/// Names SQLite resolves to the implicit row id; a column by one of these
/// names would hide it from row addressing and ordering.
const RESERVED_COLUMNS: [&str; 3] = ["rowid", "oid", "_rowid_"];

/// Reject row-id aliases and names already in `existing`.
///
/// SQLite folds ASCII case in identifiers, so both checks do too.
fn check_column_name(column: &Ident, existing: &[Ident]) -> Result<()> {
    let name = column.as_str();
    if RESERVED_COLUMNS.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return Err(TableError::Configuration(format!(
            "column name `{name}` is reserved for the row id"
        )));
    }
    if existing.iter().any(|c| c.as_str().eq_ignore_ascii_case(name)) {
        return Err(TableError::Configuration(format!(
            "column `{name}` is declared more than once"
        )));
    }
    Ok(())
}

fn column_strings(columns: &[Ident]) -> Arc<[String]> {
    columns.iter().map(|c| c.as_str().to_string()).collect()
}

impl Drop for Table {
    fn drop(&mut self) {
        match self.store.drop_relation(&self.relation) {
            Ok(()) => tracing::info!(relation = %self.relation, "Dropped table"),
            Err(err) => tracing::warn!(
                relation = %self.relation,
                error = %err,
                "Failed to drop backing relation"
            ),
        }
        self.registry.release(self.relation.as_str());
        if let Err(err) = self.store.close() {
            tracing::warn!(
                relation = %self.relation,
                error = %err,
                "Failed to close backing store"
            );
        }
    }
}

impl Index<usize> for Table {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.cache[index]
    }
}

impl<'t> IntoIterator for &'t Table {
    type Item = &'t Row;
    type IntoIter = std::slice::Iter<'t, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.cache.iter()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("relation", &self.relation.as_str())
            .field("columns", &self.names)
            .field("rows", &self.row_count)
            .field("storage", self.store.mode())
            .finish()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<Table {} [", self.relation)?;
        for row in &self.cache {
            writeln!(f, "  {row}")?;
        }
        f.write_str("]>")
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.cache.len()))?;
        for row in &self.cache {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<RelationRegistry> {
        Arc::new(RelationRegistry::new())
    }

    fn table(columns: &[&str], fill: &str, rows: usize) -> Table {
        let options = TableOptions::default()
            .fill(fill)
            .rows(rows)
            .registry(registry());
        Table::new(columns, options).unwrap()
    }

    fn assert_shape(table: &Table) {
        assert_eq!(table.len(), table.rows().count());
        assert_eq!(table.store.count_rows(&table.relation).unwrap(), table.len());
        for row in table.rows() {
            assert_eq!(row.len(), table.column_count());
        }
    }

    #[test]
    fn test_new_prepopulates_fill() {
        let t = table(&["a", "b"], "x", 2);

        assert_eq!(t.len(), 2);
        assert_eq!(t.column_names(), ["a", "b"]);
        assert_eq!(t.row(0).unwrap().values(), [Cell::from("x"), Cell::from("x")]);
        assert_eq!(t.default_fill(), &Cell::from("x"));
        assert_shape(&t);
    }

    #[test]
    fn test_new_auto_names_and_sanitizes() {
        let t = table(&["", "we'ird", "`;"], "x", 0);
        assert_eq!(t.column_names(), ["no_name_0", "weird", "no_name_2"]);
    }

    #[test]
    fn test_new_rejects_empty_and_duplicate_columns() {
        let reg = registry();
        let empty: [&str; 0] = [];
        let err = Table::new(empty, TableOptions::default().registry(Arc::clone(&reg)));
        assert!(matches!(err, Err(TableError::Configuration(_))));

        let err = Table::new(["a", "a'"], TableOptions::default().registry(Arc::clone(&reg)));
        assert!(matches!(err, Err(TableError::Configuration(_))));

        assert!(reg.is_empty());
    }

    #[test]
    fn test_default_fill_is_sanitized_once() {
        let t = table(&["a"], "it's;", 1);
        assert_eq!(t.default_fill(), &Cell::from("its"));
        assert_eq!(t[0][0], Cell::from("its"));
    }

    #[test]
    fn test_null_fill() {
        let t = Table::new(["a"], TableOptions::default().rows(1).registry(registry())).unwrap();
        assert!(t[0][0].is_null());
    }

    #[test]
    fn test_add_row_variants() {
        let mut t = table(&["a", "b"], "x", 0);

        let row = t.push_row(["p", "q"]).unwrap();
        assert_eq!(row.values(), [Cell::from("p"), Cell::from("q")]);

        t.add_row(RowSpec::filled("d")).unwrap();
        t.add_row(RowSpec::nulls()).unwrap();

        assert_eq!(t.len(), 3);
        assert_eq!(t[1].values(), [Cell::from("d"), Cell::from("d")]);
        assert!(t[2].iter().all(Cell::is_null));
        assert_shape(&t);
    }

    #[test]
    fn test_add_row_errors_leave_table_untouched() {
        let mut t = table(&["a", "b"], "x", 1);

        let err = t.add_row(RowSpec::values(["only"])).unwrap_err();
        assert!(matches!(
            err,
            TableError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));

        let err = t.add_row(RowSpec::values(["p", "q"]).with_default("z")).unwrap_err();
        assert!(matches!(err, TableError::Configuration(_)));

        assert_eq!(t.len(), 1);
        assert_shape(&t);
    }

    #[test]
    fn test_add_col_variants() {
        let mut t = table(&["a"], "x", 2);

        let col = t.add_col(ColSpec::values(["1", "2"])).unwrap();
        assert_eq!(col.name(), "col_name_2");
        assert_eq!(col.to_vec(), vec![Cell::from("1"), Cell::from("2")]);

        t.add_col(ColSpec::named("c").with_default("z")).unwrap();
        t.add_col(ColSpec::named("d")).unwrap();

        assert_eq!(t.column_names(), ["a", "col_name_2", "c", "d"]);
        assert_eq!(
            t[1].values(),
            [Cell::from("x"), Cell::from("2"), Cell::from("z"), Cell::Null]
        );
        assert_shape(&t);
    }

    #[test]
    fn test_add_col_errors() {
        let mut t = table(&["a"], "x", 2);

        assert!(matches!(
            t.add_col(ColSpec::values(["1"])),
            Err(TableError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            t.add_col(ColSpec::values(["1", "2"]).with_default("z")),
            Err(TableError::Configuration(_))
        ));
        assert!(matches!(
            t.add_col(ColSpec::named("a")),
            Err(TableError::Configuration(_))
        ));
        assert_eq!(t.column_count(), 1);
        assert_shape(&t);
    }

    #[test]
    fn test_add_col_on_empty_table() {
        let mut t = table(&["a"], "x", 0);
        t.add_col(ColSpec::named("b")).unwrap();
        t.push_row(["p", "q"]).unwrap();
        assert_eq!(t.col("b").unwrap().to_vec(), vec![Cell::from("q")]);
    }

    #[test]
    fn test_new_rejects_row_id_aliases() {
        let reg = registry();
        for name in ["rowid", "OID", "_RowId_"] {
            let err = Table::new(["a", name], TableOptions::default().registry(Arc::clone(&reg)));
            assert!(matches!(err, Err(TableError::Configuration(_))), "{name}");
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn test_add_col_rejects_row_id_aliases() {
        let mut t = table(&["a"], "x", 2);
        for name in ["rowid", "Oid", "_ROWID_"] {
            assert!(matches!(
                t.add_col(ColSpec::named(name).with_values(["1", "2"])),
                Err(TableError::Configuration(_))
            ));
        }
        assert_eq!(t.column_count(), 1);

        let col = t.add_col(ColSpec::named("v").with_values(["1", "2"])).unwrap();
        assert_eq!(col.to_vec(), vec![Cell::from("1"), Cell::from("2")]);
        assert_shape(&t);
    }

    #[test]
    fn test_column_names_compare_case_insensitively() {
        let reg = registry();
        let err = Table::new(["a", "A"], TableOptions::default().registry(Arc::clone(&reg)));
        assert!(matches!(err, Err(TableError::Configuration(_))));
        assert!(reg.is_empty());

        let mut t = table(&["name"], "x", 1);
        assert!(matches!(
            t.add_col(ColSpec::named("NAME")),
            Err(TableError::Configuration(_))
        ));
        assert_eq!(t.column_names(), ["name"]);
        assert_shape(&t);
    }

    #[test]
    fn test_drop_releases_relation() {
        let reg = registry();
        let t = Table::new(["a"], TableOptions::default().registry(Arc::clone(&reg))).unwrap();
        let relation = t.relation().to_string();
        assert!(reg.contains(&relation));

        drop(t);
        assert!(!reg.contains(&relation));
    }

    #[test]
    fn test_drop_after_store_closed() {
        let mut t = table(&["a"], "x", 1);
        t.store.close().unwrap();
        assert!(t.store.is_closed());
        // Teardown on a closed store only logs.
        drop(t);
    }

    #[test]
    fn test_display() {
        let t = table(&["a"], "x", 1);
        let text = t.to_string();
        assert!(text.starts_with(&format!("<Table {} [", t.relation())));
        assert!(text.contains(r#"<Row {a: "x"}>"#));
    }

    #[test]
    fn test_col_view() {
        let mut t = table(&["a", "b"], "x", 1);
        t.push_row(["p", "q"]).unwrap();

        let col = t.col("b").unwrap();
        assert_eq!(col.len(), 2);
        assert_eq!(col.position(), 1);
        assert_eq!(col.get(-1).unwrap(), &Cell::from("q"));
        assert_eq!(col.attr("_0").unwrap(), &Cell::from("x"));
        assert!(matches!(col.attr("b"), Err(TableError::Attribute(_))));
        assert_eq!(col.slice(Slice::from(1..)).unwrap(), vec![&Cell::from("q")]);
        assert_eq!(col.to_string(), r#"<Col b ["x", "q"]>"#);
        assert_eq!(serde_json::to_string(&col).unwrap(), r#"["x","q"]"#);
        assert_eq!(col, t.col("b").unwrap());
        assert_ne!(col, t.col("a").unwrap());
    }
}
