//! Arguments of [`Table::add_row`](crate::Table::add_row) and
//! [`Table::add_col`](crate::Table::add_col).

use crate::value::Cell;

/// Contents of a new row.
///
/// At most one of `values` and `default` may be set. With neither, every
/// cell is NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSpec {
    /// One value per column, in column order.
    pub values: Option<Vec<Cell>>,
    /// Value of every cell.
    pub default: Option<Cell>,
}

impl RowSpec {
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Cell>,
    {
        Self {
            values: Some(values.into_iter().map(Into::into).collect()),
            default: None,
        }
    }

    pub fn filled(default: impl Into<Cell>) -> Self {
        Self {
            values: None,
            default: Some(default.into()),
        }
    }

    /// A row of NULLs.
    pub fn nulls() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Cell>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Contents and name of a new column.
///
/// At most one of `values` and `default` may be set. With neither, every
/// cell is NULL. Without a name the column is called `col_name_<n + 1>`,
/// `n` being the current column count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColSpec {
    /// One value per existing row, in row order.
    pub values: Option<Vec<Cell>>,
    pub name: Option<String>,
    /// Value of the column in every existing row.
    pub default: Option<Cell>,
}

impl ColSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Cell>,
    {
        Self::default().with_values(values)
    }

    #[must_use]
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Cell>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Cell>) -> Self {
        self.default = Some(default.into());
        self
    }
}
