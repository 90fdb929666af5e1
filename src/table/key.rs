//! Index keys and selections for generalized table indexing.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use super::col::Col;
use super::row::Row;
use crate::error::{Result, TableError};

/// A half-open `start:stop:step` slice over positions.
///
/// Bounds follow the usual negative-index convention: `-1` is the last
/// position, and out-of-range bounds are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl Slice {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// Every position.
    pub fn full() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolve against a sequence of `len` items into the selected positions.
    pub fn indices(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(TableError::InvalidSlice("slice step cannot be zero"));
        }
        let len = isize::try_from(len).map_err(|_| TableError::InvalidSlice("length overflow"))?;

        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            // `i` stays within [0, len) by construction of the clamps.
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(out)
    }
}

fn to_isize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl From<Range<usize>> for Slice {
    fn from(r: Range<usize>) -> Self {
        Self::new(Some(to_isize(r.start)), Some(to_isize(r.end)), None)
    }
}

impl From<RangeInclusive<usize>> for Slice {
    fn from(r: RangeInclusive<usize>) -> Self {
        Self::new(
            Some(to_isize(*r.start())),
            Some(to_isize(*r.end()).saturating_add(1)),
            None,
        )
    }
}

impl From<RangeFrom<usize>> for Slice {
    fn from(r: RangeFrom<usize>) -> Self {
        Self::new(Some(to_isize(r.start)), None, None)
    }
}

impl From<RangeTo<usize>> for Slice {
    fn from(r: RangeTo<usize>) -> Self {
        Self::new(None, Some(to_isize(r.end)), None)
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

/// A `nameA:nameB:step` slice over columns.
///
/// Both names resolve to column positions before slicing. A missing start is
/// the first column, a missing stop is one past the last; the stop column is
/// excluded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameRange {
    pub start: Option<String>,
    pub stop: Option<String>,
    pub step: Option<isize>,
}

impl NameRange {
    pub fn new(start: Option<&str>, stop: Option<&str>, step: Option<isize>) -> Self {
        Self {
            start: start.map(str::to_string),
            stop: stop.map(str::to_string),
            step,
        }
    }

    /// From `start` up to, not including, `stop`.
    pub fn between(start: &str, stop: &str) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    /// Resolve the names against `columns`, then slice positionally.
    pub fn indices(&self, columns: &[String]) -> Result<Vec<usize>> {
        let position = |name: &Option<String>| -> Result<Option<isize>> {
            name.as_deref()
                .map(|n| {
                    columns
                        .iter()
                        .position(|c| c == n)
                        .map(to_isize)
                        .ok_or_else(|| TableError::Key(n.to_string()))
                })
                .transpose()
        };
        Slice::new(position(&self.start)?, position(&self.stop)?, self.step).indices(columns.len())
    }
}

/// A key for [`Table::index`](crate::Table::index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// One row by position; negative counts from the end.
    Pos(isize),
    /// One column by name.
    Name(String),
    /// Rows by position slice.
    Rows(Slice),
    /// Columns by name range.
    Cols(NameRange),
    /// Each element resolved on its own, results concatenated in order.
    Tuple(Vec<Key>),
}

impl Key {
    pub fn tuple<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Key::Tuple(keys.into_iter().map(Into::into).collect())
    }
}

impl From<isize> for Key {
    fn from(i: isize) -> Self {
        Key::Pos(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Pos(i as isize)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Pos(to_isize(i))
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<Slice> for Key {
    fn from(slice: Slice) -> Self {
        Key::Rows(slice)
    }
}

impl From<Range<usize>> for Key {
    fn from(r: Range<usize>) -> Self {
        Key::Rows(r.into())
    }
}

impl From<RangeFull> for Key {
    fn from(r: RangeFull) -> Self {
        Key::Rows(r.into())
    }
}

impl From<NameRange> for Key {
    fn from(range: NameRange) -> Self {
        Key::Cols(range)
    }
}

impl From<Vec<Key>> for Key {
    fn from(keys: Vec<Key>) -> Self {
        Key::Tuple(keys)
    }
}

/// One element of a mixed selection.
#[derive(Debug, Clone)]
pub enum Item<'t> {
    Row(&'t Row),
    Col(Col<'t>),
}

impl<'t> Item<'t> {
    pub fn as_row(&self) -> Option<&'t Row> {
        match self {
            Item::Row(row) => Some(*row),
            Item::Col(_) => None,
        }
    }

    pub fn as_col(&self) -> Option<&Col<'t>> {
        match self {
            Item::Col(col) => Some(col),
            Item::Row(_) => None,
        }
    }
}

/// Result of [`Table::index`](crate::Table::index), shaped by the key.
#[derive(Debug, Clone)]
pub enum Selection<'t> {
    Row(&'t Row),
    Col(Col<'t>),
    Rows(Vec<&'t Row>),
    Cols(Vec<Col<'t>>),
    Mixed(Vec<Item<'t>>),
}

impl<'t> Selection<'t> {
    pub fn into_row(self) -> Option<&'t Row> {
        match self {
            Selection::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_col(self) -> Option<Col<'t>> {
        match self {
            Selection::Col(col) => Some(col),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<&'t Row>> {
        match self {
            Selection::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_cols(self) -> Option<Vec<Col<'t>>> {
        match self {
            Selection::Cols(cols) => Some(cols),
            _ => None,
        }
    }

    /// Flatten any selection into its items, in order.
    pub fn into_items(self) -> Vec<Item<'t>> {
        match self {
            Selection::Row(row) => vec![Item::Row(row)],
            Selection::Col(col) => vec![Item::Col(col)],
            Selection::Rows(rows) => rows.into_iter().map(Item::Row).collect(),
            Selection::Cols(cols) => cols.into_iter().map(Item::Col).collect(),
            Selection::Mixed(items) => items,
        }
    }
}

/// Parse `_<digits>` into a position.
pub(crate) fn numeric_attr(name: &str) -> Option<isize> {
    let digits = name.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Resolve a possibly negative position against `len`.
pub(crate) fn resolve_pos(index: isize, len: usize) -> Result<usize> {
    let signed_len = to_isize(len);
    let resolved = if index < 0 { index + signed_len } else { index };
    if (0..signed_len).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(TableError::Index { index, len })
    }
}
