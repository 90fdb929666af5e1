//! Input sanitization for everything interpolated into SQL text.
//!
//! Strings lose every character in a fixed denylist (single quote, double
//! quote, semicolon, backtick). This is a filter, not an escaping scheme: it
//! does not make arbitrary adversarial input safe on its own. The storage layer
//! additionally binds cell values as statement parameters; identifiers and the
//! `DEFAULT` literal cannot be bound and rely on this filter alone.

use std::borrow::Cow;
use std::fmt;

use crate::value::Cell;

/// Characters stripped from every string bound for a statement.
pub const DENYLIST: [char; 4] = ['\'', '"', ';', '`'];

/// Strip denylisted characters from `input`.
///
/// Borrows when there is nothing to strip.
pub fn sanitize(input: &str) -> Cow<'_, str> {
    if input.contains(DENYLIST) {
        Cow::Owned(input.chars().filter(|c| !DENYLIST.contains(c)).collect())
    } else {
        Cow::Borrowed(input)
    }
}

/// A sanitized SQL identifier (relation or column name).
///
/// The only way to build one is through [`Ident::new`], so an identifier is
/// sanitized exactly once before it reaches a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn new(raw: &str) -> Self {
        Self(sanitize(raw).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Backtick-quoted form for statement text.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Cell {
    /// Sanitize text cells; integers and nulls pass through unchanged.
    #[must_use]
    pub fn sanitized(self) -> Self {
        match self {
            Cell::Text(s) => {
                let clean = match sanitize(&s) {
                    Cow::Owned(clean) => Some(clean),
                    Cow::Borrowed(_) => None,
                };
                Cell::Text(clean.unwrap_or(s))
            }
            other => other,
        }
    }

    /// Render as a SQL literal for contexts that cannot take a bound parameter.
    ///
    /// Text is expected to be sanitized already; it is sanitized again here so
    /// the rendered literal can never close its own quotes.
    pub fn to_literal(&self) -> String {
        match self {
            Cell::Null => "NULL".to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Text(s) => format!("'{}'", sanitize(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_denylist() {
        let out = sanitize(r#"Robert'); DROP TABLE `students`; --""#);
        assert_eq!(out, "Robert) DROP TABLE students --");
        assert!(!out.contains(DENYLIST));
    }

    #[test]
    fn test_sanitize_borrows_clean_input() {
        assert!(matches!(sanitize("plain_name"), Cow::Borrowed("plain_name")));
    }

    #[test]
    fn test_cell_sanitize_leaves_integers() {
        assert_eq!(Cell::Int(-7).sanitized(), Cell::Int(-7));
        assert_eq!(Cell::Null.sanitized(), Cell::Null);
        assert_eq!(Cell::from("a;b").sanitized(), Cell::from("ab"));
    }

    #[test]
    fn test_ident_quoting() {
        let ident = Ident::new("we`ird");
        assert_eq!(ident.as_str(), "weird");
        assert_eq!(ident.quoted(), "`weird`");
    }

    #[test]
    fn test_literals() {
        assert_eq!(Cell::Null.to_literal(), "NULL");
        assert_eq!(Cell::Int(3).to_literal(), "3");
        assert_eq!(Cell::from("it's").to_literal(), "'its'");
    }
}
