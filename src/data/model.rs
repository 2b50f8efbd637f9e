use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Grid text for null or absent cells.
pub const PLACEHOLDER: &str = "-";

// ---------------------------------------------------------------------------
// Cell – a single loosely-typed value
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. `Raw` holds text whose type has not been
/// resolved yet; it is coerced on demand by [`Cell::as_number`] and
/// [`Cell::as_instant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Raw(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "{PLACEHOLDER}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) | Cell::Raw(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

impl Cell {
    /// Unresolved text, as produced by the CSV loader.
    pub fn raw(s: impl Into<String>) -> Self {
        Cell::Raw(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Whether this cell holds text (resolved or not), as opposed to a number.
    pub fn is_string(&self) -> bool {
        matches!(self, Cell::Text(_) | Cell::Raw(_))
    }

    /// Best-effort numeric value. Only finite numbers qualify.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => v.is_finite().then_some(*v),
            Cell::Text(s) | Cell::Raw(s) => parse_number(s),
            Cell::Null => None,
        }
    }

    /// Best-effort instant. Plain numbers are never treated as instants.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Text(s) | Cell::Raw(s) => parse_instant(s),
            Cell::Number(_) | Cell::Null => None,
        }
    }

    /// Stringified form used for searching and sorting; `None` for null.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Null => None,
            Cell::Number(v) => Some(Cow::Owned(v.to_string())),
            Cell::Text(s) | Cell::Raw(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }
}

/// Render an optional cell for the grid, substituting the placeholder for
/// absent keys.
pub fn display_cell(cell: Option<&Cell>) -> String {
    cell.map_or_else(|| PLACEHOLDER.to_string(), ToString::to_string)
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

pub fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parse a date or date-time string into a UTC instant. Values without an
/// offset are taken as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    // Every supported layout has at least a day, month and year.
    if t.len() < 6 || !t.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(t) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(t, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Row / Dataset
// ---------------------------------------------------------------------------

/// One record: column name → cell. Keys are a subset of the dataset headers.
pub type Row = BTreeMap<String, Cell>;

/// The full in-memory dataset. Read-only once built; every analysis derives
/// new values from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Ordered column names.
    pub headers: Vec<String>,
    /// All rows.
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Dataset { headers, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Cell at `(row, column)`, if the row exists and carries the key.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    /// Check header uniqueness and that every row key is a declared header.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.headers.len());
        for h in &self.headers {
            if !seen.insert(h.as_str()) {
                return Err(DatasetError::DuplicateHeader(h.clone()));
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(key) = row.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(DatasetError::UndeclaredColumn {
                    row: i,
                    column: key.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_number_coercion() {
        assert_eq!(Cell::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Cell::raw(" 42 ").as_number(), Some(42.0));
        assert_eq!(Cell::from("1e3").as_number(), Some(1000.0));
        assert_eq!(Cell::raw("").as_number(), None);
        assert_eq!(Cell::raw("abc").as_number(), None);
        assert_eq!(Cell::raw("NaN").as_number(), None);
        assert_eq!(Cell::Number(f64::NAN).as_number(), None);
        assert_eq!(Cell::Null.as_number(), None);
    }

    #[test]
    fn test_instant_parsing() {
        let dt = parse_instant("2024-03-05").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 5));

        let dt = parse_instant("2024-03-05 14:30:00").unwrap();
        assert_eq!(dt.hour(), 14);

        let dt = parse_instant("2024-03-05T14:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 12);

        assert!(parse_instant("03/15/2023").is_some());
        assert!(parse_instant("Mar 15, 2023").is_some());
        assert!(parse_instant("hello").is_none());
        assert!(parse_instant("42").is_none());
        assert!(Cell::Number(1_700_000_000.0).as_instant().is_none());
    }

    #[test]
    fn test_display_uses_placeholder() {
        assert_eq!(Cell::Null.to_string(), "-");
        assert_eq!(display_cell(None), "-");
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(display_cell(Some(&Cell::from("NYC"))), "NYC");
    }

    #[test]
    fn test_validate() {
        let ok = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![Row::from([("a".to_string(), Cell::from(1.0))])],
        );
        assert_eq!(ok.validate(), Ok(()));

        let dup = Dataset::new(vec!["a".into(), "a".into()], Vec::new());
        assert_eq!(
            dup.validate(),
            Err(DatasetError::DuplicateHeader("a".into()))
        );

        let stray = Dataset::new(
            vec!["a".into()],
            vec![Row::from([("zzz".to_string(), Cell::Null)])],
        );
        assert!(matches!(
            stray.validate(),
            Err(DatasetError::UndeclaredColumn { row: 0, .. })
        ));
    }
}
