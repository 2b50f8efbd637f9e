use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::model::{Cell, Dataset, Row};

pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// A CSV blob ready to hand to a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    /// `data-export-YYYY-MM-DD.csv`
    pub filename: String,
    pub mime: String,
    pub content: String,
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("data-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Encode one field. Null is empty; text containing a comma is quoted with
/// inner quotes doubled; everything else is written as-is.
pub fn encode_field(cell: Option<&Cell>) -> String {
    match cell {
        None | Some(Cell::Null) => String::new(),
        Some(Cell::Number(v)) => v.to_string(),
        Some(Cell::Text(s) | Cell::Raw(s)) => {
            if s.contains(',') {
                format!("\"{}\"", s.replace('"', "\"\""))
            } else {
                s.clone()
            }
        }
    }
}

/// Header line followed by one line per row, joined with `\n` and no
/// trailing newline.
pub fn encode_csv<'a>(headers: &[String], rows: impl IntoIterator<Item = &'a Row>) -> String {
    let mut lines = vec![headers.join(",")];
    for row in rows {
        let fields: Vec<String> = headers.iter().map(|h| encode_field(row.get(h))).collect();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Export the rows at `indices`. Nothing is produced for an empty selection.
pub fn export_rows(dataset: &Dataset, indices: &[usize], date: NaiveDate) -> Option<CsvExport> {
    if indices.is_empty() {
        log::warn!("export skipped: no rows match the current filter");
        return None;
    }
    let rows = indices.iter().filter_map(|&i| dataset.rows.get(i));
    let content = encode_csv(&dataset.headers, rows);
    log::info!("exported {} rows", indices.len());
    Some(CsvExport {
        filename: export_filename(date),
        mime: CSV_MIME.to_string(),
        content,
    })
}
