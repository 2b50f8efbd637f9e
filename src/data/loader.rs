use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexSet;
use serde_json::Value as JsonValue;

use super::model::{Cell, Dataset, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row followed by records; every non-empty field is kept
///   as [`Cell::Raw`] so column types are inferred later
/// * `.json` – `[{ "col": value, ... }, ...]` (records orientation)
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json(&text)?
        }
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.headers,
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV text with a header row. Empty fields become [`Cell::Null`];
/// short records simply lack the trailing keys.
pub fn load_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut seen = IndexSet::with_capacity(headers.len());
    for h in &headers {
        if !seen.insert(h.as_str()) {
            bail!("CSV header '{h}' appears more than once");
        }
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), guess_cell(value)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

fn guess_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Null
    } else {
        Cell::raw(s)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "date": "2024-01-01", "city": "NYC", "sales": 12.5 },
///   { "date": "2024-01-02", "city": null,  "sales": 9 }
/// ]
/// ```
///
/// Headers are the union of all keys in first-seen order.
pub fn load_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: IndexSet<String> = IndexSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Row::new();
        for (key, val) in obj {
            headers.insert(key.clone());
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Dataset::new(headers.into_iter().collect(), rows))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map_or_else(|| Cell::Text(n.to_string()), Cell::Number),
        JsonValue::Bool(b) => Cell::Text(b.to_string()),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_csv_keeps_raw_text() {
        let data = "name,city,age\nAlice,\"New York, NY\",30\nBob,,41\n";
        let ds = load_csv(data.as_bytes()).unwrap();
        assert_eq!(ds.headers, vec!["name", "city", "age"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(0, "city"), Some(&Cell::raw("New York, NY")));
        assert_eq!(ds.cell(1, "city"), Some(&Cell::Null));
        assert_eq!(ds.cell(1, "age").and_then(Cell::as_number), Some(41.0));
    }

    #[test]
    fn test_load_csv_short_record() {
        let data = "a,b,c\n1,2\n";
        let ds = load_csv(data.as_bytes()).unwrap();
        assert_eq!(ds.cell(0, "b"), Some(&Cell::raw("2")));
        assert_eq!(ds.cell(0, "c"), None);
    }

    #[test]
    fn test_load_csv_rejects_duplicate_headers() {
        assert!(load_csv("a,a\n1,2\n".as_bytes()).is_err());
    }

    #[test]
    fn test_load_json_records() {
        let ds = load_json(r#"[{"city": "NYC", "sales": 3}, {"city": null, "extra": true}]"#)
            .unwrap();
        assert_eq!(ds.headers, vec!["city", "sales", "extra"]);
        assert_eq!(ds.cell(0, "sales"), Some(&Cell::Number(3.0)));
        assert_eq!(ds.cell(1, "city"), Some(&Cell::Null));
        assert_eq!(ds.cell(1, "extra"), Some(&Cell::from("true")));
        assert!(ds.validate().is_ok());
    }

    #[test]
    fn test_load_json_keeps_key_order() {
        let ds = load_json(r#"[{"zeta": 1, "name": "a", "alpha": 2}, {"beta": 3, "zeta": 4}]"#)
            .unwrap();
        assert_eq!(ds.headers, vec!["zeta", "name", "alpha", "beta"]);
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        assert!(load_json(r#"{"a": 1}"#).is_err());
    }
}
