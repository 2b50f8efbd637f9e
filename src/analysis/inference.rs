use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::data::model::{Cell, Dataset};

// ---------------------------------------------------------------------------
// Column kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Temporal,
    Categorical,
}

/// Inferred semantics of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column: String,
    pub kind: ColumnKind,
    /// Share of sampled values supporting `kind`, in `[0, 1]`.
    pub confidence: f64,
    /// Share of sampled values that parse as instants.
    pub temporal_score: f64,
    /// Non-blank values seen in the sample.
    pub samples: usize,
}

/// Profiles for every header of a dataset, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub columns: Vec<ColumnProfile>,
    /// Best temporal column, if any qualified.
    pub temporal_column: Option<String>,
}

impl DatasetProfile {
    pub fn get(&self, column: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|p| p.column == column)
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.get(column).map(|p| p.kind)
    }

    /// Columns of the given kind, in header order.
    pub fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.column.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

fn is_blank(cell: &Cell) -> bool {
    match cell {
        Cell::Null => true,
        Cell::Text(s) | Cell::Raw(s) => s.trim().is_empty(),
        Cell::Number(_) => false,
    }
}

/// Classify a single column from the first `inference_sample_rows` rows.
///
/// Temporal wins when strictly more than `temporal_threshold` of the
/// non-blank samples parse as instants; otherwise the column is numeric
/// when every non-blank sample parses as a finite number. Anything else,
/// including a column with no samples, is categorical.
pub fn profile_column(dataset: &Dataset, column: &str, config: &AnalysisConfig) -> ColumnProfile {
    let mut seen = 0usize;
    let mut instants = 0usize;
    let mut numbers = 0usize;

    for row in dataset.rows.iter().take(config.inference_sample_rows) {
        let Some(cell) = row.get(column) else {
            continue;
        };
        if is_blank(cell) {
            continue;
        }
        seen += 1;
        if cell.as_instant().is_some() {
            instants += 1;
        }
        if cell.as_number().is_some() {
            numbers += 1;
        }
    }

    if seen == 0 {
        return ColumnProfile {
            column: column.to_string(),
            kind: ColumnKind::Categorical,
            confidence: 0.0,
            temporal_score: 0.0,
            samples: 0,
        };
    }

    let temporal_score = instants as f64 / seen as f64;
    let numeric_share = numbers as f64 / seen as f64;
    let (kind, confidence) = if temporal_score > config.temporal_threshold {
        (ColumnKind::Temporal, temporal_score)
    } else if numbers == seen {
        (ColumnKind::Numeric, 1.0)
    } else {
        (ColumnKind::Categorical, 1.0 - temporal_score.max(numeric_share))
    };

    ColumnProfile {
        column: column.to_string(),
        kind,
        confidence,
        temporal_score,
        samples: seen,
    }
}

/// Highest-scoring temporal column; ties go to the earlier header.
pub fn detect_time_column(columns: &[ColumnProfile]) -> Option<&str> {
    let mut best: Option<&ColumnProfile> = None;
    for p in columns.iter().filter(|p| p.kind == ColumnKind::Temporal) {
        if best.map_or(true, |b| p.temporal_score > b.temporal_score) {
            best = Some(p);
        }
    }
    best.map(|p| p.column.as_str())
}

/// Profile every header of `dataset` with the default configuration.
pub fn infer_profiles(dataset: &Dataset) -> DatasetProfile {
    infer_profiles_with(dataset, &AnalysisConfig::default())
}

pub fn infer_profiles_with(dataset: &Dataset, config: &AnalysisConfig) -> DatasetProfile {
    let columns: Vec<ColumnProfile> = dataset
        .headers
        .iter()
        .map(|h| profile_column(dataset, h, config))
        .collect();
    let temporal_column = detect_time_column(&columns).map(str::to_string);
    log::debug!(
        "profiled {} columns, temporal column: {:?}",
        columns.len(),
        temporal_column
    );
    DatasetProfile {
        columns,
        temporal_column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn dataset(headers: &[&str], rows: Vec<Vec<Cell>>) -> Dataset {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|cells| headers.iter().cloned().zip(cells).collect::<Row>())
            .collect();
        Dataset::new(headers, rows)
    }

    #[test]
    fn test_classifies_three_kinds() {
        let ds = dataset(
            &["when", "amount", "city"],
            vec![
                vec![Cell::raw("2024-01-01"), Cell::raw("10"), Cell::raw("NYC")],
                vec![Cell::raw("2024-01-02"), Cell::Number(2.5), Cell::raw("LA")],
                vec![Cell::raw("2024-01-03"), Cell::Null, Cell::raw("SF")],
            ],
        );
        let profile = infer_profiles(&ds);
        assert_eq!(profile.kind_of("when"), Some(ColumnKind::Temporal));
        assert_eq!(profile.kind_of("amount"), Some(ColumnKind::Numeric));
        assert_eq!(profile.kind_of("city"), Some(ColumnKind::Categorical));
        assert_eq!(profile.temporal_column.as_deref(), Some("when"));
        assert_eq!(profile.get("amount").unwrap().samples, 2);
    }

    #[test]
    fn test_threshold_is_strict() {
        // 4 of 5 parse: 0.8 is not > 0.8.
        let cells = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "soon"];
        let ds = dataset(&["d"], cells.iter().map(|c| vec![Cell::raw(*c)]).collect());
        let p = profile_column(&ds, "d", &AnalysisConfig::default());
        assert_eq!(p.kind, ColumnKind::Categorical);
        assert!((p.temporal_score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_numeric_is_categorical() {
        let ds = dataset(&["v"], vec![vec![Cell::raw("1")], vec![Cell::raw("two")]]);
        let p = profile_column(&ds, "v", &AnalysisConfig::default());
        assert_eq!(p.kind, ColumnKind::Categorical);
        assert!((p.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_column_is_categorical_with_zero_confidence() {
        let ds = dataset(&["e"], vec![vec![Cell::Null], vec![Cell::raw("  ")]]);
        let p = profile_column(&ds, "e", &AnalysisConfig::default());
        assert_eq!(p.kind, ColumnKind::Categorical);
        assert_eq!(p.confidence, 0.0);
        assert!(infer_profiles(&ds).temporal_column.is_none());
    }

    #[test]
    fn test_only_head_rows_are_sampled() {
        let mut rows: Vec<Vec<Cell>> = (0..100).map(|i| vec![Cell::Number(i as f64)]).collect();
        rows.push(vec![Cell::raw("not a number")]);
        let ds = dataset(&["n"], rows);
        assert_eq!(infer_profiles(&ds).kind_of("n"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn test_time_column_ties_go_to_first_header() {
        let ds = dataset(
            &["a", "b"],
            vec![
                vec![Cell::raw("2024-01-01"), Cell::raw("2024-02-01")],
                vec![Cell::raw("2024-01-02"), Cell::raw("2024-02-02")],
            ],
        );
        assert_eq!(infer_profiles(&ds).temporal_column.as_deref(), Some("a"));
    }

    #[test]
    fn test_best_time_column_wins() {
        let mut rows = Vec::new();
        for i in 0..10 {
            let b = if i == 0 { Cell::raw("n/a") } else { Cell::raw("2024-03-01") };
            rows.push(vec![b, Cell::raw("2024-01-01")]);
        }
        let ds = dataset(&["b", "a"], rows);
        assert_eq!(infer_profiles(&ds).temporal_column.as_deref(), Some("a"));
    }
}
