use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::data::model::{Cell, Dataset, Row};
use crate::error::AnalysisError;

/// Label for null, missing or blank values.
pub const UNKNOWN_LABEL: &str = "Unknown";
/// Sentinel for a column with nothing to count.
pub const NO_DATA_LABEL: &str = "No Data";
/// Sentinel for a failed aggregation.
pub const ERROR_LABEL: &str = "Error";
/// Bucket collecting every label past the Top-K cut.
pub const OTHER_LABEL: &str = "Other";

const SENTINELS: [&str; 3] = [UNKNOWN_LABEL, ERROR_LABEL, NO_DATA_LABEL];

// ---------------------------------------------------------------------------
// CategoryAggregate
// ---------------------------------------------------------------------------

/// Frequency counts of a categorical column.
///
/// `counts` iterates in display order: descending count, ties in first-seen
/// order. `total_count` is always the sum of `counts`. Labels cut by the
/// `max_categories` cap are not part of `counts`; their number and mass are
/// kept in `dropped_labels` / `dropped_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub counts: IndexMap<String, u64>,
    pub total_count: u64,
    pub dropped_labels: usize,
    pub dropped_count: u64,
}

impl CategoryAggregate {
    fn sentinel(label: &str, count: u64) -> Self {
        CategoryAggregate {
            counts: IndexMap::from([(label.to_string(), count)]),
            total_count: count,
            dropped_labels: 0,
            dropped_count: 0,
        }
    }

    /// `"No Data"` with count 0.
    pub fn no_data() -> Self {
        Self::sentinel(NO_DATA_LABEL, 0)
    }

    /// `"Error"` with count 1.
    pub fn error() -> Self {
        Self::sentinel(ERROR_LABEL, 1)
    }

    /// Labels in display order.
    pub fn order(&self) -> impl Iterator<Item = &str> + '_ {
        self.counts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Whether this is a lone `"Unknown"`, `"Error"` or `"No Data"` entry.
    pub fn is_sentinel(&self) -> bool {
        self.counts.len() == 1
            && self
                .counts
                .keys()
                .next()
                .is_some_and(|label| SENTINELS.contains(&label.as_str()))
    }

    /// Share of `total_count` per label, in display order, as percentages.
    pub fn percentages(&self) -> Vec<f64> {
        self.counts
            .values()
            .map(|&c| {
                if self.total_count == 0 {
                    0.0
                } else {
                    c as f64 / self.total_count as f64 * 100.0
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Streaming accumulator
// ---------------------------------------------------------------------------

/// Normalize a cell into its category label.
pub fn normalize_label(cell: &Cell) -> String {
    match cell {
        Cell::Null => UNKNOWN_LABEL.to_string(),
        Cell::Number(v) => v.to_string(),
        Cell::Text(s) | Cell::Raw(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                UNKNOWN_LABEL.to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Incremental label counter. Memory grows with the number of distinct
/// labels, never with the number of rows fed in.
#[derive(Debug, Clone, Default)]
pub struct CategoryAccumulator {
    counts: IndexMap<String, u64>,
    rows_seen: usize,
}

impl CategoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one row. Rows without the key are skipped entirely; a present
    /// null counts as `"Unknown"`.
    pub fn push(&mut self, cell: Option<&Cell>) {
        self.rows_seen += 1;
        if let Some(cell) = cell {
            *self.counts.entry(normalize_label(cell)).or_insert(0) += 1;
        }
    }

    pub fn push_rows(&mut self, rows: &[Row], column: &str) {
        for row in rows {
            self.push(row.get(column));
        }
    }

    /// Fold another accumulator in. Its labels not yet seen here keep their
    /// relative order after ours.
    pub fn merge(&mut self, other: CategoryAccumulator) {
        self.rows_seen += other.rows_seen;
        for (label, count) in other.counts {
            *self.counts.entry(label).or_insert(0) += count;
        }
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Aggregate of everything pushed so far.
    pub fn snapshot(&self, max_categories: usize) -> CategoryAggregate {
        self.clone().finish(max_categories)
    }

    /// Sort, cap at `max_categories`, and build the aggregate.
    pub fn finish(self, max_categories: usize) -> CategoryAggregate {
        if self.counts.is_empty() {
            return CategoryAggregate::no_data();
        }
        let mut entries: Vec<(String, u64)> = self.counts.into_iter().collect();
        // Stable: equal counts keep first-seen order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        let keep = max_categories.max(1).min(entries.len());
        let dropped = entries.split_off(keep);
        let dropped_count: u64 = dropped.iter().map(|(_, c)| c).sum();
        let counts: IndexMap<String, u64> = entries.into_iter().collect();
        let total_count: u64 = counts.values().sum();

        CategoryAggregate {
            counts,
            total_count,
            dropped_labels: dropped.len(),
            dropped_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation entry points
// ---------------------------------------------------------------------------

fn try_aggregate(
    dataset: &Dataset,
    column: &str,
    config: &AnalysisConfig,
) -> Result<CategoryAggregate, AnalysisError> {
    dataset.validate()?;
    if !dataset.has_column(column) {
        return Err(AnalysisError::UnknownColumn(column.to_string()));
    }

    let mut acc = CategoryAccumulator::new();
    let total = dataset.len();
    for batch in dataset.rows.chunks(config.category_batch_size.max(1)) {
        acc.push_rows(batch, column);
        log::debug!("'{column}': counted {} of {total} rows", acc.rows_seen());
    }
    Ok(acc.finish(config.max_categories))
}

/// Count the labels of `column` with the default configuration.
pub fn aggregate_categories(dataset: &Dataset, column: &str) -> CategoryAggregate {
    aggregate_categories_with(dataset, column, &AnalysisConfig::default())
}

/// Count the labels of `column`, in batches of `category_batch_size` rows.
///
/// Never fails: an unknown column or one that no row carries yields the
/// `"No Data"` sentinel, and a malformed dataset yields `"Error"`.
pub fn aggregate_categories_with(
    dataset: &Dataset,
    column: &str,
    config: &AnalysisConfig,
) -> CategoryAggregate {
    match try_aggregate(dataset, column, config) {
        Ok(aggregate) => aggregate,
        Err(AnalysisError::UnknownColumn(col)) => {
            log::warn!("category aggregation: unknown column '{col}'");
            CategoryAggregate::no_data()
        }
        Err(e) => {
            log::warn!("category aggregation of '{column}' failed: {e}");
            CategoryAggregate::error()
        }
    }
}

// ---------------------------------------------------------------------------
// Top-K + Other
// ---------------------------------------------------------------------------

/// Display-ready categories with parallel counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAggregate {
    pub categories: Vec<String>,
    pub counts: Vec<u64>,
}

impl DisplayAggregate {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Collapse an aggregate to at most `limit` entries for display.
///
/// * a lone sentinel passes through untouched
/// * `limit` or fewer labels pass through in display order
/// * otherwise the top `limit - 1` labels are kept and the rest merged into
///   `"Other"`, which is left out when it would be zero. A kept data label
///   spelled `"Other"` absorbs the remainder so the name appears once.
pub fn top_k(aggregate: &CategoryAggregate, limit: usize) -> DisplayAggregate {
    if aggregate.is_empty() {
        return DisplayAggregate {
            categories: vec![NO_DATA_LABEL.to_string()],
            counts: vec![0],
        };
    }

    let mut entries: Vec<(&String, u64)> = aggregate.counts.iter().map(|(l, &c)| (l, c)).collect();
    let limit = limit.max(1);

    if aggregate.is_sentinel() || entries.len() <= limit {
        return DisplayAggregate {
            categories: entries.iter().map(|(l, _)| (*l).clone()).collect(),
            counts: entries.iter().map(|(_, c)| *c).collect(),
        };
    }

    // Already ordered when built by the accumulator; this keeps hand-built
    // aggregates correct too.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    let other_sum: u64 = entries[limit - 1..].iter().map(|(_, c)| c).sum();
    entries.truncate(limit - 1);

    let mut categories: Vec<String> = entries.iter().map(|(l, _)| (*l).clone()).collect();
    let mut counts: Vec<u64> = entries.iter().map(|(_, c)| *c).collect();
    if other_sum > 0 {
        match categories.iter().position(|l| l == OTHER_LABEL) {
            Some(i) => counts[i] += other_sum,
            None => {
                categories.push(OTHER_LABEL.to_string());
                counts.push(other_sum);
            }
        }
    }
    DisplayAggregate { categories, counts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_dataset(values: Vec<Option<Cell>>) -> Dataset {
        let rows = values
            .into_iter()
            .map(|v| match v {
                Some(cell) => Row::from([("c".to_string(), cell)]),
                None => Row::new(),
            })
            .collect();
        Dataset::new(vec!["c".into()], rows)
    }

    fn aggregate_of(pairs: &[(&str, u64)]) -> CategoryAggregate {
        let counts: IndexMap<String, u64> =
            pairs.iter().map(|(l, c)| (l.to_string(), *c)).collect();
        let total_count: u64 = counts.values().sum();
        CategoryAggregate {
            counts,
            total_count,
            dropped_labels: 0,
            dropped_count: 0,
        }
    }

    #[test]
    fn test_counts_normalize_and_order() {
        let ds = column_dataset(vec![
            Some(Cell::raw("b")),
            Some(Cell::raw(" a ")),
            Some(Cell::raw("a")),
            Some(Cell::Null),
            Some(Cell::raw("   ")),
            Some(Cell::raw("c")),
            Some(Cell::raw("b")),
            None,
        ]);
        let agg = aggregate_categories(&ds, "c");
        let order: Vec<&str> = agg.order().collect();
        // b and a tie at 2 (b first), Unknown has 2 but was seen after a.
        assert_eq!(order, vec!["b", "a", "Unknown", "c"]);
        assert_eq!(agg.counts["Unknown"], 2);
        assert_eq!(agg.total_count, 7);
        assert_eq!(agg.counts.values().sum::<u64>(), agg.total_count);
    }

    #[test]
    fn test_no_rows_is_no_data() {
        let ds = column_dataset(Vec::new());
        let agg = aggregate_categories(&ds, "c");
        assert_eq!(agg, CategoryAggregate::no_data());
        assert_eq!(agg.total_count, 0);
        assert!(agg.is_sentinel());
    }

    #[test]
    fn test_column_never_present_is_no_data() {
        let ds = column_dataset(vec![None, None]);
        assert_eq!(aggregate_categories(&ds, "c"), CategoryAggregate::no_data());
        assert_eq!(aggregate_categories(&ds, "zzz"), CategoryAggregate::no_data());
    }

    #[test]
    fn test_malformed_dataset_is_error_sentinel() {
        let ds = Dataset::new(
            vec!["c".into()],
            vec![Row::from([("stray".to_string(), Cell::raw("x"))])],
        );
        let agg = aggregate_categories(&ds, "c");
        assert_eq!(agg.order().collect::<Vec<_>>(), vec![ERROR_LABEL]);
        assert_eq!(agg.counts[ERROR_LABEL], 1);
        assert_eq!(agg.total_count, 1);
    }

    #[test]
    fn test_cap_drops_long_tail() {
        let values = (0..150)
            .flat_map(|i| {
                let n = if i < 10 { 3 } else { 1 };
                std::iter::repeat(Some(Cell::raw(format!("label{i}")))).take(n)
            })
            .collect();
        let ds = column_dataset(values);
        let agg = aggregate_categories(&ds, "c");
        assert_eq!(agg.len(), 100);
        assert_eq!(agg.dropped_labels, 50);
        assert_eq!(agg.dropped_count, 50);
        assert_eq!(agg.total_count, 30 + 90);
        assert_eq!(agg.counts.values().sum::<u64>(), agg.total_count);
        assert_eq!(agg.order().next(), Some("label0"));
    }

    #[test]
    fn test_batches_do_not_change_result() {
        let values: Vec<Option<Cell>> = (0..1000)
            .map(|i| Some(Cell::raw(format!("k{}", i % 7))))
            .collect();
        let ds = column_dataset(values);
        let small = AnalysisConfig {
            category_batch_size: 3,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            aggregate_categories_with(&ds, "c", &small),
            aggregate_categories(&ds, "c")
        );
    }

    #[test]
    fn test_merge_and_snapshot() {
        let mut left = CategoryAccumulator::new();
        left.push(Some(&Cell::raw("x")));
        left.push(Some(&Cell::raw("y")));
        let mut right = CategoryAccumulator::new();
        right.push(Some(&Cell::raw("y")));
        right.push(Some(&Cell::raw("z")));
        right.push(None);
        left.merge(right);
        assert_eq!(left.rows_seen(), 5);
        let agg = left.snapshot(100);
        assert_eq!(agg.order().collect::<Vec<_>>(), vec!["y", "x", "z"]);
        assert_eq!(agg.total_count, 4);
    }

    #[test]
    fn test_percentages() {
        let agg = aggregate_of(&[("a", 3), ("b", 1)]);
        assert_eq!(agg.percentages(), vec![75.0, 25.0]);
        assert_eq!(CategoryAggregate::no_data().percentages(), vec![0.0]);
    }

    #[test]
    fn test_top_k_with_other() {
        let agg = aggregate_of(&[("A", 10), ("B", 7), ("C", 5), ("D", 3), ("E", 1)]);
        let view = top_k(&agg, 3);
        assert_eq!(view.categories, vec!["A", "B", "Other"]);
        assert_eq!(view.counts, vec![10, 7, 9]);
        assert_eq!(view.total(), agg.total_count);
    }

    #[test]
    fn test_top_k_under_limit_is_unchanged() {
        let agg = aggregate_of(&[("A", 4), ("B", 4), ("C", 1)]);
        let view = top_k(&agg, 6);
        assert_eq!(view.categories, vec!["A", "B", "C"]);
        assert_eq!(view.counts, vec![4, 4, 1]);
    }

    #[test]
    fn test_top_k_merges_into_data_label_other() {
        let agg = aggregate_of(&[("A", 10), ("Other", 8), ("C", 5), ("D", 3)]);
        let view = top_k(&agg, 3);
        assert_eq!(view.categories, vec!["A", "Other"]);
        assert_eq!(view.counts, vec![10, 16]);
        assert_eq!(view.total(), agg.total_count);

        // In the tail it is simply part of the bucket.
        let agg = aggregate_of(&[("A", 10), ("B", 8), ("Other", 5), ("D", 3)]);
        let view = top_k(&agg, 3);
        assert_eq!(view.categories, vec!["A", "B", "Other"]);
        assert_eq!(view.counts, vec![10, 8, 8]);
    }

    #[test]
    fn test_top_k_omits_empty_other() {
        let agg = aggregate_of(&[("A", 4), ("B", 0), ("C", 0)]);
        let view = top_k(&agg, 2);
        assert_eq!(view.categories, vec!["A"]);
        assert_eq!(view.counts, vec![4]);
    }

    #[test]
    fn test_top_k_passes_sentinels_through() {
        for agg in [
            CategoryAggregate::no_data(),
            CategoryAggregate::error(),
            aggregate_of(&[(UNKNOWN_LABEL, 12)]),
        ] {
            let view = top_k(&agg, 1);
            assert_eq!(view.len(), 1);
            assert!(!view.categories.contains(&OTHER_LABEL.to_string()));
        }
    }
}
