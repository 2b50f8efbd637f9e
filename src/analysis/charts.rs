use serde::{Deserialize, Serialize};

use super::category::{CategoryAggregate, DisplayAggregate, aggregate_categories_with, top_k};
use super::inference::{ColumnKind, DatasetProfile};
use super::stats::{BoxSummary, NumericSummary, box_summary, numeric_values, summarize_values};
use super::temporal::{TimeSeriesPoint, resample_with};
use crate::config::AnalysisConfig;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

/// Every chart the dashboard knows how to feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Distribution,
    BoxPlot,
    TimeSeries,
    Category,
    Correlation,
    Proportion,
    Outlier,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Distribution,
        ChartKind::BoxPlot,
        ChartKind::TimeSeries,
        ChartKind::Category,
        ChartKind::Correlation,
        ChartKind::Proportion,
        ChartKind::Outlier,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Distribution => "Distribution Analysis",
            ChartKind::BoxPlot => "Box Plot",
            ChartKind::TimeSeries => "Time Series Analysis",
            ChartKind::Category => "Category Distribution",
            ChartKind::Correlation => "Correlation Analysis",
            ChartKind::Proportion => "Proportional Analysis",
            ChartKind::Outlier => "Outlier Detection",
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset summary / selection
// ---------------------------------------------------------------------------

/// Shape of a dataset as shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub temporal_column: Option<String>,
}

impl DatasetSummary {
    pub fn new(dataset: &Dataset, profile: &DatasetProfile) -> Self {
        let owned = |kind| {
            profile
                .columns_of(kind)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        DatasetSummary {
            row_count: dataset.len(),
            column_count: dataset.headers.len(),
            numeric_columns: owned(ColumnKind::Numeric),
            categorical_columns: owned(ColumnKind::Categorical),
            temporal_column: profile.temporal_column.clone(),
        }
    }
}

/// Which columns feed the charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSelection {
    /// Primary numeric column.
    pub numeric: Option<String>,
    /// Second numeric column, for correlation.
    pub secondary: Option<String>,
    pub categorical: Option<String>,
}

impl ChartSelection {
    /// First numeric column, second numeric column and first categorical
    /// column, in header order.
    pub fn defaults(profile: &DatasetProfile) -> Self {
        let numeric = profile.columns_of(ColumnKind::Numeric);
        ChartSelection {
            numeric: numeric.first().map(|s| s.to_string()),
            secondary: numeric.get(1).map(|s| s.to_string()),
            categorical: profile
                .columns_of(ColumnKind::Categorical)
                .first()
                .map(|s| s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// Raw `(x, y)` pairs of two numeric columns; rows where either side does
/// not parse are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPairs {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(f64, f64)>,
}

pub fn correlation_pairs(dataset: &Dataset, x_column: &str, y_column: &str) -> CorrelationPairs {
    let points = dataset
        .rows
        .iter()
        .filter_map(|row| {
            let x = row.get(x_column)?.as_number()?;
            let y = row.get(y_column)?.as_number()?;
            Some((x, y))
        })
        .collect();
    CorrelationPairs {
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        points,
    }
}

/// Renderable input for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartData {
    Distribution {
        column: String,
        summary: NumericSummary,
    },
    Box {
        column: String,
        summary: BoxSummary,
    },
    TimeSeries {
        time_column: Option<String>,
        value_column: String,
        /// Empty when there is no temporal column or no parseable pair.
        points: Vec<TimeSeriesPoint>,
    },
    Category {
        column: String,
        aggregate: CategoryAggregate,
        view: DisplayAggregate,
    },
    Correlation(CorrelationPairs),
    /// The chart is omitted; `reason` says why.
    Unavailable {
        kind: ChartKind,
        reason: String,
    },
}

fn unavailable(kind: ChartKind, reason: &str) -> ChartData {
    ChartData::Unavailable {
        kind,
        reason: reason.to_string(),
    }
}

/// Derive the data behind one chart. Missing selections degrade to
/// [`ChartData::Unavailable`] instead of failing.
pub fn build_chart(
    dataset: &Dataset,
    profile: &DatasetProfile,
    kind: ChartKind,
    selection: &ChartSelection,
    config: &AnalysisConfig,
) -> ChartData {
    let numeric = selection.numeric.as_deref();
    let categorical = selection.categorical.as_deref();

    match kind {
        ChartKind::Distribution => match numeric {
            Some(col) => ChartData::Distribution {
                column: col.to_string(),
                summary: summarize_values(&numeric_values(dataset, col), config.histogram_bins),
            },
            None => unavailable(kind, "no numeric column"),
        },
        ChartKind::BoxPlot | ChartKind::Outlier => match numeric {
            Some(col) => ChartData::Box {
                column: col.to_string(),
                summary: box_summary(&numeric_values(dataset, col)),
            },
            None => unavailable(kind, "no numeric column"),
        },
        ChartKind::TimeSeries => match numeric {
            Some(col) => {
                let time_column = profile.temporal_column.clone();
                let points = time_column
                    .as_deref()
                    .map(|t| resample_with(dataset, t, col, config))
                    .unwrap_or_default();
                ChartData::TimeSeries {
                    time_column,
                    value_column: col.to_string(),
                    points,
                }
            }
            None => unavailable(kind, "no numeric column"),
        },
        ChartKind::Category | ChartKind::Proportion => match categorical {
            Some(col) => {
                let aggregate = aggregate_categories_with(dataset, col, config);
                let limit = if kind == ChartKind::Category {
                    config.tree_top_k
                } else {
                    config.pie_top_k
                };
                let view = top_k(&aggregate, limit);
                ChartData::Category {
                    column: col.to_string(),
                    aggregate,
                    view,
                }
            }
            None => unavailable(kind, "no categorical column"),
        },
        ChartKind::Correlation => match (numeric, selection.secondary.as_deref()) {
            (Some(x), Some(y)) => ChartData::Correlation(correlation_pairs(dataset, x, y)),
            _ => unavailable(kind, "needs two numeric columns"),
        },
    }
}
