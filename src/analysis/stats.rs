use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One equal-width histogram bin. Values fall in `[x0, x1)`, except the last
/// bin which also includes `x1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub x0: f64,
    pub x1: f64,
    /// Midpoint of the bounds, used as the bar position.
    pub center: f64,
    pub count: u64,
}

/// Descriptive statistics of a numeric column. Every field is 0 and the
/// histogram is empty when no value parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    pub histogram: Vec<HistogramBin>,
}

/// Box-plot summary with Tukey fences at 1.5 × IQR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Smallest and largest values inside the fences.
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// Values outside the fences, in row order.
    pub outliers: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// All finite numeric values of `column`, in row order. Cells that do not
/// parse are skipped.
pub fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .rows
        .iter()
        .filter_map(|row| row.get(column)?.as_number())
        .collect()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        // The sum of finite values overflowed; divide first.
        values.iter().map(|v| v / n).sum()
    }
}

/// Sample standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linear-interpolated quantile (the R-7 / spreadsheet definition) of
/// already sorted values.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Split `[min, max]` into `bins` equal-width bins and count the values.
/// A zero-width extent yields a single bin holding every value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if min == max || bins <= 1 {
        return vec![HistogramBin {
            x0: min,
            x1: max,
            center: min / 2.0 + max / 2.0,
            count: values.len() as u64,
        }];
    }

    let n = bins as f64;
    // `max - min` can overflow for finite values near the f64 limits.
    let extent_finite = (max - min).is_finite();
    let width = if extent_finite {
        (max - min) / n
    } else {
        max / n - min / n
    };
    let offset = |v: f64| {
        if extent_finite {
            (v - min) / width
        } else {
            v / width - min / width
        }
    };
    let mut counts = vec![0u64; bins];
    for &v in values {
        let idx = (offset(v).floor().max(0.0) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let x0 = min + i as f64 * width;
            let x1 = if i == bins - 1 {
                max
            } else {
                min + (i + 1) as f64 * width
            };
            HistogramBin {
                x0,
                x1,
                center: x0 + (x1 - x0) / 2.0,
                count,
            }
        })
        .collect()
}

/// Summarize already-extracted values.
pub fn summarize_values(values: &[f64], bins: usize) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary::default();
    }
    let sorted = sorted_copy(values);
    NumericSummary {
        count: values.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: mean(values),
        median: quantile_sorted(&sorted, 0.5),
        q1: quantile_sorted(&sorted, 0.25),
        q3: quantile_sorted(&sorted, 0.75),
        std_dev: std_dev(values),
        histogram: histogram(values, bins),
    }
}

/// Summarize a numeric column with the default configuration.
pub fn summarize(dataset: &Dataset, column: &str) -> NumericSummary {
    summarize_with(dataset, column, &AnalysisConfig::default())
}

pub fn summarize_with(dataset: &Dataset, column: &str, config: &AnalysisConfig) -> NumericSummary {
    summarize_values(&numeric_values(dataset, column), config.histogram_bins)
}

/// Tukey box summary of already-extracted values.
pub fn box_summary(values: &[f64]) -> BoxSummary {
    if values.is_empty() {
        return BoxSummary::default();
    }
    let sorted = sorted_copy(values);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let inside = |v: &f64| *v >= lower_fence && *v <= upper_fence;

    BoxSummary {
        q1,
        median: quantile_sorted(&sorted, 0.5),
        q3,
        lower_fence,
        upper_fence,
        whisker_low: sorted.iter().copied().find(inside).unwrap_or(q1),
        whisker_high: sorted.iter().rev().copied().find(inside).unwrap_or(q3),
        outliers: values.iter().copied().filter(|v| !inside(v)).collect(),
    }
}
