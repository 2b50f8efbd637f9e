use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::data::model::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Pair `time_column` with `value_column`, dropping rows where either side
/// fails to parse, and sort by timestamp. Equal timestamps keep row order.
pub fn time_series_points(
    dataset: &Dataset,
    time_column: &str,
    value_column: &str,
) -> Vec<TimeSeriesPoint> {
    let mut points: Vec<TimeSeriesPoint> = dataset
        .rows
        .iter()
        .filter_map(|row| {
            let timestamp = row.get(time_column)?.as_instant()?;
            let value = row.get(value_column)?.as_number()?;
            Some(TimeSeriesPoint { timestamp, value })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Reduce a time-ordered series to at most `target` points.
///
/// Consecutive chunks of `ceil(n / target)` points collapse into one point
/// carrying the chunk's first timestamp and the mean of its values.
pub fn downsample(points: Vec<TimeSeriesPoint>, target: usize) -> Vec<TimeSeriesPoint> {
    let target = target.max(1);
    if points.len() <= target {
        return points;
    }
    let step = points.len().div_ceil(target);
    points
        .chunks(step)
        .map(|chunk| TimeSeriesPoint {
            timestamp: chunk[0].timestamp,
            value: chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64,
        })
        .collect()
}

/// Build the downsampled series with the default configuration.
pub fn resample(dataset: &Dataset, time_column: &str, value_column: &str) -> Vec<TimeSeriesPoint> {
    resample_with(dataset, time_column, value_column, &AnalysisConfig::default())
}

/// Build the downsampled series. An empty result means there is nothing to
/// plot, not an error.
pub fn resample_with(
    dataset: &Dataset,
    time_column: &str,
    value_column: &str,
    config: &AnalysisConfig,
) -> Vec<TimeSeriesPoint> {
    let points = time_series_points(dataset, time_column, value_column);
    let n = points.len();
    let series = downsample(points, config.max_series_points);
    log::debug!(
        "time series '{time_column}' x '{value_column}': {n} points, {} after downsampling",
        series.len()
    );
    series
}
