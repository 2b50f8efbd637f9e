use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Analysis tunables
// ---------------------------------------------------------------------------

/// Every constant the derivation passes depend on. Missing JSON fields fall
/// back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows sampled from the head of the dataset for type inference.
    pub inference_sample_rows: usize,
    /// A column is temporal when strictly more than this share of samples parse as instants.
    pub temporal_threshold: f64,
    pub histogram_bins: usize,
    /// Distinct labels kept by the categorical aggregator.
    pub max_categories: usize,
    pub category_batch_size: usize,
    /// Upper bound on time-series length after downsampling.
    pub max_series_points: usize,
    pub page_size: usize,
    /// Top-K for hierarchical (treemap) category views.
    pub tree_top_k: usize,
    /// Top-K for proportional (pie) category views.
    pub pie_top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            inference_sample_rows: 100,
            temporal_threshold: 0.8,
            histogram_bins: 20,
            max_categories: 100,
            category_batch_size: 10_000,
            max_series_points: 1000,
            page_size: 10,
            tree_top_k: 15,
            pie_top_k: 6,
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a JSON file, then clamp it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&text).context("parsing config JSON")?;
        Ok(config.validate())
    }

    /// Clamp out-of-range values instead of rejecting the config.
    pub fn validate(mut self) -> Self {
        for (name, field) in [
            ("inference_sample_rows", &mut self.inference_sample_rows),
            ("histogram_bins", &mut self.histogram_bins),
            ("max_categories", &mut self.max_categories),
            ("category_batch_size", &mut self.category_batch_size),
            ("max_series_points", &mut self.max_series_points),
            ("page_size", &mut self.page_size),
            ("tree_top_k", &mut self.tree_top_k),
            ("pie_top_k", &mut self.pie_top_k),
        ] {
            if *field == 0 {
                log::warn!("config: {name} must be positive, using 1");
                *field = 1;
            }
        }
        if !(0.0..=1.0).contains(&self.temporal_threshold) {
            let clamped = if self.temporal_threshold.is_nan() {
                0.8
            } else {
                self.temporal_threshold.clamp(0.0, 1.0)
            };
            log::warn!(
                "config: temporal_threshold {} out of [0, 1], using {clamped}",
                self.temporal_threshold
            );
            self.temporal_threshold = clamped;
        }
        self
    }
}
