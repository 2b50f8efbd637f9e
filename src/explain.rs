use serde::{Deserialize, Serialize};

use crate::analysis::charts::{ChartKind, ChartSelection, DatasetSummary};

/// Payload for the external chart-explanation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub prompt: String,
    pub context: String,
}

fn numbered(lead: String, points: [&str; 5]) -> String {
    let mut prompt = lead;
    prompt.push_str(" Please provide insights about:\n");
    for (i, point) in points.iter().enumerate() {
        prompt.push_str(&format!("\n{}. {point}", i + 1));
    }
    prompt
}

/// The analysis question for one chart, naming its column(s).
pub fn chart_prompt(kind: ChartKind, selection: &ChartSelection) -> String {
    let primary = selection.numeric.as_deref().unwrap_or("-");
    let secondary = selection.secondary.as_deref().unwrap_or("-");
    let categorical = selection.categorical.as_deref().unwrap_or("-");

    match kind {
        ChartKind::Distribution => numbered(
            format!("Analyze the distribution of \"{primary}\"."),
            [
                "The shape of the distribution (normal, skewed, etc.)",
                "Key statistics (mean, median, standard deviation)",
                "Any notable patterns or anomalies",
                "Potential implications for the data analysis",
                "Recommendations for further analysis",
            ],
        ),
        ChartKind::TimeSeries => numbered(
            format!("Analyze how \"{primary}\" changes over time."),
            [
                "The overall trend",
                "Seasonality or recurring cycles",
                "Sudden jumps, drops or gaps",
                "Potential drivers of the changes",
                "Recommendations for further analysis",
            ],
        ),
        ChartKind::Correlation => numbered(
            format!("Analyze the correlation between \"{primary}\" and \"{secondary}\"."),
            [
                "The strength and direction of the correlation",
                "The significance of the relationship",
                "Any notable patterns or clusters",
                "Potential causation factors to investigate",
                "Recommendations for further analysis",
            ],
        ),
        ChartKind::BoxPlot | ChartKind::Outlier => numbered(
            format!("Analyze the box plot for outliers in \"{primary}\"."),
            [
                "The overall spread of the data",
                "The presence and significance of outliers",
                "The symmetry of the distribution",
                "Any unusual patterns",
                "Practical implications of these outliers",
            ],
        ),
        ChartKind::Category => numbered(
            format!("Analyze the categorical distribution for \"{categorical}\"."),
            [
                "The most prominent categories and their significance",
                "The balance or imbalance between categories",
                "Any unusual patterns in the category distribution",
                "Potential implications for further analysis",
                "How this categorical distribution might impact other variables",
            ],
        ),
        ChartKind::Proportion => numbered(
            format!("Analyze the proportional distribution for \"{categorical}\"."),
            [
                "The relative sizes of each category segment",
                "Any dominant categories and their business significance",
                "The overall diversity of categories",
                "How this distribution might impact decision-making",
                "Recommendations for further investigation based on these proportions",
            ],
        ),
    }
}

/// One-sentence description of the dataset sent alongside every prompt.
pub fn dataset_context(summary: &DatasetSummary) -> String {
    format!(
        "This is a data analysis task. The data being analyzed is from a CSV file with {} rows and {} columns.",
        summary.row_count, summary.column_count
    )
}

pub fn explanation_request(
    kind: ChartKind,
    selection: &ChartSelection,
    summary: &DatasetSummary,
) -> ExplanationRequest {
    ExplanationRequest {
        prompt: chart_prompt(kind, selection),
        context: dataset_context(summary),
    }
}
