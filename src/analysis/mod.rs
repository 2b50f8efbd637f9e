/// Derivation passes over a [`Dataset`](crate::data::model::Dataset).
///
/// ```text
///   Dataset ──► inference ──► DatasetProfile (kinds + temporal column)
///                                 │
///          ┌──────────────────────┼───────────────────────┐
///          ▼                      ▼                       ▼
///        stats                category                temporal
///   (summary, histogram,   (counts, Top-K + Other)  (pairs, downsample)
///    box / outliers)
///          └──────────────────────┼───────────────────────┘
///                                 ▼
///                              charts   ChartKind → ChartData
/// ```
///
/// Every pass is a pure function of the dataset and its parameters and
/// never fails: parse failures are skipped and empty inputs produce
/// sentinel or empty results.

pub mod category;
pub mod charts;
pub mod inference;
pub mod stats;
pub mod temporal;
