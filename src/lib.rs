//! Dashboard derivation engine for loosely-typed tabular data.
//!
//! A [`Dataset`] (headers plus rows of [`Cell`]s) goes in; column profiles,
//! numeric summaries, category breakdowns, time series, paginated table
//! views and CSV exports come out. Nothing here mutates the dataset and no
//! analysis entry point returns an error to its caller: bad cells are
//! skipped and degenerate inputs produce sentinel results.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod explain;
pub mod export;
pub mod state;
pub mod table;

pub use analysis::category::{CategoryAggregate, DisplayAggregate, aggregate_categories, top_k};
pub use analysis::charts::{ChartData, ChartKind, ChartSelection, DatasetSummary, build_chart};
pub use analysis::inference::{ColumnKind, ColumnProfile, DatasetProfile, infer_profiles};
pub use analysis::stats::{NumericSummary, summarize};
pub use analysis::temporal::{TimeSeriesPoint, resample};
pub use config::AnalysisConfig;
pub use data::model::{Cell, Dataset, Row};
pub use error::{AnalysisError, DatasetError};
pub use export::CsvExport;
pub use state::{DashboardState, SortDirection, SortSpec, TableViewState};
pub use table::{PageInfo, TablePage, table_page};
