use thiserror::Error;

/// Structural problems with a [`Dataset`](crate::data::model::Dataset).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("header '{0}' appears more than once")]
    DuplicateHeader(String),
    #[error("row {row} has column '{column}' which is not declared in the headers")]
    UndeclaredColumn { row: usize, column: String },
}

/// Failures inside an analysis pass. These never reach rendering callers;
/// the public entry points turn them into sentinel results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("malformed dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}
