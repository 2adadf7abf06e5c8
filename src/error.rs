use thiserror::Error;

use crate::grid::ColumnId;

/// Errors raised by the sample data generators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// A row or listing count was negative.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors raised while turning free-form request parameters into [`crate::grid::GridOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridConfigError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unknown aggregation function: {0}")]
    UnknownAggregation(String),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("unknown selection mode: {0}")]
    UnknownSelectionMode(String),

    #[error("unknown export format: {0}")]
    UnknownExportFormat(String),

    #[error("column {0} cannot be used as a group or pivot axis")]
    NotGroupable(ColumnId),

    #[error("column {0} is not numeric and cannot be aggregated")]
    NotNumeric(ColumnId),

    #[error("malformed aggregation entry {0:?}, expected column:function")]
    MalformedAggregation(String),

    #[error("table height {0} is outside 300..=800")]
    HeightOutOfRange(u32),

    #[error("page size {0} is not one of 10, 20, 50, 100")]
    UnsupportedPageSize(u32),

    #[error("pivot mode needs at least one row group and one value column")]
    IncompletePivot,
}

/// Errors raised when slicing a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("row {index} is out of range for a dataset of {len} rows")]
    RowOutOfRange { index: usize, len: usize },
}

/// Errors raised by the CSV / XLSX exporters.
#[derive(Debug, Error)]
pub enum ExportError {
    #[cfg(feature = "web")]
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0} export is not available in this build")]
    Unsupported(&'static str),
}
