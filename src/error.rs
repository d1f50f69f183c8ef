//! Error taxonomy for the dashboard pipeline and user-facing message formatting.
//!
//! Pipeline functions return `color_eyre::Result`; domain failures are carried as
//! [`DashboardError`] inside the report so callers can `downcast_ref` and tell a
//! missing column apart from an empty aggregation.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// A column referenced by a metric or chart is absent from the table.
    #[error("missing field '{column}' in uploaded table")]
    MissingField { column: String },

    /// A maximum or grouping was requested over zero rows.
    #[error("cannot aggregate '{column}': the table has no rows")]
    EmptyAggregation { column: String },

    #[error("unsupported input: {0}")]
    UnsupportedFormat(String),

    #[error("no data: the input has no header row")]
    NoData,
}

impl DashboardError {
    pub fn missing(column: &str) -> Self {
        Self::MissingField {
            column: column.to_string(),
        }
    }

    pub fn empty(column: &str) -> Self {
        Self::EmptyAggregation {
            column: column.to_string(),
        }
    }
}

/// Per-row failure while parsing an Order Date. Collected, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum DateParseError {
    #[error("empty date")]
    Empty,
    #[error("unrecognized date '{0}'")]
    Unrecognized(String),
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}", msg),
        PE::Duplicate(msg) => format!("Duplicate column name: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ComputeError(msg) => format!("Could not read table: {}", msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find DashboardError, PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let prefix = |msg: String| match path {
        Some(p) => format!("{}: {}", p.display(), msg),
        None => msg,
    };

    for cause in report.chain() {
        if let Some(de) = cause.downcast_ref::<DashboardError>() {
            return prefix(de.to_string());
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return prefix(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return prefix(user_message_from_io(io_err, None));
        }
    }

    // Fallback: use first line of display to avoid long tracebacks
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred");
    prefix(first_line.trim().to_string())
}

/// Find the [`DashboardError`] inside a report, if any.
pub fn dashboard_error(report: &color_eyre::eyre::Report) -> Option<&DashboardError> {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<DashboardError>())
}
