use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

pub mod aggregate;
pub mod app;
pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod cleaning;
pub mod columns;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod source;
pub mod statistics;
pub mod temporal;
pub mod widgets;

pub use app::{App, AppEvent};
pub use cache::CacheManager;
pub use chart_data::{ChartPoint, ChartSeries, ChartStyle};
pub use cleaning::CleaningReport;
pub use config::{AppConfig, ConfigManager};
pub use error::{DashboardError, DateParseError};
pub use metrics::KpiSet;
pub use salesdash_cli::{Args, ChartKind, CompressionFormat, OutputFormat};
pub use statistics::{ColumnSummary, ColumnType};
pub use temporal::{NormalizationReport, SkippedRow};

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "salesdash";

/// How the CSV source is read. `None` fields fall back to reader defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub skip_rows: Option<usize>,
    pub infer_schema_length: Option<usize>,
    pub compression: Option<CompressionFormat>,
    pub null_values: Option<Vec<String>>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = Some(skip_rows);
        self
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = Some(values);
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let file_loading = &config.file_loading;
        Self {
            delimiter: args.delimiter.or(file_loading.delimiter),
            skip_rows: args.skip_rows.or(file_loading.skip_rows),
            infer_schema_length: args
                .infer_schema_length
                .or(file_loading.infer_schema_length),
            compression: args.compression.or_else(|| {
                file_loading
                    .compression
                    .as_deref()
                    .and_then(CompressionFormat::from_name)
            }),
            null_values: file_loading.null_values.clone(),
        }
    }
}

impl From<&Args> for OpenOptions {
    fn from(args: &Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

/// Knobs for [`build_dashboard`] that do not affect reading.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOptions {
    pub preview_rows: usize,
    pub date_formats: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            date_formats: temporal::DEFAULT_DATE_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PipelineOptions {
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        Self {
            preview_rows: args.preview_rows.unwrap_or(config.display.preview_rows),
            date_formats: config.dates.formats.clone(),
        }
    }
}

/// First rows of a table rendered as text, nulls shown as `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn from_frame(df: &DataFrame, rows: usize) -> Result<Self> {
        let head = df.head(Some(rows));
        let columns = head
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let rows = (0..head.height())
            .map(|i| {
                head.get_columns()
                    .iter()
                    .map(|c| -> Result<String> { Ok(cell_text(&c.get(i)?)) })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns, rows })
    }
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Everything the dashboard shows for one chart selection.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub raw_preview: TablePreview,
    /// Column names after header trimming
    pub columns: Vec<String>,
    pub cleaning: CleaningReport,
    pub normalization: NormalizationReport,
    pub dtypes: Vec<ColumnType>,
    pub summary: Vec<ColumnSummary>,
    pub kpis: KpiSet,
    pub chart: ChartSeries,
    #[serde(skip)]
    pub cleaned: DataFrame,
}

impl Dashboard {
    pub fn selection(&self) -> ChartKind {
        self.chart.kind
    }

    /// Input columns that no metric or chart found.
    pub fn missing_expected_columns(&self) -> Vec<&'static str> {
        columns::EXPECTED
            .iter()
            .copied()
            .filter(|c| !self.columns.iter().any(|have| have == c))
            .collect()
    }
}

/// Run the whole pipeline on a raw table for one chart selection. Any missing
/// column or empty aggregation aborts the run; no partial dashboard is built.
pub fn build_dashboard(
    raw: &DataFrame,
    kind: ChartKind,
    options: &PipelineOptions,
) -> Result<Dashboard> {
    log::debug!("Building dashboard for '{}'", kind.label());
    let raw_preview = TablePreview::from_frame(raw, options.preview_rows)?;

    let (cleaned, cleaning) = cleaning::clean(raw.clone()).wrap_err("cleaning the table")?;
    let columns = cleaned
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let (cleaned, normalization) = temporal::normalize(&cleaned, &options.date_formats)?;
    let dtypes = statistics::dtype_summary(&cleaned);
    let summary = statistics::describe(&cleaned)?;
    let kpis = metrics::compute_kpis(&cleaned)?;
    let chart = chart_data::aggregate(&cleaned, kind)?;

    Ok(Dashboard {
        raw_preview,
        columns,
        cleaning,
        normalization,
        dtypes,
        summary,
        kpis,
        chart,
        cleaned,
    })
}
