//! Shared CLI definitions for salesdash.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::Path;

/// The six chart aggregations the dashboard can display.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    /// Total Amount summed per month, in month order
    #[default]
    SalesByMonth,
    /// Total Amount summed per city, largest first
    SalesByCity,
    /// Ten Sub-Categories with the highest summed Profit
    TopSubCategories,
    /// Total Profit summed per month, drawn as a line
    MonthlyProfit,
    /// Number of order lines per Category, as proportions
    OrdersByCategory,
    /// Number of order lines per PaymentMode, as proportions
    PaymentModes,
}

impl ChartKind {
    pub const ALL: [Self; 6] = [
        Self::SalesByMonth,
        Self::SalesByCity,
        Self::TopSubCategories,
        Self::MonthlyProfit,
        Self::OrdersByCategory,
        Self::PaymentModes,
    ];

    /// Label shown in the chart selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::SalesByMonth => "Total Amount by Month",
            Self::SalesByCity => "Total Amount by City",
            Self::TopSubCategories => "Top 10 Sub-Categories by Profit",
            Self::MonthlyProfit => "Monthly Profit Trend",
            Self::OrdersByCategory => "Orders by Category (Pie Chart)",
            Self::PaymentModes => "Payment Mode Analysis",
        }
    }

    /// Parse a selector label (as returned by [`ChartKind::label`]) or a CLI value name.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.label().eq_ignore_ascii_case(s)
                || kind
                    .to_possible_value()
                    .map(|v| v.matches(s, true))
                    .unwrap_or(false)
        })
    }

    /// Kebab-case name accepted by `--chart`, e.g. `sales-by-month`.
    pub fn value_name(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| format!("{:?}", self))
    }

    /// Position in [`ChartKind::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz)
    Gzip,
    /// Zstandard compression (.zst)
    Zstd,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// XZ compression (.xz)
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            Self::from_name(ext)
        } else {
            None
        }
    }

    /// Parse a format name or extension ("gzip", "gz", "zst", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gz" | "gzip" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" | "bzip2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Get file extension for this compression format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        }
    }
}

/// Format used by `--output`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text panels
    Text,
    /// A single JSON object
    Json,
}

/// Parse a delimiter given as a single ASCII character, or `tab`.
fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let bytes = s.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Ok(bytes[0])
            } else {
                Err(format!("delimiter must be a single ASCII character, got '{s}'"))
            }
        }
    }
}

/// Command-line arguments for salesdash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "salesdash",
    version,
    about = "Sales CSV dashboard in the terminal",
    long_about = "Reads a sales CSV, removes incomplete and duplicate rows, normalizes the \
Order Date column and shows key business indicators together with one of six chart \
aggregations. Runs an interactive terminal dashboard unless --output or --export-chart is given."
)]
pub struct Args {
    /// Path to the sales CSV file, or - to read from stdin
    #[arg(required_unless_present_any = ["generate_config", "clear_cache"], value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Chart to display first
    #[arg(long = "chart", value_enum)]
    pub chart: Option<ChartKind>,

    /// Print the dashboard in this format and exit instead of starting the terminal UI
    #[arg(long = "output", value_enum)]
    pub output: Option<OutputFormat>,

    /// Write the selected chart to FILE (.png or .svg) and exit
    #[arg(long = "export-chart", value_name = "FILE")]
    pub export_chart: Option<std::path::PathBuf>,

    /// Field delimiter: a single character, or "tab"
    #[arg(long = "delimiter", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Skip this many rows before the header row
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,

    /// Number of rows to use when inferring column types (default: 1000)
    #[arg(long = "infer-schema-length", value_name = "N")]
    pub infer_schema_length: Option<usize>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz).
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Number of rows shown in the raw data preview (default: 5)
    #[arg(long = "preview-rows", value_name = "N")]
    pub preview_rows: Option<usize>,

    /// Enable debug logging
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/salesdash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Clear all cache data (log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,
}

impl Args {
    /// True when the run prints or exports and exits without the terminal UI.
    pub fn is_batch(&self) -> bool {
        self.output.is_some() || self.export_chart.is_some()
    }
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let placeholder: String = arg
            .get_value_names()
            .map(|names| {
                names
                    .iter()
                    .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let option_str = if arg.is_positional() {
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            if placeholder.is_empty() || !arg.get_action().takes_values() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_detection() {
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sales.csv.gz")),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sales.csv.zst")),
            Some(CompressionFormat::Zstd)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sales.csv.bz2")),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sales.csv.xz")),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sales.csv")),
            None
        );
        assert_eq!(CompressionFormat::from_extension(Path::new("sales")), None);
    }

    #[test]
    fn test_chart_kind_labels_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(
            ChartKind::from_label("payment-modes"),
            Some(ChartKind::PaymentModes)
        );
        assert_eq!(ChartKind::from_label("Pie of everything"), None);
        assert_eq!(ChartKind::TopSubCategories.value_name(), "top-sub-categories");
    }

    #[test]
    fn test_chart_kind_cycles() {
        assert_eq!(ChartKind::PaymentModes.next(), ChartKind::SalesByMonth);
        assert_eq!(ChartKind::SalesByMonth.previous(), ChartKind::PaymentModes);
        assert_eq!(ChartKind::SalesByCity.index(), 1);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "salesdash",
            "sales.csv",
            "--chart",
            "top-sub-categories",
            "--output",
            "json",
            "--delimiter",
            ";",
        ])
        .unwrap();
        assert_eq!(args.chart, Some(ChartKind::TopSubCategories));
        assert_eq!(args.output, Some(OutputFormat::Json));
        assert_eq!(args.delimiter, Some(b';'));
        assert!(args.is_batch());
    }

    #[test]
    fn test_path_not_required_with_generate_config() {
        let args = Args::try_parse_from(["salesdash", "--generate-config"]).unwrap();
        assert!(args.path.is_none());
        assert!(Args::try_parse_from(["salesdash"]).is_err());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--chart"));
        assert!(md.contains("--export-chart"));
        assert!(!md.contains("--help"));
    }
}
