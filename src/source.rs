//! Reading the uploaded CSV into a polars DataFrame.
//!
//! The input is a byte stream: a file path, stdin, or any reader. Compressed
//! input is decompressed into memory before the CSV reader runs.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use polars::prelude::*;
use salesdash_cli::CompressionFormat;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::error::DashboardError;
use crate::OpenOptions;

/// Null tokens used when neither the config nor the caller provides any.
pub const DEFAULT_NULL_VALUES: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Read a CSV file from `path` (`-` reads stdin).
pub fn read_csv_path(path: &Path, options: &OpenOptions) -> Result<DataFrame> {
    if path.as_os_str() == "-" {
        log::debug!("Reading CSV from stdin");
        return read_csv(std::io::stdin().lock(), options.compression, options);
    }

    let compression = options
        .compression
        .or_else(|| CompressionFormat::from_extension(path));
    log::debug!(
        "Reading CSV from {} (compression: {:?})",
        path.display(),
        compression
    );

    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    read_csv(BufReader::new(file), compression, options)
}

/// Read CSV bytes from any reader, decompressing first when `compression` is set.
pub fn read_csv<R: Read>(
    reader: R,
    compression: Option<CompressionFormat>,
    options: &OpenOptions,
) -> Result<DataFrame> {
    let bytes = decompress(reader, compression)?;
    read_csv_bytes(bytes, options)
}

fn decompress<R: Read>(mut reader: R, compression: Option<CompressionFormat>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match compression {
        None => {
            reader.read_to_end(&mut out)?;
        }
        Some(CompressionFormat::Gzip) => {
            flate2::read::MultiGzDecoder::new(reader).read_to_end(&mut out)?;
        }
        Some(CompressionFormat::Zstd) => {
            zstd::stream::read::Decoder::new(reader)?.read_to_end(&mut out)?;
        }
        Some(CompressionFormat::Bzip2) => {
            bzip2::read::BzDecoder::new(reader).read_to_end(&mut out)?;
        }
        Some(CompressionFormat::Xz) => {
            xz2::read::XzDecoder::new(reader).read_to_end(&mut out)?;
        }
    }
    Ok(out)
}

/// Parse in-memory CSV text into the Raw Table.
pub fn read_csv_bytes(bytes: Vec<u8>, options: &OpenOptions) -> Result<DataFrame> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(DashboardError::NoData.into());
    }

    let mut read_options = CsvReadOptions::default();
    read_options.has_header = true;
    if let Some(skip_rows) = options.skip_rows {
        read_options.skip_rows = skip_rows;
    }
    read_options.infer_schema_length = Some(options.infer_schema_length.unwrap_or(1000));

    let null_values: Vec<PlSmallStr> = match &options.null_values {
        Some(values) => values.iter().map(|v| v.as_str().into()).collect(),
        None => DEFAULT_NULL_VALUES.iter().map(|v| (*v).into()).collect(),
    };
    let delimiter = options.delimiter.unwrap_or(b',');
    read_options = read_options.map_parse_options(|opts| {
        opts.with_separator(delimiter)
            .with_try_parse_dates(false)
            .with_missing_is_null(true)
            .with_null_values(Some(NullValues::AllColumns(null_values.clone())))
    });

    let df = CsvReader::new(Cursor::new(bytes))
        .with_options(read_options)
        .finish()?;
    log::info!("Loaded {} rows x {} columns", df.height(), df.width());
    Ok(df)
}
