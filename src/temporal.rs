//! Order Date normalization: parse each row, drop failures, derive Month/Hour/Year.
//!
//! A row whose date does not parse is removed from the table and listed in the
//! [`NormalizationReport`] so callers can decide whether to surface it.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::columns::{HOUR, MONTH, ORDER_DATE, YEAR};
use crate::error::{DashboardError, DateParseError};

/// strftime formats tried, in order, after RFC 3339. Numeric dates are read
/// month first.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

/// A row removed because its Order Date did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Position in the cleaned table (0-based)
    pub row: usize,
    pub value: String,
    pub error: DateParseError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub skipped: Vec<SkippedRow>,
}

impl NormalizationReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Parse one Order Date cell. Offsets in RFC 3339 input are kept as wall-clock
/// time; no timezone conversion happens. Date-only values parse to midnight.
pub fn parse_order_date<S: AsRef<str>>(
    value: &str,
    formats: &[S],
) -> std::result::Result<NaiveDateTime, DateParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    let formats = || formats.iter().map(|f| f.as_ref());
    if let Some(dt) = formats().find_map(|f| NaiveDateTime::parse_from_str(value, f).ok()) {
        return Ok(dt);
    }
    if let Some(date) = formats().find_map(|f| NaiveDate::parse_from_str(value, f).ok()) {
        return Ok(date.and_time(NaiveTime::default()));
    }

    Err(DateParseError::Unrecognized(value.to_string()))
}

/// Parse the Order Date column, drop rows that fail, and append Month, Hour
/// and Year (Int32). Order Date becomes `Datetime(Microseconds)`.
pub fn normalize<S: AsRef<str>>(
    df: &DataFrame,
    formats: &[S],
) -> Result<(DataFrame, NormalizationReport)> {
    let column = df
        .column(ORDER_DATE)
        .map_err(|_| DashboardError::missing(ORDER_DATE))?;
    let text = column.cast(&DataType::String)?;
    let text = text.as_materialized_series().str()?;

    let mut keep = Vec::with_capacity(df.height());
    let mut parsed = Vec::with_capacity(df.height());
    let mut skipped = Vec::new();
    for (row, value) in text.into_iter().enumerate() {
        match parse_order_date(value.unwrap_or(""), formats) {
            Ok(dt) => {
                keep.push(true);
                parsed.push(dt);
            }
            Err(error) => {
                keep.push(false);
                skipped.push(SkippedRow {
                    row,
                    value: value.unwrap_or_default().to_string(),
                    error,
                });
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut out = df.filter(&mask)?;

    let micros: Vec<i64> = parsed
        .iter()
        .map(|dt| dt.and_utc().timestamp_micros())
        .collect();
    let order_dates = Series::new(ORDER_DATE.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    let months: Vec<i32> = parsed.iter().map(|dt| dt.month() as i32).collect();
    let hours: Vec<i32> = parsed.iter().map(|dt| dt.hour() as i32).collect();
    let years: Vec<i32> = parsed.iter().map(|dt| dt.year()).collect();

    out.with_column(order_dates)?;
    out.with_column(Series::new(MONTH.into(), months))?;
    out.with_column(Series::new(HOUR.into(), hours))?;
    out.with_column(Series::new(YEAR.into(), years))?;

    let report = NormalizationReport {
        rows_before: df.height(),
        rows_after: out.height(),
        skipped,
    };
    if report.skipped_count() > 0 {
        log::warn!(
            "Dropped {} rows with an unparseable {}",
            report.skipped_count(),
            ORDER_DATE
        );
        for s in report.skipped.iter().take(10) {
            log::debug!("row {}: {}", s.row, s.error);
        }
    }

    Ok((out, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_default_formats() {
        let cases = [
            ("2023-01-05 10:00", at(2023, 1, 5, 10, 0)),
            ("2023-01-05 10:00:00", at(2023, 1, 5, 10, 0)),
            ("2023-01-05T23:15", at(2023, 1, 5, 23, 15)),
            ("01/05/2023 10:00", at(2023, 1, 5, 10, 0)),
            ("01-05-2023 10:00", at(2023, 1, 5, 10, 0)),
            ("2023-01-05", at(2023, 1, 5, 0, 0)),
            ("  2023/01/05  ", at(2023, 1, 5, 0, 0)),
            ("2023-01-05T10:00:00+05:30", at(2023, 1, 5, 10, 0)),
        ];
        for (input, expected) in cases {
            assert_eq!(
                parse_order_date(input, DEFAULT_DATE_FORMATS),
                Ok(expected),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_dash_dates_are_month_first() {
        let dt = parse_order_date("05-01-2023 10:00", DEFAULT_DATE_FORMATS).unwrap();
        assert_eq!(dt, at(2023, 5, 1, 10, 0));
        assert_eq!(dt.month(), 5);
        assert_eq!(
            parse_order_date("05-01-2023", DEFAULT_DATE_FORMATS),
            Ok(at(2023, 5, 1, 0, 0))
        );
        // Day 25 cannot be a month
        assert!(parse_order_date("25-01-2023", DEFAULT_DATE_FORMATS).is_err());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_milli_opt(10, 0, 0, 250)
            .unwrap();
        assert_eq!(
            parse_order_date("2023-01-05 10:00:00.250", DEFAULT_DATE_FORMATS),
            Ok(expected)
        );
        assert_eq!(
            parse_order_date("2023-01-05T10:00:00.250", DEFAULT_DATE_FORMATS),
            Ok(expected)
        );
        assert_eq!(
            parse_order_date("2023-01-05 10:00:00", DEFAULT_DATE_FORMATS),
            Ok(at(2023, 1, 5, 10, 0))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_order_date("bad", DEFAULT_DATE_FORMATS),
            Err(DateParseError::Unrecognized("bad".to_string()))
        );
        assert_eq!(
            parse_order_date("  ", DEFAULT_DATE_FORMATS),
            Err(DateParseError::Empty)
        );
        assert!(parse_order_date("2023-13-40", DEFAULT_DATE_FORMATS).is_err());
    }

    #[test]
    fn test_normalize_drops_and_reports() {
        let df = df!(
            "Order Date" => &["2023-01-05 10:00", "bad", "2024-12-31 23:59"],
            "Amount" => &[100i64, 50, 7]
        )
        .unwrap();

        let (out, report) = normalize(&df, DEFAULT_DATE_FORMATS).unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(report.rows_before, 3);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].row, 1);
        assert_eq!(report.skipped[0].value, "bad");

        let months: Vec<Option<i32>> = out.column("Month").unwrap().i32().unwrap().into_iter().collect();
        let hours: Vec<Option<i32>> = out.column("Hour").unwrap().i32().unwrap().into_iter().collect();
        let years: Vec<Option<i32>> = out.column("Year").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(months, vec![Some(1), Some(12)]);
        assert_eq!(hours, vec![Some(10), Some(23)]);
        assert_eq!(years, vec![Some(2023), Some(2024)]);
        assert!(matches!(
            out.column("Order Date").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Microseconds, None)
        ));
    }

    #[test]
    fn test_normalize_missing_column() {
        let df = df!("Amount" => &[1i64]).unwrap();
        let err = normalize(&df, DEFAULT_DATE_FORMATS).unwrap_err();
        assert_eq!(
            crate::error::dashboard_error(&err),
            Some(&DashboardError::missing("Order Date"))
        );
    }

    #[test]
    fn test_custom_formats() {
        let formats = vec!["%d.%m.%Y %H:%M".to_string()];
        assert_eq!(
            parse_order_date("05.01.2023 10:00", &formats),
            Ok(at(2023, 1, 5, 10, 0))
        );
    }
}
