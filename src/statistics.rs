//! Data type and descriptive statistics panels.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

/// One row of the data-type panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    pub name: String,
    pub dtype: String,
}

/// Describe-style summary of one numeric column. Every field but `count` is
/// `None` when the column has no non-null values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); `None` below two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

pub fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn dtype_summary(df: &DataFrame) -> Vec<ColumnType> {
    df.get_columns()
        .iter()
        .map(|c| ColumnType {
            name: c.name().to_string(),
            dtype: c.dtype().to_string(),
        })
        .collect()
}

/// Summaries for every numeric column, in column order.
pub fn describe(df: &DataFrame) -> Result<Vec<ColumnSummary>> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_type(c.dtype()))
        .map(|c| summarize(c.as_materialized_series()))
        .collect()
}

fn summarize(series: &Series) -> Result<ColumnSummary> {
    let cast = series.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = cast
        .f64()?
        .iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let present = Series::new(series.name().clone(), &values);
    let mean = present.mean();
    // Sample std (ddof=1)
    let std = if count > 1 { present.std(1) } else { None };

    Ok(ColumnSummary {
        name: series.name().to_string(),
        count,
        mean,
        std,
        min: values.first().copied(),
        q25: percentile(&values, 0.25),
        median: percentile(&values, 0.5),
        q75: percentile(&values, 0.75),
        max: values.last().copied(),
    })
}

/// Linear-interpolated percentile of sorted values, `q` in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_linear() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 0.25), Some(1.75));
        assert_eq!(percentile(&v, 0.5), Some(2.5));
        assert_eq!(percentile(&v, 1.0), Some(4.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn test_describe_numeric_only() {
        let df = df!(
            "City" => &["X", "Y", "Z"],
            "Amount" => &[10i64, 20, 30],
            "Profit" => &[Some(1.5f64), None, Some(2.5)]
        )
        .unwrap();

        let summary = describe(&df).unwrap();
        assert_eq!(summary.len(), 2);

        let amount = &summary[0];
        assert_eq!(amount.name, "Amount");
        assert_eq!(amount.count, 3);
        assert!((amount.mean.unwrap() - 20.0).abs() < 1e-9);
        assert!((amount.std.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(amount.min, Some(10.0));
        assert_eq!(amount.median, Some(20.0));
        assert_eq!(amount.max, Some(30.0));

        assert_eq!(summary[1].count, 2);
    }

    #[test]
    fn test_describe_single_value_and_nan() {
        let df = df!("Profit" => &[Some(4.0f64), Some(f64::NAN), None]).unwrap();
        let summary = describe(&df).unwrap();
        assert_eq!(summary[0].count, 1);
        assert_eq!(summary[0].mean, Some(4.0));
        assert_eq!(summary[0].std, None);
        assert_eq!(summary[0].median, Some(4.0));
    }

    #[test]
    fn test_describe_empty_column() {
        let df = df!("Amount" => &[None::<f64>, None]).unwrap();
        let summary = describe(&df).unwrap();
        assert_eq!(summary[0].count, 0);
        assert_eq!(summary[0].mean, None);
        assert_eq!(summary[0].std, None);
        assert_eq!(summary[0].q25, None);
    }

    #[test]
    fn test_dtype_summary() {
        let df = df!("City" => &["X"], "Amount" => &[1i64]).unwrap();
        let types = dtype_summary(&df);
        assert_eq!(types[0].name, "City");
        assert_eq!(types[0].dtype, "str");
        assert_eq!(types[1].dtype, "i64");
    }
}
