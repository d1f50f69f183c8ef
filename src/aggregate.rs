//! Group-by-and-reduce helpers shared by the KPI and chart computations.

use color_eyre::Result;
use polars::prelude::*;
use std::cmp::Ordering;

use crate::error::DashboardError;

const VALUE: &str = "__value";

/// How each group is reduced to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce<'a> {
    /// Sum of a numeric column
    Sum(&'a str),
    /// Number of rows in the group
    Count,
}

/// Fail with [`DashboardError::MissingField`] on the first absent column.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    match columns
        .iter()
        .find(|c| df.get_column_index(c).is_none())
    {
        Some(missing) => Err(DashboardError::missing(missing).into()),
        None => Ok(()),
    }
}

/// Group `df` by `key` and reduce each group. Groups come back ordered by key
/// ascending (numeric order for numeric keys); labels are the key rendered as text.
pub fn grouped(df: &DataFrame, key: &str, reduce: Reduce<'_>) -> Result<Vec<(String, f64)>> {
    match reduce {
        Reduce::Sum(value) => require_columns(df, &[key, value])?,
        Reduce::Count => require_columns(df, &[key])?,
    }

    let agg = match reduce {
        Reduce::Sum(value) => col(value).cast(DataType::Float64).sum(),
        Reduce::Count => len(),
    };

    let out = df
        .clone()
        .lazy()
        .group_by([col(key)])
        .agg([agg.alias(VALUE)])
        .sort([key], SortMultipleOptions::default())
        .collect()?;

    let keys = out.column(key)?.cast(&DataType::String)?;
    let keys = keys.as_materialized_series().str()?;
    let values = out.column(VALUE)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    Ok(keys
        .into_iter()
        .zip(values)
        .map(|(k, v)| (k.unwrap_or("null").to_string(), v.unwrap_or(0.0)))
        .collect())
}

/// Stable sort by value, largest first. Equal values keep their key order.
pub fn sort_descending(groups: &mut [(String, f64)]) {
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}

/// Key of the group with the largest value; ties go to the lexicographically
/// smallest key. `None` when there are no groups.
pub fn argmax(groups: &[(String, f64)]) -> Option<&str> {
    groups
        .iter()
        .filter(|(_, v)| !v.is_nan())
        .fold(None::<&(String, f64)>, |best, g| match best {
            Some(b) if b.1 > g.1 || (b.1 == g.1 && b.0 <= g.0) => Some(b),
            _ => Some(g),
        })
        .map(|(k, _)| k.as_str())
}

/// First value of a one-row result column as f64 (null reads as 0).
pub fn scalar_f64(df: &DataFrame, name: &str) -> Result<f64> {
    Ok(df.column(name)?.get(0)?.extract::<f64>().unwrap_or(0.0))
}
