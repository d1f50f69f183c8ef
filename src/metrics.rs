//! Business KPIs over the Cleaned Table.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::aggregate::{argmax, grouped, require_columns, scalar_f64, Reduce};
use crate::columns::{AMOUNT, CITY, ORDER_DATE, ORDER_ID, PROFIT, QUANTITY, STATE};
use crate::error::DashboardError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Distinct Order IDs
    pub total_orders: u64,
    pub average_order_value: f64,
    /// Percent
    pub avg_profit_margin: f64,
    pub avg_items_per_order: f64,
    pub orders_per_day: f64,
    pub top_city: String,
    pub top_state: String,
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Compute every KPI. Ratios with a zero denominator are 0; an empty table
/// fails with [`DashboardError::EmptyAggregation`] when picking the top city.
pub fn compute_kpis(df: &DataFrame) -> Result<KpiSet> {
    require_columns(
        df,
        &[AMOUNT, PROFIT, ORDER_ID, QUANTITY, ORDER_DATE, CITY, STATE],
    )?;

    let totals = df
        .clone()
        .lazy()
        .select([
            col(AMOUNT).cast(DataType::Float64).sum().alias("sales"),
            col(PROFIT).cast(DataType::Float64).sum().alias("profit"),
            col(QUANTITY).cast(DataType::Float64).sum().alias("quantity"),
            col(ORDER_ID).n_unique().alias("orders"),
        ])
        .collect()?;

    let total_sales = scalar_f64(&totals, "sales")?;
    let total_profit = scalar_f64(&totals, "profit")?;
    let total_quantity = scalar_f64(&totals, "quantity")?;
    let total_orders = scalar_f64(&totals, "orders")? as u64;
    let orders = total_orders as f64;

    let kpis = KpiSet {
        total_sales,
        total_profit,
        total_orders,
        average_order_value: ratio(total_sales, orders),
        avg_profit_margin: ratio(total_profit, total_sales) * 100.0,
        avg_items_per_order: ratio(total_quantity, orders),
        orders_per_day: orders_per_day(df)?,
        top_city: top_group(df, CITY, AMOUNT)?,
        top_state: top_group(df, STATE, AMOUNT)?,
    };
    log::debug!("KPIs: {:?}", kpis);
    Ok(kpis)
}

/// Mean, over distinct calendar dates, of the distinct orders placed that day.
pub fn orders_per_day(df: &DataFrame) -> Result<f64> {
    require_columns(df, &[ORDER_DATE, ORDER_ID])?;
    if df.height() == 0 {
        return Ok(0.0);
    }

    let per_day = df
        .clone()
        .lazy()
        .group_by([col(ORDER_DATE).cast(DataType::Date).alias("day")])
        .agg([col(ORDER_ID).n_unique().alias("orders")])
        .select([col("orders").cast(DataType::Float64).mean().alias("mean")])
        .collect()?;
    scalar_f64(&per_day, "mean")
}

/// Key of the group with the largest `Σ value`; ties go to the smallest key.
pub fn top_group(df: &DataFrame, key: &str, value: &str) -> Result<String> {
    let groups = grouped(df, key, Reduce::Sum(value))?;
    argmax(&groups)
        .map(str::to_string)
        .ok_or_else(|| DashboardError::empty(key).into())
}
