//! Chart aggregations: one `(label, value)` series per [`ChartKind`].

use color_eyre::Result;
use polars::prelude::*;
use salesdash_cli::ChartKind;
use serde::Serialize;

use crate::aggregate::{grouped, sort_descending, Reduce};
use crate::columns::{AMOUNT, CATEGORY, CITY, MONTH, PAYMENT_MODE, PROFIT, SUB_CATEGORY};

/// Number of groups kept by [`ChartKind::TopSubCategories`].
pub const TOP_N: usize = 10;

/// How a series is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    Bar,
    HorizontalBar,
    Line,
    Pie,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    #[serde(skip)]
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub style: ChartStyle,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Each point's share of the total (all 0 when the total is 0).
    pub fn proportions(&self) -> Vec<f64> {
        let total = self.total();
        self.points
            .iter()
            .map(|p| if total == 0.0 { 0.0 } else { p.value / total })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }

    pub fn min_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::min)
    }
}

enum Order {
    ByKey,
    ByValueDesc,
}

struct Recipe<'a> {
    key: &'a str,
    reduce: Reduce<'a>,
    order: Order,
    limit: Option<usize>,
    style: ChartStyle,
    y_label: &'a str,
}

fn recipe(kind: ChartKind) -> Recipe<'static> {
    match kind {
        ChartKind::SalesByMonth => Recipe {
            key: MONTH,
            reduce: Reduce::Sum(AMOUNT),
            order: Order::ByKey,
            limit: None,
            style: ChartStyle::Bar,
            y_label: AMOUNT,
        },
        ChartKind::SalesByCity => Recipe {
            key: CITY,
            reduce: Reduce::Sum(AMOUNT),
            order: Order::ByValueDesc,
            limit: None,
            style: ChartStyle::HorizontalBar,
            y_label: AMOUNT,
        },
        ChartKind::TopSubCategories => Recipe {
            key: SUB_CATEGORY,
            reduce: Reduce::Sum(PROFIT),
            order: Order::ByValueDesc,
            limit: Some(TOP_N),
            style: ChartStyle::HorizontalBar,
            y_label: PROFIT,
        },
        ChartKind::MonthlyProfit => Recipe {
            key: MONTH,
            reduce: Reduce::Sum(PROFIT),
            order: Order::ByKey,
            limit: None,
            style: ChartStyle::Line,
            y_label: PROFIT,
        },
        ChartKind::OrdersByCategory => Recipe {
            key: CATEGORY,
            reduce: Reduce::Count,
            order: Order::ByValueDesc,
            limit: None,
            style: ChartStyle::Pie,
            y_label: "Orders",
        },
        ChartKind::PaymentModes => Recipe {
            key: PAYMENT_MODE,
            reduce: Reduce::Count,
            order: Order::ByValueDesc,
            limit: None,
            style: ChartStyle::Pie,
            y_label: "Orders",
        },
    }
}

/// Compute the series for `kind`. Month-keyed kinds come back in month order;
/// everything else by value descending with ties going to the smaller key.
/// An empty table gives an empty series.
pub fn aggregate(df: &DataFrame, kind: ChartKind) -> Result<ChartSeries> {
    let recipe = recipe(kind);
    let mut groups = grouped(df, recipe.key, recipe.reduce)?;

    if let Order::ByValueDesc = recipe.order {
        sort_descending(&mut groups);
    }
    if let Some(limit) = recipe.limit {
        groups.truncate(limit);
    }

    Ok(ChartSeries {
        kind,
        title: kind.label().to_string(),
        x_label: recipe.key.to_string(),
        y_label: recipe.y_label.to_string(),
        style: recipe.style,
        points: groups
            .into_iter()
            .map(|(label, value)| ChartPoint { label, value })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{dashboard_error, DashboardError};

    fn cleaned() -> DataFrame {
        df!(
            "Month" => &[1i32, 1, 2, 12],
            "Amount" => &[100i64, 50, 200, 10],
            "Profit" => &[10i64, 5, -20, 1],
            "City" => &["X", "Y", "X", "Z"],
            "Category" => &["Tech", "Home", "Tech", "Home"],
            "Sub-Category" => &["Phones", "Beds", "Laptops", "Lamps"],
            "PaymentMode" => &["UPI", "Card", "UPI", "UPI"]
        )
        .unwrap()
    }

    fn labels(series: &ChartSeries) -> Vec<&str> {
        series.points.iter().map(|p| p.label.as_str()).collect()
    }

    fn values(series: &ChartSeries) -> Vec<f64> {
        series.points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_sales_by_month() {
        let s = aggregate(&cleaned(), ChartKind::SalesByMonth).unwrap();
        assert_eq!(labels(&s), vec!["1", "2", "12"]);
        assert_eq!(values(&s), vec![150.0, 200.0, 10.0]);
        assert_eq!(s.style, ChartStyle::Bar);
        assert_eq!(s.title, "Total Amount by Month");
    }

    #[test]
    fn test_sales_by_city_descending() {
        let s = aggregate(&cleaned(), ChartKind::SalesByCity).unwrap();
        assert_eq!(labels(&s), vec!["X", "Y", "Z"]);
        assert_eq!(values(&s), vec![300.0, 50.0, 10.0]);
        assert_eq!(s.style, ChartStyle::HorizontalBar);
    }

    #[test]
    fn test_monthly_profit_line() {
        let s = aggregate(&cleaned(), ChartKind::MonthlyProfit).unwrap();
        assert_eq!(values(&s), vec![15.0, -20.0, 1.0]);
        assert_eq!(s.style, ChartStyle::Line);
    }

    #[test]
    fn test_pie_counts_and_tie_order() {
        let s = aggregate(&cleaned(), ChartKind::OrdersByCategory).unwrap();
        assert_eq!(labels(&s), vec!["Home", "Tech"]);
        assert_eq!(values(&s), vec![2.0, 2.0]);
        assert_eq!(s.total(), cleaned().height() as f64);
        assert_eq!(s.proportions(), vec![0.5, 0.5]);

        let s = aggregate(&cleaned(), ChartKind::PaymentModes).unwrap();
        assert_eq!(labels(&s), vec!["UPI", "Card"]);
    }

    #[test]
    fn test_top_sub_categories_truncates() {
        let names: Vec<String> = (0..15).map(|i| format!("S{i:02}")).collect();
        let profits: Vec<i64> = (0..15).collect();
        let df = df!("Sub-Category" => names, "Profit" => profits).unwrap();
        let s = aggregate(&df, ChartKind::TopSubCategories).unwrap();
        assert_eq!(s.points.len(), TOP_N);
        assert_eq!(s.points[0].label, "S14");
        assert_eq!(s.points[9].label, "S05");
    }

    #[test]
    fn test_missing_column() {
        let df = cleaned().drop("PaymentMode").unwrap();
        let err = aggregate(&df, ChartKind::PaymentModes).unwrap_err();
        assert_eq!(
            dashboard_error(&err),
            Some(&DashboardError::missing("PaymentMode"))
        );
    }

    #[test]
    fn test_empty_table_gives_empty_series() {
        let df = cleaned().head(Some(0));
        for kind in ChartKind::ALL {
            let s = aggregate(&df, kind).unwrap();
            assert!(s.is_empty(), "{:?}", kind);
            assert!(s.proportions().is_empty());
        }
    }
}
