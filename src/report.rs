//! Text and JSON rendering of a [`Dashboard`] for `--output`.

use color_eyre::Result;
use std::fmt::Write;

use crate::chart_data::ChartSeries;
use crate::metrics::KpiSet;
use crate::Dashboard;

const BAR_WIDTH: usize = 40;

/// Group the integer part of `value` in thousands: `1234567.891, 2` → `1,234,567.89`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn money(symbol: &str, value: f64, decimals: usize) -> String {
    let amount = format_thousands(value, decimals);
    match amount.strip_prefix('-') {
        Some(abs) => format!("-{symbol}{abs}"),
        None => format!("{symbol}{amount}"),
    }
}

/// KPI panel rows as `(label, formatted value)` in display order.
pub fn kpi_entries(kpis: &KpiSet, currency: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Total Sales", money(currency, kpis.total_sales, 0)),
        ("Total Orders", format_thousands(kpis.total_orders as f64, 0)),
        ("Avg Order Value", money(currency, kpis.average_order_value, 2)),
        ("Total Profit", money(currency, kpis.total_profit, 0)),
        ("Avg Profit Margin", format!("{:.2}%", kpis.avg_profit_margin)),
        ("Avg Items/Order", format!("{:.2}", kpis.avg_items_per_order)),
        ("Avg Orders/Day", format!("{:.2}", kpis.orders_per_day)),
        ("Top City", kpis.top_city.clone()),
        ("Top State", kpis.top_state.clone()),
    ]
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn heading(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

/// Horizontal text bars scaled to the largest magnitude; pie kinds also show shares.
pub fn render_chart_text(series: &ChartSeries) -> Result<String> {
    let mut out = String::new();
    if series.is_empty() {
        out.push_str("(no data)\n");
        return Ok(out);
    }

    let label_width = series
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);
    let scale = series
        .points
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0, f64::max);
    let shares = series.proportions();

    for (point, share) in series.points.iter().zip(shares) {
        let len = if scale == 0.0 {
            0
        } else {
            ((point.value.abs() / scale) * BAR_WIDTH as f64).round() as usize
        };
        let bar = if point.value < 0.0 { "-" } else { "#" }.repeat(len);
        write!(
            out,
            "{:<width$}  {:<bar_width$}  {}",
            point.label,
            bar,
            format_thousands(point.value, 2),
            width = label_width,
            bar_width = BAR_WIDTH
        )?;
        if series.style == crate::ChartStyle::Pie {
            write!(out, " ({:.1}%)", share * 100.0)?;
        }
        out.push('\n');
    }
    Ok(out)
}

/// All dashboard panels as plain text.
pub fn render_text(dashboard: &Dashboard, source: &str, currency: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Sales dashboard: {source}")?;

    heading(&mut out, "Raw Data Preview")?;
    writeln!(out, "{}", dashboard.raw_preview.columns.join(" | "))?;
    for row in &dashboard.raw_preview.rows {
        writeln!(out, "{}", row.join(" | "))?;
    }

    heading(&mut out, "Columns")?;
    writeln!(out, "{}", dashboard.columns.join(", "))?;
    let missing = dashboard.missing_expected_columns();
    if !missing.is_empty() {
        writeln!(out, "Not found: {}", missing.join(", "))?;
    }

    let cleaning = &dashboard.cleaning;
    heading(&mut out, "Data Cleaning")?;
    writeln!(out, "Missing values before cleaning:")?;
    for n in &cleaning.nulls_before {
        writeln!(out, "  {:<20} {}", n.column, n.nulls)?;
    }
    writeln!(out, "Duplicate rows before cleaning: {}", cleaning.duplicates_before)?;
    writeln!(
        out,
        "Rows: {} -> {} (missing after: {}, duplicates after: {})",
        cleaning.rows_before,
        cleaning.rows_after,
        cleaning.total_nulls_after(),
        cleaning.duplicates_after
    )?;

    let normalization = &dashboard.normalization;
    if normalization.skipped_count() > 0 {
        writeln!(
            out,
            "{} rows skipped: unparseable Order Date",
            normalization.skipped_count()
        )?;
    }

    heading(&mut out, "Data Types")?;
    for t in &dashboard.dtypes {
        writeln!(out, "  {:<20} {}", t.name, t.dtype)?;
    }

    heading(&mut out, "Summary Statistics")?;
    writeln!(
        out,
        "  {:<14} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for s in &dashboard.summary {
        writeln!(
            out,
            "  {:<14} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            s.name,
            s.count,
            opt(s.mean),
            opt(s.std),
            opt(s.min),
            opt(s.q25),
            opt(s.median),
            opt(s.q75),
            opt(s.max)
        )?;
    }

    heading(&mut out, "Key Business Indicators")?;
    for (label, value) in kpi_entries(&dashboard.kpis, currency) {
        writeln!(out, "  {:<18} {}", label, value)?;
    }

    heading(&mut out, dashboard.chart.title.as_str())?;
    out.push_str(&render_chart_text(&dashboard.chart)?);
    Ok(out)
}

/// The dashboard as one JSON object with a `source` key added.
pub fn render_json(dashboard: &Dashboard, source: &str) -> Result<String> {
    let mut value = serde_json::to_value(dashboard)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("source".to_string(), serde_json::Value::from(source));
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1234.0, 0), "1,234");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-1500.5, 1), "-1,500.5");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_money() {
        assert_eq!(money("₹", 350.0, 0), "₹350");
        assert_eq!(money("$", -1234.5, 2), "-$1,234.50");
    }

    #[test]
    fn test_chart_text_bars_and_shares() {
        use crate::chart_data::{ChartPoint, ChartStyle};
        use salesdash_cli::ChartKind;

        let mut series = ChartSeries {
            kind: ChartKind::PaymentModes,
            title: "Payment Mode Analysis".to_string(),
            x_label: "PaymentMode".to_string(),
            y_label: "Orders".to_string(),
            style: ChartStyle::Pie,
            points: vec![
                ChartPoint {
                    label: "UPI".to_string(),
                    value: 3.0,
                },
                ChartPoint {
                    label: "COD".to_string(),
                    value: 1.0,
                },
            ],
        };
        let text = render_chart_text(&series).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("UPI  ") && lines[0].ends_with("3.00 (75.0%)"));
        assert!(lines[1].contains(&"#".repeat(13)));

        series.points.clear();
        assert_eq!(render_chart_text(&series).unwrap(), "(no data)\n");
    }

    #[test]
    fn test_kpi_entries_formatting() {
        let kpis = KpiSet {
            total_sales: 1500.0,
            total_profit: 150.0,
            total_orders: 2,
            average_order_value: 750.0,
            avg_profit_margin: 10.0,
            avg_items_per_order: 1.5,
            orders_per_day: 2.0,
            top_city: "X".to_string(),
            top_state: "S".to_string(),
        };
        let entries = kpi_entries(&kpis, "₹");
        assert_eq!(entries[0], ("Total Sales", "₹1,500".to_string()));
        assert_eq!(entries[2], ("Avg Order Value", "₹750.00".to_string()));
        assert_eq!(entries[4], ("Avg Profit Margin", "10.00%".to_string()));
        assert_eq!(entries[7], ("Top City", "X".to_string()));
    }
}
