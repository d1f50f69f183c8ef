//! Cleaning pipeline: trim headers, report nulls and duplicates, then drop them.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Null cells in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

/// Diagnostics gathered before and after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub nulls_before: Vec<NullCount>,
    /// Rows identical to an earlier row (first occurrence not counted)
    pub duplicates_before: usize,
    pub nulls_after: Vec<NullCount>,
    pub duplicates_after: usize,
}

impl CleaningReport {
    pub fn total_nulls_before(&self) -> usize {
        self.nulls_before.iter().map(|n| n.nulls).sum()
    }

    pub fn total_nulls_after(&self) -> usize {
        self.nulls_after.iter().map(|n| n.nulls).sum()
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Strip leading/trailing whitespace from every column name. A name that
/// collides with an earlier one after trimming gets a `_duplicated_<n>` suffix,
/// the same scheme the CSV reader uses for repeated headers.
pub fn trim_column_names(df: DataFrame) -> Result<DataFrame> {
    if df
        .get_column_names()
        .iter()
        .all(|name| name.trim() == name.as_str())
    {
        return Ok(df);
    }

    let mut taken: HashSet<String> = HashSet::with_capacity(df.width());
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|c| {
            let trimmed = c.name().trim();
            let mut name = trimmed.to_string();
            let mut n = 0;
            while taken.contains(&name) {
                name = format!("{trimmed}_duplicated_{n}");
                n += 1;
            }
            if name != trimmed {
                log::warn!("Column '{}' renamed to '{}' after trimming", c.name(), name);
            }
            taken.insert(name.clone());
            c.clone().with_name(name.into())
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Null cells per column, in column order.
pub fn null_counts(df: &DataFrame) -> Vec<NullCount> {
    df.get_columns()
        .iter()
        .map(|c| NullCount {
            column: c.name().to_string(),
            nulls: c.null_count(),
        })
        .collect()
}

/// Rows that repeat an earlier row across every column.
pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
    if df.width() == 0 || df.height() < 2 {
        return Ok(0);
    }
    let unique = df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(df.height() - unique.height())
}

/// Trim headers, drop rows with any null, then drop exact duplicate rows
/// (first occurrence kept, original order preserved).
pub fn clean(raw: DataFrame) -> Result<(DataFrame, CleaningReport)> {
    let raw = trim_column_names(raw)?;

    let rows_before = raw.height();
    let nulls_before = null_counts(&raw);
    let duplicates_before = duplicate_count(&raw)?;

    let cleaned = if raw.width() == 0 {
        raw
    } else {
        raw.lazy()
            .drop_nulls(None)
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?
    };

    let report = CleaningReport {
        rows_before,
        rows_after: cleaned.height(),
        nulls_before,
        duplicates_before,
        nulls_after: null_counts(&cleaned),
        duplicates_after: duplicate_count(&cleaned)?,
    };

    if report.rows_removed() > 0 {
        log::warn!(
            "Cleaning removed {} of {} rows ({} null cells, {} duplicate rows)",
            report.rows_removed(),
            rows_before,
            report.total_nulls_before(),
            duplicates_before
        );
    }
    log::debug!("Cleaning report: {:?}", report);

    Ok((cleaned, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_column_names() {
        let df = df!(" City " => &["X"], "Amount\t" => &[1i64]).unwrap();
        let df = trim_column_names(df).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["City", "Amount"]);
    }

    #[test]
    fn test_trim_collision_is_renamed() {
        let df = df!(
            "City" => &["X"],
            " City" => &["Y"],
            "City " => &["Z"],
            "Amount" => &[1i64]
        )
        .unwrap();
        let df = trim_column_names(df).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["City", "City_duplicated_0", "City_duplicated_1", "Amount"]
        );

        let (cleaned, report) = clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(report.nulls_before.len(), 4);
    }

    #[test]
    fn test_clean_removes_nulls_then_duplicates() {
        let df = df!(
            "City" => &[Some("X"), Some("X"), None, Some("Y"), Some("X")],
            "Amount" => &[Some(1i64), Some(1), Some(2), None, Some(3)]
        )
        .unwrap();

        let (cleaned, report) = clean(df).unwrap();
        assert_eq!(report.rows_before, 5);
        assert_eq!(report.total_nulls_before(), 2);
        assert_eq!(report.duplicates_before, 1);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.total_nulls_after(), 0);
        assert_eq!(report.duplicates_after, 0);

        let amounts: Vec<Option<i64>> = cleaned.column("Amount").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(amounts, vec![Some(1), Some(3)]);
    }

    #[test]
    fn test_null_rows_counted_as_duplicates_before_cleaning() {
        let df = df!(
            "City" => &[None::<&str>, None],
            "Amount" => &[None::<i64>, None]
        )
        .unwrap();
        assert_eq!(duplicate_count(&df).unwrap(), 1);
        let (cleaned, _) = clean(df).unwrap();
        assert_eq!(cleaned.height(), 0);
    }
}
