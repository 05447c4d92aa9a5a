//! Rolling median sales by store creation month

use polars::prelude::*;
use tracing::debug;

use crate::data::{StoreTable, YearMonth, CREATED_MONTH_COLUMN, SALES_COLUMN};
use crate::figure::{AxisFormat, Figure, LineChart};
use crate::stats::{below_outlier_cap, trailing_mean};

/// Months averaged by the trailing window
pub const ROLLING_WINDOW: usize = 3;

const MEDIAN_COLUMN: &str = "median_sales";
const ROLLING_COLUMN: &str = "rolling_median_sales";

/// Median sales per creation month, months ascending
///
/// Rows at or above the sales 99th percentile and rows without a parsed
/// creation month are left out. The percentile is taken over every row.
fn monthly_median_frame(frame: DataFrame) -> LazyFrame {
    frame
        .lazy()
        .filter(below_outlier_cap(SALES_COLUMN).and(col(CREATED_MONTH_COLUMN).is_not_null()))
        .group_by([col(CREATED_MONTH_COLUMN)])
        .agg([col(SALES_COLUMN).median().alias(MEDIAN_COLUMN)])
        .sort_by_exprs([col(CREATED_MONTH_COLUMN)], SortMultipleOptions::default())
}

/// Pair each month ordinal with the value in `value_column`
fn month_values(frame: &DataFrame, value_column: &str) -> crate::Result<Vec<(YearMonth, f64)>> {
    let months = frame.column(CREATED_MONTH_COLUMN)?.as_materialized_series().i64()?;
    let values = frame
        .column(value_column)?
        .cast(&DataType::Float64)?;
    let points = months
        .into_iter()
        .zip(values.as_materialized_series().f64()?)
        .filter_map(|(month, value)| Some((YearMonth::from_ordinal(month?)?, value?)))
        .collect();
    Ok(points)
}

/// Median sales per creation month
///
/// `frame` holds the `created_month` ordinals and the `Float64` sales column.
pub fn monthly_medians(frame: DataFrame) -> crate::Result<Vec<(YearMonth, f64)>> {
    let medians = monthly_median_frame(frame).collect()?;
    month_values(&medians, MEDIAN_COLUMN)
}

/// Trailing 3-month mean of the monthly medians
pub fn rolling_medians(frame: DataFrame) -> crate::Result<Vec<(YearMonth, f64)>> {
    let rolled = monthly_median_frame(frame)
        .with_column(trailing_mean(col(MEDIAN_COLUMN), ROLLING_WINDOW).alias(ROLLING_COLUMN))
        .collect()?;
    month_values(&rolled, ROLLING_COLUMN)
}

pub fn build(table: &StoreTable) -> crate::Result<Figure> {
    let months = table.created_months()?;
    let unparsed = months.null_count();
    if unparsed > 0 {
        debug!(unparsed, "creation dates that could not be parsed were left out");
    }

    let frame = DataFrame::new(vec![months, table.numeric_column(SALES_COLUMN)?])?;
    let points = rolling_medians(frame)?;

    Ok(Figure::Line {
        stem: "sales_trend",
        chart: LineChart {
            title: "3-Month Rolling Median Sales by Store Creation Month (Top 1% Outliers Removed)"
                .to_string(),
            x_label: "Store Creation Month".to_string(),
            y_label: "3-Month Rolling Median Sales".to_string(),
            points,
            y_format: AxisFormat::Currency,
        },
    })
}
