//! Monthly pageviews against monthly sales, top 1% of either removed

use polars::prelude::*;
use tracing::debug;

use crate::data::{StoreTable, PAGEVIEWS_COLUMN, SALES_COLUMN};
use crate::figure::{AxisFormat, Figure, ScatterChart};
use crate::stats::{below_outlier_cap, lowess, LOWESS_FRACTION, LOWESS_ITERATIONS};

/// Pair up pageviews and sales, dropping rows at or above either column's 99th percentile
///
/// `frame` holds the two `Float64` columns; rows missing either value are dropped.
pub fn capped_points(frame: DataFrame) -> crate::Result<Vec<(f64, f64)>> {
    let rows = frame.height();
    let kept = frame
        .lazy()
        .filter(below_outlier_cap(PAGEVIEWS_COLUMN).and(below_outlier_cap(SALES_COLUMN)))
        .collect()?;
    debug!(rows, kept = kept.height(), "scatter outlier filter");

    let views = kept.column(PAGEVIEWS_COLUMN)?.as_materialized_series().f64()?;
    let sales = kept.column(SALES_COLUMN)?.as_materialized_series().f64()?;
    let points = views
        .into_iter()
        .zip(sales)
        .filter_map(|(views, sale)| Some((views?, sale?)))
        .collect();
    Ok(points)
}

pub fn build(table: &StoreTable) -> crate::Result<Figure> {
    let frame = DataFrame::new(vec![
        table.numeric_column(PAGEVIEWS_COLUMN)?,
        table.numeric_column(SALES_COLUMN)?,
    ])?;

    let points = capped_points(frame)?;
    let trend = lowess(&points, LOWESS_FRACTION, LOWESS_ITERATIONS);

    Ok(Figure::Scatter {
        stem: "pageviews_vs_sales",
        chart: ScatterChart {
            title: "Monthly Pageviews vs. Monthly Sales (Capped at 99th Percentile)".to_string(),
            subtitle: Some(
                "Each dot represents one Shopify store. The orange line shows the average trend between traffic and revenue."
                    .to_string(),
            ),
            x_label: "Estimated Monthly Pageviews".to_string(),
            y_label: "Estimated Monthly Sales".to_string(),
            points,
            trend,
            x_format: AxisFormat::Thousands,
            y_format: AxisFormat::Currency,
        },
    })
}
