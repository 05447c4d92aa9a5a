//! The five chart generators and their column requirements

pub mod marketing;
pub mod regional;
pub mod sales_trend;
pub mod technology;
pub mod traffic;

use polars::prelude::*;

use crate::data::{
    StoreTable, APPS_COLUMN, CREATED_COLUMN, PAGEVIEWS_COLUMN, SALES_COLUMN, TECHNOLOGIES_COLUMN,
};
use crate::figure::Figure;

/// Number of entries shown on the ranked bar charts
pub const TOP_N: usize = 10;

const COUNT_COLUMN: &str = "count";

/// Every chart the report knows how to draw, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    MarketingApps,
    StoreDistribution,
    TrafficVsSales,
    SalesTrend,
    Technologies,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::MarketingApps,
        ChartKind::StoreDistribution,
        ChartKind::TrafficVsSales,
        ChartKind::SalesTrend,
        ChartKind::Technologies,
    ];

    /// Human readable name used in progress and skip messages
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::MarketingApps => "Marketing Apps chart",
            ChartKind::StoreDistribution => "store distribution pie chart",
            ChartKind::TrafficVsSales => "scatter plot",
            ChartKind::SalesTrend => "line chart",
            ChartKind::Technologies => "Top 10 Technologies chart",
        }
    }

    /// Columns that must exist for this chart to be drawn
    pub fn required_columns(self, region_column: &'static str) -> Vec<&'static str> {
        match self {
            ChartKind::MarketingApps => vec![APPS_COLUMN],
            ChartKind::StoreDistribution => vec![region_column],
            ChartKind::TrafficVsSales => vec![PAGEVIEWS_COLUMN, SALES_COLUMN],
            ChartKind::SalesTrend => vec![CREATED_COLUMN, SALES_COLUMN],
            ChartKind::Technologies => vec![TECHNOLOGIES_COLUMN],
        }
    }

    /// Derive the chart's data from the table
    pub fn build(self, table: &StoreTable, region_column: &'static str) -> crate::Result<Figure> {
        match self {
            ChartKind::MarketingApps => marketing::build(table),
            ChartKind::StoreDistribution => regional::build(table, region_column),
            ChartKind::TrafficVsSales => traffic::build(table),
            ChartKind::SalesTrend => sales_trend::build(table),
            ChartKind::Technologies => technology::build(table),
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable sort by descending count; equal counts keep their incoming order
pub(crate) fn rank_descending<T>(mut counts: Vec<(T, usize)>, limit: usize) -> Vec<(T, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Count rows per distinct non-null value of `key`, most frequent first
///
/// Ties keep the order in which the values first appear. With a `limit`
/// only that many leading entries are returned.
pub(crate) fn value_counts(
    frame: DataFrame,
    key: &str,
    limit: Option<usize>,
) -> crate::Result<Vec<(String, usize)>> {
    let mut counts = frame
        .lazy()
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort_by_exprs(
            [col(COUNT_COLUMN)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        );
    if let Some(limit) = limit {
        counts = counts.limit(IdxSize::try_from(limit)?);
    }
    let counts = counts.collect()?;

    let keys = counts.column(key)?.cast(&DataType::String)?;
    let totals = counts.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    let ranked = keys
        .as_materialized_series()
        .str()?
        .into_iter()
        .zip(totals.as_materialized_series().u64()?)
        .filter_map(|(key, total)| Some((key?.to_string(), usize::try_from(total?).ok()?)))
        .collect();
    Ok(ranked)
}
