//! Report pipeline: load, resolve, then run every gated chart generator

use std::fmt;
use std::path::Path;

use tracing::{info, warn};

use crate::charts::ChartKind;
use crate::data::{load_store_table, resolve_region_column, StoreTable};
use crate::viz::Renderer;

/// A chart left out because the table lacks columns it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSkip {
    pub chart: ChartKind,
    pub missing: Vec<&'static str>,
}

impl fmt::Display for ChartSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.missing.iter().map(|c| format!("'{c}'")).collect();
        let noun = if self.missing.len() == 1 { "Column" } else { "Columns" };
        write!(
            f,
            "{noun} {} not found; skipping {}.",
            quoted.join(" and "),
            self.chart
        )
    }
}

/// Outcome of one report run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub rendered: Vec<ChartKind>,
    pub skipped: Vec<ChartSkip>,
}

impl ReportSummary {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Load the export, resolve the region column, and render every chart
///
/// Load failures and a missing region column abort the run; charts whose
/// other columns are absent are skipped with a warning.
pub fn run(input: &Path, renderer: &mut dyn Renderer) -> crate::Result<ReportSummary> {
    let table = load_store_table(input)?;
    info!("Data loaded: {} stores", table.height());

    let region_column = resolve_region_column(&table)?;
    info!("Using '{}' as the state column", region_column);

    generate_report(&table, region_column, renderer)
}

/// Run the five chart generators in order against an already loaded table
pub fn generate_report(
    table: &StoreTable,
    region_column: &'static str,
    renderer: &mut dyn Renderer,
) -> crate::Result<ReportSummary> {
    let mut summary = ReportSummary::default();

    for chart in ChartKind::ALL {
        let missing: Vec<&'static str> = chart
            .required_columns(region_column)
            .into_iter()
            .filter(|column| !table.has_column(column))
            .collect();

        if !missing.is_empty() {
            let skip = ChartSkip { chart, missing };
            warn!("{skip}");
            summary.skipped.push(skip);
            continue;
        }

        let figure = chart.build(table, region_column)?;
        renderer.render(&figure)?;
        summary.rendered.push(chart);
    }

    Ok(summary)
}
