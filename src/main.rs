//! StoreChart: descriptive charts from an e-commerce store export
//!
//! This is the main entrypoint that wires logging, argument parsing, the
//! report pipeline and the Plotters renderer together.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use storechart::{run, Args, PlottersRenderer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let start_time = Instant::now();
    let input = args.input_path()?;
    info!("Reading store export from {}", input.display());

    // Nothing is written under the output directory until a chart renders
    let mut renderer =
        PlottersRenderer::new(&args.output_dir, args.format).with_size(args.canvas_size()?);
    let summary = run(&input, &mut renderer)?;

    if summary.is_complete() {
        info!("Report complete: {} chart(s) rendered", summary.rendered.len());
    } else {
        warn!(
            "Report incomplete: {} chart(s) rendered, {} skipped",
            summary.rendered.len(),
            summary.skipped.len()
        );
    }
    if args.verbose {
        info!(
            "Charts written to {} in {:.2}s",
            args.output_dir.display(),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
