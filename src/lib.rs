//! StoreChart: A Rust CLI that renders descriptive charts from an e-commerce store export
//!
//! This library loads a store CSV with Polars, derives five fixed charts
//! (marketing apps, state distribution, traffic vs sales, sales trend and
//! technologies) and draws them with Plotters.

pub mod charts;
pub mod cli;
pub mod data;
pub mod error;
pub mod figure;
pub mod report;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use charts::ChartKind;
pub use cli::Args;
pub use data::{load_store_table, parse_tokens, resolve_region_column, StoreTable};
pub use error::ReportError;
pub use figure::Figure;
pub use report::{generate_report, run, ChartSkip, ReportSummary};
pub use viz::{ImageFormat, PlottersRenderer, Renderer};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
