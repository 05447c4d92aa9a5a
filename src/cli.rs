//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::viz::ImageFormat;

/// File looked for on the desktop when no input is given
pub const DEFAULT_INPUT_FILE: &str = "Shopifycleaned_US.csv";

/// Render descriptive charts from an e-commerce store export
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file [default: ~/Desktop/Shopifycleaned_US.csv]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory the chart images are written to
    #[arg(short, long, default_value = "charts")]
    pub output_dir: PathBuf,

    /// Image format for the charts
    #[arg(short, long, value_enum, default_value_t = ImageFormat::Png)]
    pub format: ImageFormat,

    /// Canvas width in pixels for every chart (requires --height)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Canvas height in pixels for every chart (requires --width)
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The CSV to read: `--input`, else the export on the user's desktop
    pub fn input_path(&self) -> crate::Result<PathBuf> {
        if let Some(ref input) = self.input {
            return Ok(input.clone());
        }
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or_else(|| anyhow::anyhow!("Cannot locate the home directory; pass --input"))?;
        Ok(PathBuf::from(home).join("Desktop").join(DEFAULT_INPUT_FILE))
    }

    /// Fixed canvas size when both dimensions were given
    pub fn canvas_size(&self) -> crate::Result<Option<(u32, u32)>> {
        match (self.width, self.height) {
            (Some(0), _) | (_, Some(0)) => anyhow::bail!("Canvas dimensions must be positive"),
            (Some(width), Some(height)) => Ok(Some((width, height))),
            _ => Ok(None),
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["storechart"]);
        assert_eq!(args.output_dir, PathBuf::from("charts"));
        assert_eq!(args.format, ImageFormat::Png);
        assert_eq!(args.canvas_size().unwrap(), None);
        assert_eq!(args.default_log_filter(), "info");
    }

    #[test]
    fn test_explicit_input_wins() {
        let args = Args::parse_from(["storechart", "--input", "stores.csv", "-f", "svg", "-v"]);
        assert_eq!(args.input_path().unwrap(), PathBuf::from("stores.csv"));
        assert_eq!(args.format, ImageFormat::Svg);
        assert_eq!(args.default_log_filter(), "debug");
    }

    #[test]
    fn test_canvas_size() {
        let mut args = Args::parse_from(["storechart", "--width", "1200", "--height", "800"]);
        assert_eq!(args.canvas_size().unwrap(), Some((1200, 800)));

        args.width = Some(0);
        assert!(args.canvas_size().is_err());

        assert!(Args::try_parse_from(["storechart", "--width", "1200"]).is_err());
    }
}
