//! Renderer-independent chart descriptions

use crate::data::YearMonth;

/// How tick values on a numeric axis are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFormat {
    /// `1,234`
    Thousands,
    /// `$1,234`
    Currency,
}

impl AxisFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            AxisFormat::Thousands => format_thousands(value),
            AxisFormat::Currency => format_currency(value),
        }
    }
}

/// Named colour sequences for bar charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Deep,
    Rocket,
}

/// Horizontal bar chart, bars listed from largest to smallest
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of all counted rows, in percent
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
    /// Degrees counter-clockwise from the positive x axis
    pub start_angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub subtitle: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    /// Smoothed trend, sorted by x
    pub trend: Vec<(f64, f64)>,
    pub x_format: AxisFormat,
    pub y_format: AxisFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(YearMonth, f64)>,
    pub y_format: AxisFormat,
}

/// One chart ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Bar { stem: &'static str, chart: BarChart },
    Pie { stem: &'static str, chart: PieChart },
    Scatter { stem: &'static str, chart: ScatterChart },
    Line { stem: &'static str, chart: LineChart },
}

impl Figure {
    pub fn title(&self) -> &str {
        match self {
            Figure::Bar { chart, .. } => &chart.title,
            Figure::Pie { chart, .. } => &chart.title,
            Figure::Scatter { chart, .. } => &chart.title,
            Figure::Line { chart, .. } => &chart.title,
        }
    }

    /// File name (without extension) the figure is written under
    pub fn file_stem(&self) -> &'static str {
        match self {
            Figure::Bar { stem, .. }
            | Figure::Pie { stem, .. }
            | Figure::Scatter { stem, .. }
            | Figure::Line { stem, .. } => *stem,
        }
    }
}

/// Round to a whole number and group digits with commas
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.4), "1,234,567");
        assert_eq!(format_thousands(-1500.0), "-1,500");
        assert_eq!(format_thousands(-0.2), "0");
        assert_eq!(format_thousands(99_999.6), "100,000");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.0), "$1,234");
        assert_eq!(AxisFormat::Currency.format(50.0), "$50");
        assert_eq!(AxisFormat::Thousands.format(12_000.0), "12,000");
    }

    #[test]
    fn test_figure_accessors() {
        let figure = Figure::Bar {
            stem: "technologies",
            chart: BarChart {
                title: "Top 10 Technologies".to_string(),
                x_label: "Count".to_string(),
                y_label: "Technology".to_string(),
                bars: vec![("Shopify Pay".to_string(), 3.0)],
                palette: Palette::Rocket,
            },
        };
        assert_eq!(figure.title(), "Top 10 Technologies");
        assert_eq!(figure.file_stem(), "technologies");
    }
}
