//! Chart rendering using Plotters

use std::f64::consts::TAU;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::data::YearMonth;
use crate::figure::{BarChart, Figure, LineChart, Palette as BarPalette, PieChart, ScatterChart};

/// Seaborn's "deep" qualitative palette
const DEEP: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

/// Seaborn's "rocket" sequential palette, dark to light
const ROCKET: [RGBColor; 10] = [
    RGBColor(45, 30, 62),
    RGBColor(74, 29, 79),
    RGBColor(107, 29, 90),
    RGBColor(140, 29, 91),
    RGBColor(172, 28, 83),
    RGBColor(201, 45, 69),
    RGBColor(224, 76, 63),
    RGBColor(236, 109, 79),
    RGBColor(242, 142, 107),
    RGBColor(245, 174, 140),
];

/// Image format written by `PlottersRenderer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Colours and fonts shared by every chart
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub grid: RGBColor,
    pub accent: RGBColor,
    pub scatter: RGBColor,
    pub trend: RGBColor,
    pub font: &'static str,
}

impl Theme {
    /// Newspaper look: cream background, dark ink, light grid
    pub fn wsj() -> Self {
        Self {
            background: RGBColor(248, 242, 228),
            foreground: RGBColor(34, 34, 34),
            grid: RGBColor(210, 204, 190),
            accent: RGBColor(0, 128, 128),
            scatter: RGBColor(0, 0, 128),
            trend: RGBColor(255, 165, 0),
            font: "sans-serif",
        }
    }

    fn title_style(&self) -> TextStyle<'static> {
        (self.font, 22).into_font().color(&self.foreground)
    }

    fn subtitle_style(&self) -> TextStyle<'static> {
        (self.font, 13).into_font().color(&self.foreground)
    }

    fn axis_style(&self) -> TextStyle<'static> {
        (self.font, 15).into_font().color(&self.foreground)
    }

    fn tick_style(&self) -> TextStyle<'static> {
        (self.font, 12).into_font().color(&self.foreground)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::wsj()
    }
}

/// Something that can present a finished figure
pub trait Renderer {
    fn render(&mut self, figure: &Figure) -> crate::Result<()>;
}

/// Writes each figure to `<output_dir>/<file stem>.<ext>`
#[derive(Debug)]
pub struct PlottersRenderer {
    output_dir: PathBuf,
    format: ImageFormat,
    theme: Theme,
    size: Option<(u32, u32)>,
    written: Vec<PathBuf>,
}

impl PlottersRenderer {
    /// Create the renderer; the output directory is only created by the first render
    pub fn new(output_dir: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            theme: Theme::default(),
            size: None,
            written: Vec::new(),
        }
    }

    /// Use one canvas size for every chart instead of the per-chart defaults
    pub fn with_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.size = size;
        self
    }

    pub fn output_path(&self, figure: &Figure) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", figure.file_stem(), self.format.extension()))
    }

    /// Files written so far, in render order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn draw_to(&self, path: &Path, figure: &Figure) -> crate::Result<()> {
        let size = self.size.unwrap_or_else(|| default_size(figure));
        match self.format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                draw_figure(&root, figure, &self.theme)?;
                root.present()?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                draw_figure(&root, figure, &self.theme)?;
                root.present()?;
            }
        }
        Ok(())
    }
}

impl Renderer for PlottersRenderer {
    fn render(&mut self, figure: &Figure) -> crate::Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(figure);
        self.draw_to(&path, figure)?;
        info!("{} saved to: {}", figure.title(), path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Canvas sizes in pixels, per chart shape
fn default_size(figure: &Figure) -> (u32, u32) {
    match figure {
        Figure::Bar { .. } => (800, 600),
        Figure::Pie { .. } => (700, 700),
        Figure::Scatter { .. } => (1000, 700),
        Figure::Line { .. } => (1000, 450),
    }
}

/// Draw any figure onto a drawing area
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    theme: &Theme,
) -> crate::Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&theme.background)?;
    match figure {
        Figure::Bar { chart, .. } => draw_bar_chart(root, chart, theme),
        Figure::Pie { chart, .. } => draw_pie_chart(root, chart, theme),
        Figure::Scatter { chart, .. } => draw_scatter_chart(root, chart, theme),
        Figure::Line { chart, .. } => draw_line_chart(root, chart, theme),
    }
}

fn bar_color(palette: BarPalette, rank: usize) -> RGBColor {
    let colors = match palette {
        BarPalette::Deep => &DEEP,
        BarPalette::Rocket => &ROCKET,
    };
    colors[rank % colors.len()]
}

/// Horizontal bars, first entry at the top
fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BarChart,
    theme: &Theme,
) -> crate::Result<()>
where
    DB::ErrorType: 'static,
{
    let slots = chart.bars.len().max(1);
    let max_value = chart
        .bars
        .iter()
        .map(|(_, value)| *value)
        .fold(0.0f64, f64::max)
        .max(1.0);
    let labels: Vec<&str> = chart.bars.iter().map(|(label, _)| label.as_str()).collect();
    let longest = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);
    let label_area = u32::try_from(longest * 8 + 30).unwrap_or(260).clamp(80, 260);

    // Rank r is drawn in segment `slots - 1 - r` so rank 0 sits on top
    let label_for = |value: &SegmentValue<usize>| -> String {
        match value {
            SegmentValue::CenterOf(slot) | SegmentValue::Exact(slot) => slots
                .checked_sub(slot + 1)
                .and_then(|rank| labels.get(rank))
                .map(|label| (*label).to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        }
    };

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, theme.title_style())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(label_area)
        .build_cartesian_2d(0f64..max_value * 1.1, (0usize..slots).into_segmented())?;

    cc.configure_mesh()
        .disable_y_mesh()
        .light_line_style(theme.background)
        .bold_line_style(theme.grid)
        .axis_style(theme.foreground)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(theme.axis_style())
        .label_style(theme.tick_style())
        .x_label_formatter(&|x| crate::figure::format_thousands(*x))
        .y_labels(slots)
        .y_label_formatter(&label_for)
        .draw()?;

    cc.draw_series(chart.bars.iter().enumerate().map(|(rank, (_, value))| {
        let slot = slots - 1 - rank;
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(slot)), (*value, SegmentValue::Exact(slot + 1))],
            bar_color(chart.palette, rank).filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    Ok(())
}

/// Point on a circle around `center`, angle in radians counter-clockwise from +x
fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

fn wedge_points(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep.abs() / TAU) * 180.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        let angle = start + sweep * step as f64 / steps as f64;
        points.push(polar(center, radius, angle));
    }
    points
}

fn draw_pie_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &PieChart,
    theme: &Theme,
) -> crate::Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(&chart.title, theme.title_style())?;
    let total: f64 = chart.slices.iter().map(|slice| slice.value).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let center = (i32::try_from(width / 2)?, i32::try_from(height / 2)?);
    let radius = f64::from(width.min(height)) * 0.33;
    let mut angle = chart.start_angle.to_radians();

    for (i, slice) in chart.slices.iter().enumerate() {
        let sweep = slice.value / total * TAU;
        let color = DEEP[i % DEEP.len()];

        let wedge = wedge_points(center, radius, angle, sweep);
        area.draw(&Polygon::new(wedge.clone(), color.filled()))?;
        let mut outline = wedge;
        outline.push(center);
        area.draw(&PathElement::new(outline, WHITE.stroke_width(2)))?;

        let middle = angle + sweep / 2.0;
        let side = if middle.cos() >= 0.0 { HPos::Left } else { HPos::Right };
        area.draw(&Text::new(
            slice.label.clone(),
            polar(center, radius * 1.12, middle),
            theme.tick_style().pos(Pos::new(side, VPos::Center)),
        ))?;
        area.draw(&Text::new(
            format!("{:.1}%", slice.percent),
            polar(center, radius * 0.62, middle),
            (theme.font, 11)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;

        angle += sweep;
    }

    Ok(())
}

/// Axis range covering `values` with 5% padding; never empty
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        let pad = (min.abs() * 0.05).max(1.0);
        return (min - pad)..(max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

fn draw_scatter_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ScatterChart,
    theme: &Theme,
) -> crate::Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(&chart.title, theme.title_style())?;
    let area = match &chart.subtitle {
        Some(subtitle) => area.titled(subtitle, theme.subtitle_style())?,
        None => area,
    };

    let x_range = padded_range(chart.points.iter().map(|p| p.0));
    let y_range = padded_range(
        chart
            .points
            .iter()
            .map(|p| p.1)
            .chain(chart.trend.iter().map(|p| p.1)),
    );

    let mut cc = ChartBuilder::on(&area)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, y_range)?;

    cc.configure_mesh()
        .light_line_style(theme.background)
        .bold_line_style(theme.grid)
        .axis_style(theme.foreground)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(theme.axis_style())
        .label_style(theme.tick_style())
        .x_label_formatter(&|x| chart.x_format.format(*x))
        .y_label_formatter(&|y| chart.y_format.format(*y))
        .draw()?;

    cc.draw_series(
        chart
            .points
            .iter()
            .map(|&point| Circle::new(point, 3, theme.scatter.mix(0.7).filled())),
    )?;

    if chart.trend.len() > 1 {
        let trend_color = theme.trend;
        cc.draw_series(LineSeries::new(
            chart.trend.iter().copied(),
            trend_color.stroke_width(3),
        ))?
        .label("LOWESS trend")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], trend_color.stroke_width(3)));

        cc.configure_series_labels()
            .background_style(theme.background.mix(0.9))
            .border_style(theme.grid)
            .label_font(theme.tick_style())
            .draw()?;
    }

    Ok(())
}

fn month_label(x: f64) -> String {
    YearMonth::from_ordinal(x.round() as i64)
        .map(|month| month.to_string())
        .unwrap_or_default()
}

fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &LineChart,
    theme: &Theme,
) -> crate::Result<()>
where
    DB::ErrorType: 'static,
{
    let series: Vec<(f64, f64)> = chart
        .points
        .iter()
        .map(|(month, value)| (month.ordinal() as f64, *value))
        .collect();

    let x_range = padded_range(series.iter().map(|p| p.0));
    let y_range = padded_range(series.iter().map(|p| p.1));
    let x_ticks = series.len().clamp(2, 12);

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, theme.title_style())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, y_range)?;

    cc.configure_mesh()
        .light_line_style(theme.background)
        .bold_line_style(theme.grid)
        .axis_style(theme.foreground)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(theme.axis_style())
        .label_style(theme.tick_style())
        .x_labels(x_ticks)
        .x_label_formatter(&|x| month_label(*x))
        .y_label_formatter(&|y| chart.y_format.format(*y))
        .draw()?;

    cc.draw_series(LineSeries::new(series.iter().copied(), theme.accent.stroke_width(2)))?;
    cc.draw_series(
        series
            .iter()
            .map(|&point| Circle::new(point, 4, theme.accent.filled())),
    )?;

    Ok(())
}
