//! PNG rendering of the supply projection
//!
//! The axes are fixed: 0..20 years on x with a major gridline every year and
//! twelve minor (monthly) subdivisions, and fourteen labelled supply ticks on
//! y. Tick label strings are kept exactly as the reference chart prints
//! them, `60MB` included.
//!
//! Data outside the axis ranges is clipped, not pinned to the plot edge.
//! The chart is drawn into memory and only encoded to disk once every
//! element has been drawn.

use crate::config::{PlotConfig, YAxisUnits};
use crate::error::{PlotError, Result};
use crate::glyph::GlyphBackend;
use crate::inflection::{Inflection, MarkerColor, MarkerShape};
use crate::sample::Point;
use plotters::backend::RGBPixel;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::ops::Range;

/// Chart title
pub const TITLE: &str = "20-year MORPH supply projection";

/// Years shown on the x axis
pub const X_YEARS: u32 = 20;

/// Minor subdivisions per year
pub const X_MINOR_DIVISIONS: u32 = 12;

/// Y tick positions in raw supply units
pub const Y_TICKS_RAW: [f64; 14] = [
    10e6, 20e6, 30e6, 40e6, 50e6, 60e6, 70e6, 80e6, 90e6, 100e6, 110e6, 120e6, 130e6, 140e6,
];

pub const Y_TICK_LABELS: [&str; 14] = [
    "10M", "20M", "30M", "40M", "50M", "60MB", "70M", "80M", "90M", "100M", "110M", "120M",
    "130M", "140M",
];

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const MINOR_GRID_COLOR: RGBColor = RGBColor(0, 128, 0);
const MARKER_SIZE: i32 = 4;

/// Axis ranges and tick positions for one chart
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub x_max: f64,
    pub x_major: Vec<f64>,
    pub x_minor: Vec<f64>,
    pub y_min: f64,
    pub y_max: f64,
    pub y_ticks: Vec<f64>,
}

impl AxisLayout {
    pub fn new(units: YAxisUnits) -> Self {
        let scale = match units {
            YAxisUnits::Raw => 1.0,
            YAxisUnits::Thousands => 1.0 / crate::sample::SUPPLY_SCALE,
        };
        let y_ticks: Vec<f64> = Y_TICKS_RAW.iter().map(|t| t * scale).collect();

        let x_major = (0..=X_YEARS).map(f64::from).collect();
        let x_minor = (0..X_YEARS)
            .flat_map(|year| {
                (1..X_MINOR_DIVISIONS)
                    .map(move |m| f64::from(year) + f64::from(m) / f64::from(X_MINOR_DIVISIONS))
            })
            .collect();

        Self {
            x_max: f64::from(X_YEARS),
            x_major,
            x_minor,
            y_min: y_ticks[0],
            y_max: y_ticks[y_ticks.len() - 1],
            y_ticks,
        }
    }

    /// Label printed at a y tick, if `value` is one
    pub fn y_label(&self, value: f64) -> Option<&'static str> {
        self.y_ticks
            .iter()
            .position(|t| (t - value).abs() <= t.abs() * 1e-9)
            .map(|i| Y_TICK_LABELS[i])
    }

    /// Whether a point falls inside the visible plot area
    pub fn contains(&self, point: &Point) -> bool {
        (0.0..=self.x_max).contains(&point.x) && (self.y_min..=self.y_max).contains(&point.y)
    }

    /// Parameter interval `[t0, t1]` of the segment `a -> b` that lies inside
    /// the plot area (Liang-Barsky)
    fn clip_params(&self, a: Point, b: Point) -> Option<(f64, f64)> {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let edges = [
            (-dx, a.x),
            (dx, self.x_max - a.x),
            (-dy, a.y - self.y_min),
            (dy, self.y_max - a.y),
        ];

        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some((t0, t1))
    }

    /// Split a polyline into the connected pieces visible in the plot area
    ///
    /// Segments leaving the area are cut at its border; a lone point draws
    /// no line.
    pub fn visible_runs(&self, points: &[Point]) -> Vec<Vec<(f64, f64)>> {
        let lerp = |a: Point, b: Point, t: f64| (a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);

        let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut open = false;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let Some((t0, t1)) = self.clip_params(a, b) else {
                open = false;
                continue;
            };
            if !open || t0 > 0.0 {
                runs.push(vec![lerp(a, b, t0)]);
            }
            if let Some(run) = runs.last_mut() {
                run.push(lerp(a, b, t1));
            }
            open = t1 >= 1.0;
        }
        runs
    }

    fn x_axis(&self) -> FixedAxis {
        FixedAxis {
            range: (0.0..self.x_max).into(),
            major: self.x_major.clone(),
            minor: self.x_minor.clone(),
        }
    }

    fn y_axis(&self) -> FixedAxis {
        FixedAxis {
            range: (self.y_min..self.y_max).into(),
            major: self.y_ticks.clone(),
            minor: Vec::new(),
        }
    }
}

/// Linear f64 axis whose gridlines sit at fixed positions
struct FixedAxis {
    range: RangedCoordf64,
    major: Vec<f64>,
    minor: Vec<f64>,
}

impl Ranged for FixedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.range.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            self.minor.clone()
        } else {
            self.major.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.range.range()
    }
}

fn marker_rgb(color: MarkerColor) -> RGBColor {
    match color {
        MarkerColor::Magenta => RGBColor(191, 0, 191),
        MarkerColor::Green => RGBColor(0, 128, 0),
        MarkerColor::Blue => RGBColor(0, 0, 255),
        MarkerColor::Red => RGBColor(255, 0, 0),
    }
}

fn triangle_down(size: i32) -> Vec<(i32, i32)> {
    vec![(-size, -size), (size, -size), (0, size)]
}

/// Render the projection and write it to `config.output`
///
/// Nothing is written unless drawing succeeds; drawing or encoding errors
/// surface as [`PlotError::RenderFailure`].
pub fn render(points: &[Point], inflections: &[Inflection], config: &PlotConfig) -> Result<()> {
    let layout = AxisLayout::new(config.y_axis);

    if !points.is_empty() && !points.iter().any(|p| layout.contains(p)) {
        tracing::warn!(
            points = points.len(),
            y_min = layout.y_min,
            y_max = layout.y_max,
            "no plotted point falls inside the y-axis range"
        );
    }

    let (width, height) = (config.width, config.height);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    let backend = BitMapBackend::<RGBPixel>::with_buffer_and_format(&mut pixels, (width, height))
        .map_err(|e| PlotError::RenderFailure(e.to_string()))?;
    paint(backend, points, inflections, &layout)
        .map_err(|e| PlotError::RenderFailure(e.to_string()))?;

    image::save_buffer_with_format(
        &config.output,
        &pixels,
        width,
        height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .map_err(|e| PlotError::RenderFailure(format!("{}: {}", config.output.display(), e)))?;

    tracing::debug!(output = %config.output.display(), "chart written");
    Ok(())
}

/// Draw the whole chart onto `backend`
fn paint<DB: DrawingBackend>(
    backend: DB,
    points: &[Point],
    inflections: &[Inflection],
    layout: &AxisLayout,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let root = GlyphBackend::new(backend).into_drawing_area();
    draw_projection(&root, points, inflections, layout)?;
    root.present()
}

fn draw_projection<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[Point],
    inflections: &[Inflection],
    layout: &AxisLayout,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(TITLE, ("sans-serif", 18))
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(layout.x_axis(), layout.y_axis())?;

    chart
        .configure_mesh()
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(MINOR_GRID_COLOR)
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| layout.y_label(*v).unwrap_or_default().to_string())
        .draw()?;

    for run in layout.visible_runs(points) {
        chart.draw_series(LineSeries::new(run, &LINE_COLOR))?;
    }

    for inflection in inflections {
        let color = marker_rgb(inflection.color);
        let at = (inflection.position.x, inflection.position.y);
        let visible = layout.contains(&inflection.position);
        let label = inflection.series.as_str();

        // Off-axis markers are skipped but still get a legend entry
        match inflection.shape {
            MarkerShape::Circle => {
                chart
                    .draw_series(visible.then(|| Circle::new(at, MARKER_SIZE, color.filled())))?
                    .label(label)
                    .legend(move |c| Circle::new(c, MARKER_SIZE, color.filled()));
            }
            MarkerShape::TriangleDown => {
                chart
                    .draw_series(visible.then(|| {
                        EmptyElement::at(at)
                            + Polygon::new(triangle_down(MARKER_SIZE), color.filled())
                    }))?
                    .label(label)
                    .legend(move |c| {
                        EmptyElement::at(c)
                            + Polygon::new(triangle_down(MARKER_SIZE), color.filled())
                    });
            }
            MarkerShape::Cross => {
                chart
                    .draw_series(
                        visible.then(|| Cross::new(at, MARKER_SIZE, color.stroke_width(2))),
                    )?
                    .label(label)
                    .legend(move |c| Cross::new(c, MARKER_SIZE, color.stroke_width(2)));
            }
            MarkerShape::Plus => {
                chart
                    .draw_series(visible.then(|| {
                        EmptyElement::at(at)
                            + PathElement::new(
                                vec![(-MARKER_SIZE, 0), (MARKER_SIZE, 0)],
                                color.stroke_width(2),
                            )
                            + PathElement::new(
                                vec![(0, -MARKER_SIZE), (0, MARKER_SIZE)],
                                color.stroke_width(2),
                            )
                    }))?
                    .label(label)
                    .legend(move |c| {
                        EmptyElement::at(c)
                            + PathElement::new(
                                vec![(-MARKER_SIZE, 0), (MARKER_SIZE, 0)],
                                color.stroke_width(2),
                            )
                            + PathElement::new(
                                vec![(0, -MARKER_SIZE), (0, MARKER_SIZE)],
                                color.stroke_width(2),
                            )
                    });
            }
        }
    }

    if !inflections.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .draw()?;
    }

    Ok(())
}
