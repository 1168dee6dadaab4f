//! The projection run: load → decimate/detect → render → save
//!
//! The whole input is consumed before anything is drawn, so a read or parse
//! failure anywhere in the file leaves no image behind.

use crate::chart;
use crate::config::PlotConfig;
use crate::error::{PlotError, Result};
use crate::inflection::{Inflection, InflectionDetector};
use crate::loader::SampleLoader;
use crate::sample::Point;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Points and markers collected from one sample log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub points: Vec<Point>,
    pub inflections: Vec<Inflection>,
    pub lines_read: usize,
}

impl Projection {
    /// Consume a sample source, tracking the given series
    pub fn collect<R: BufRead>(mut loader: SampleLoader<R>, series: &[String]) -> Result<Self> {
        let mut detector = InflectionDetector::new(series.iter().cloned());
        let mut points = Vec::new();

        for kept in loader.by_ref() {
            let kept = kept?;
            let point = kept.sample.point();
            points.push(point);
            detector.observe(&kept.sample, point, kept.line)?;
        }

        Ok(Self {
            points,
            inflections: detector.into_inflections(),
            lines_read: loader.lines_read(),
        })
    }

    /// Load a sample log from disk
    pub fn from_path<P: AsRef<Path>>(path: P, series: &[String]) -> Result<Self> {
        Self::collect(SampleLoader::open(path)?, series)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSummary {
    pub lines_read: usize,
    pub samples_kept: usize,
    pub inflections: Vec<Inflection>,
    pub output: PathBuf,
}

/// Run the projection for `input`, writing marker lines to `marker_log`
pub fn run<W: Write>(
    input: &Path,
    config: &PlotConfig,
    marker_log: &mut W,
) -> Result<ProjectionSummary> {
    config.validate()?;

    let projection = Projection::from_path(input, &config.series)?;
    tracing::info!(
        lines = projection.lines_read,
        kept = projection.points.len(),
        inflections = projection.inflections.len(),
        "samples loaded"
    );

    if config.print_markers {
        for inflection in &projection.inflections {
            writeln!(marker_log, "{}", inflection)
                .map_err(|e| PlotError::RenderFailure(format!("marker log write failed: {}", e)))?;
        }
    }

    chart::render(&projection.points, &projection.inflections, config)?;

    Ok(ProjectionSummary {
        lines_read: projection.lines_read,
        samples_kept: projection.points.len(),
        inflections: projection.inflections,
        output: config.output.clone(),
    })
}
