//! Error taxonomy for the supply projection run
//!
//! Every failure is fatal: the run aborts before the chart is written, so a
//! failed run never leaves a partial image behind.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading samples, detecting inflections or
/// rendering the chart
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Input file not readable: {}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("No marker slot left for series '{series}' (palette holds {capacity})")]
    SeriesSlotExhausted { series: String, capacity: usize },

    #[error("Failed to render chart: {0}")]
    RenderFailure(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PlotError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for projection operations
pub type Result<T> = std::result::Result<T, PlotError>;
