//! Chart and run configuration
//!
//! Defaults reproduce the reference projection chart exactly. A TOML file can
//! override any setting:
//!
//! ```toml
//! output = "supply.png"
//! width = 1280
//! height = 960
//! y_axis = "thousands"
//! series = ["producer"]
//! print_markers = false
//! ```

use crate::error::{PlotError, Result};
use crate::inflection::DEFAULT_SERIES;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Output image written when no path is configured
pub const DEFAULT_OUTPUT: &str = "myfig.png";

/// Image size of a 6.4in x 4.8in figure at 100 dpi
pub const DEFAULT_SIZE: (u32, u32) = (640, 480);

/// Smallest width or height that still leaves room for the plot area
pub const MIN_DIMENSION: u32 = 64;

/// Units of the y-axis limits and tick positions
///
/// Plotted supply is always in thousands. `Raw` keeps the limits in raw
/// supply units (10M..140M), which is what the reference chart does even
/// though it puts realistic data below the visible range. `Thousands`
/// divides limits and tick positions by 1000 so the data is in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum YAxisUnits {
    #[default]
    Raw,
    Thousands,
}

/// Settings for one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    /// PNG file written at the end of the run
    pub output: PathBuf,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    pub y_axis: YAxisUnits,

    /// Tracked series names, in slot order
    pub series: Vec<String>,

    /// Print one diagnostic line per inflection marker to stdout
    pub print_markers: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            y_axis: YAxisUnits::Raw,
            series: vec![DEFAULT_SERIES.to_string()],
            print_markers: true,
        }
    }
}

impl PlotConfig {
    /// Load overrides from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PlotError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| PlotError::Config(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the renderer cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_DIMENSION || self.height < MIN_DIMENSION {
            return Err(PlotError::Config(format!(
                "image size {}x{} is below the {}px minimum",
                self.width, self.height, MIN_DIMENSION
            )));
        }
        if self.series.is_empty() {
            return Err(PlotError::Config(
                "at least one series must be tracked".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(PlotError::Config("output path is empty".to_string()));
        }
        let is_png = self
            .output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(PlotError::Config(format!(
                "output {} must be a .png file",
                self.output.display()
            )));
        }
        Ok(())
    }
}
