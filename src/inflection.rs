//! Inflection detection for tracked reward series
//!
//! A series "inflects" at the first kept sample whose reward total is no
//! longer a multiple of [`INFLECTION_MODULUS`]. Each series gets at most one
//! marker; once recorded it is frozen for the rest of the run.
//!
//! Marker colours and shapes are handed out by [`MarkerPalette`], an explicit
//! cursor owned by the detector, so assignment order only depends on the
//! order in which series inflect.

use crate::error::{PlotError, Result};
use crate::sample::{Point, Sample};
use std::collections::HashSet;
use std::fmt;

/// Reward totals are watched for their residue modulo this value
pub const INFLECTION_MODULUS: i64 = 1000;

/// Tracked-series slot that is never examined
pub const SKIPPED_SLOT: usize = 1;

/// Series tracked when none are configured
pub const DEFAULT_SERIES: &str = "producer";

/// Marker colour, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerColor {
    Magenta,
    Green,
    Blue,
    Red,
}

impl MarkerColor {
    pub const CYCLE: [MarkerColor; 4] = [Self::Magenta, Self::Green, Self::Blue, Self::Red];

    /// Single-letter colour code
    pub fn code(self) -> char {
        match self {
            Self::Magenta => 'm',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Red => 'r',
        }
    }
}

/// Marker shape, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    Circle,
    TriangleDown,
    Cross,
    Plus,
}

impl MarkerShape {
    pub const CYCLE: [MarkerShape; 4] = [Self::Circle, Self::TriangleDown, Self::Cross, Self::Plus];

    /// Single-character shape code
    pub fn code(self) -> char {
        match self {
            Self::Circle => 'o',
            Self::TriangleDown => 'v',
            Self::Cross => 'x',
            Self::Plus => '+',
        }
    }
}

/// Cursor over the colour and shape cycles
///
/// Both cycles advance together and are not reused: the fifth request fails
/// with [`PlotError::SeriesSlotExhausted`].
#[derive(Debug, Clone, Default)]
pub struct MarkerPalette {
    next: usize,
}

impl MarkerPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers the palette can hand out
    pub fn capacity(&self) -> usize {
        MarkerColor::CYCLE.len().min(MarkerShape::CYCLE.len())
    }

    /// Markers handed out so far
    pub fn assigned(&self) -> usize {
        self.next
    }

    /// Take the next colour/shape pair for `series`
    pub fn next_style(&mut self, series: &str) -> Result<(MarkerColor, MarkerShape)> {
        let (Some(&color), Some(&shape)) = (
            MarkerColor::CYCLE.get(self.next),
            MarkerShape::CYCLE.get(self.next),
        ) else {
            return Err(PlotError::SeriesSlotExhausted {
                series: series.to_string(),
                capacity: self.capacity(),
            });
        };
        self.next += 1;
        Ok((color, shape))
    }
}

/// First inflection of one series
#[derive(Debug, Clone, PartialEq)]
pub struct Inflection {
    pub series: String,
    /// Raw block height of the sample that inflected
    pub block: i64,
    pub color: MarkerColor,
    pub shape: MarkerShape,
    pub position: Point,
}

impl Inflection {
    /// Combined colour + shape code, e.g. `mo`
    pub fn style_code(&self) -> String {
        format!("{}{}", self.color.code(), self.shape.code())
    }
}

/// Diagnostic form: `[[[x], [y], 'mo'], {'label': 'producer'}]`
impl fmt::Display for Inflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[[{:?}], [{:?}], '{}'], {{'label': '{}'}}]",
            self.position.x,
            self.position.y,
            self.style_code(),
            self.series
        )
    }
}

/// Scans kept samples for the first inflection of every tracked series
#[derive(Debug, Clone)]
pub struct InflectionDetector {
    series: Vec<String>,
    found: HashSet<String>,
    palette: MarkerPalette,
    inflections: Vec<Inflection>,
}

impl InflectionDetector {
    pub fn new<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            series: series.into_iter().map(Into::into).collect(),
            found: HashSet::new(),
            palette: MarkerPalette::new(),
            inflections: Vec::new(),
        }
    }

    /// Tracked series names, in slot order
    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Examine one kept sample plotted at `position`
    ///
    /// `line` is the sample's 1-based line number, reported when `rvec` is
    /// too short for a series slot that still needs checking.
    pub fn observe(&mut self, sample: &Sample, position: Point, line: usize) -> Result<()> {
        for (slot, name) in self.series.iter().enumerate() {
            if slot == SKIPPED_SLOT || self.found.contains(name) {
                continue;
            }

            let value = sample.series_value(slot).ok_or_else(|| {
                PlotError::malformed(
                    line,
                    format!(
                        "rvec has {} entries, series '{}' needs index {}",
                        sample.rewards.len(),
                        name,
                        slot * 2
                    ),
                )
            })?;

            if value % INFLECTION_MODULUS == 0 {
                continue;
            }

            let (color, shape) = self.palette.next_style(name)?;
            tracing::debug!(
                series = %name,
                block = sample.block,
                value,
                "inflection found"
            );
            self.found.insert(name.clone());
            self.inflections.push(Inflection {
                series: name.clone(),
                block: sample.block,
                color,
                shape,
                position,
            });
        }
        Ok(())
    }

    /// Inflections recorded so far, in detection order
    pub fn inflections(&self) -> &[Inflection] {
        &self.inflections
    }

    pub fn into_inflections(self) -> Vec<Inflection> {
        self.inflections
    }
}

impl Default for InflectionDetector {
    fn default() -> Self {
        Self::new([DEFAULT_SERIES])
    }
}
