//! Supply samples and the chart points derived from them
//!
//! One sample is one line of the generator log:
//!
//! ```json
//! {"rvec":["929159090641","8360617424769", ...],"b":68585000,"s":"24303404786580"}
//! ```
//!
//! The generator writes `s` and the `rvec` totals as decimal strings and `b`
//! as a plain number, so every integer field accepts both encodings.

use crate::error::{PlotError, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// Simulated block production: 20 blocks/minute, every minute of a 365-day year
pub const BLOCKS_PER_YEAR: i64 = 20 * 60 * 24 * 365;

/// Supply is plotted in thousands of units
pub const SUPPLY_SCALE: f64 = 1000.0;

/// A decoded sample line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sample {
    /// Block height (`b`)
    #[serde(rename = "b", deserialize_with = "lenient_int")]
    pub block: i64,

    /// Total supply at `block` (`s`)
    #[serde(rename = "s", deserialize_with = "lenient_int")]
    pub supply: i64,

    /// Interleaved per-series reward totals (`rvec`); series slot `i` lives
    /// at position `i * 2`
    #[serde(rename = "rvec", deserialize_with = "lenient_ints")]
    pub rewards: Vec<i64>,
}

impl Sample {
    /// Decode one log line; `line` is the 1-based line number used in errors
    pub fn from_json_line(text: &str, line: usize) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PlotError::malformed(line, e.to_string()))
    }

    /// Reward total for a tracked series slot, if `rvec` is long enough
    pub fn series_value(&self, slot: usize) -> Option<i64> {
        self.rewards.get(slot * 2).copied()
    }

    /// Chart position of this sample
    pub fn point(&self) -> Point {
        Point::from_raw(self.block, self.supply)
    }
}

/// A chart coordinate: years since genesis against supply in thousands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn from_raw(block: i64, supply: i64) -> Self {
        Self {
            x: block as f64 / BLOCKS_PER_YEAR as f64,
            y: supply as f64 / SUPPLY_SCALE,
        }
    }
}

/// An integer that may arrive as a JSON number or a decimal string
struct LenientInt(i64);

impl<'de> Deserialize<'de> for LenientInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(LenientIntVisitor)
    }
}

struct LenientIntVisitor;

impl<'de> Visitor<'de> for LenientIntVisitor {
    type Value = LenientInt;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a string holding a base-10 integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(LenientInt(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        i64::try_from(v)
            .map(LenientInt)
            .map_err(|_| E::custom(format!("integer {} out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        // Truncate toward zero, like an int() conversion
        let t = v.trunc();
        if !t.is_finite() || t < i64::MIN as f64 || t >= i64::MAX as f64 {
            return Err(E::custom(format!("number {} is not a 64-bit integer", v)));
        }
        Ok(LenientInt(t as i64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        v.trim()
            .parse::<i64>()
            .map(LenientInt)
            .map_err(|_| E::custom(format!("invalid integer string {:?}", v)))
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    LenientInt::deserialize(deserializer).map(|v| v.0)
}

fn lenient_ints<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<i64>, D::Error> {
    let values = Vec::<LenientInt>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.0).collect())
}
