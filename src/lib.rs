//! inflation-plot - supply projection charts from simulated block samples
//!
//! Reads a line-delimited JSON log of `{"b", "s", "rvec"}` samples, keeps
//! every 10 000th block, finds the first block at which each tracked reward
//! series stops being a multiple of 1000, and renders supply against time
//! with one marker per inflection.

pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
mod glyph;
pub mod inflection;
pub mod loader;
pub mod projection;
pub mod sample;

pub use error::{PlotError, Result};
