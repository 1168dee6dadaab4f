//! CLI argument parsing for inflation-plot

use crate::config::{PlotConfig, YAxisUnits};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inflation-plot")]
#[command(version)]
#[command(about = "Plot a supply projection with inflection markers from a JSON-lines sample log", long_about = None)]
pub struct Cli {
    /// Line-delimited JSON sample log (one {"b", "s", "rvec"} object per line)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output PNG path [default: myfig.png]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Track a reward series (repeatable, slot order) [default: producer]
    #[arg(long = "series", value_name = "NAME")]
    pub series: Vec<String>,

    /// Units of the y-axis limits [default: raw]
    #[arg(long = "y-axis", value_enum)]
    pub y_axis: Option<YAxisUnits>,

    /// Image size in pixels, e.g. 640x480 [default: 640x480]
    #[arg(long = "size", value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// TOML file with chart settings (flags given on the command line win)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not print inflection marker lines to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug tracing on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Layer explicitly given flags over `base`
    pub fn apply_to(&self, mut base: PlotConfig) -> PlotConfig {
        if let Some(output) = &self.output {
            base.output = output.clone();
        }
        if !self.series.is_empty() {
            base.series = self.series.clone();
        }
        if let Some(y_axis) = self.y_axis {
            base.y_axis = y_axis;
        }
        if let Some((width, height)) = self.size {
            base.width = width;
            base.height = height;
        }
        if self.quiet {
            base.print_markers = false;
        }
        base
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", w))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", h))?;
    Ok((width, height))
}
