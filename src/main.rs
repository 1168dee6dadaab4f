use anyhow::{Context, Result};
use clap::Parser;
use inflation_plot::{cli::Cli, config::PlotConfig, projection};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => PlotConfig::from_file(path)?,
        None => PlotConfig::default(),
    };
    let config = args.apply_to(base);

    let stdout = std::io::stdout();
    let summary = projection::run(&args.input, &config, &mut stdout.lock())
        .with_context(|| format!("Failed to plot {}", args.input.display()))?;

    tracing::info!(
        lines = summary.lines_read,
        kept = summary.samples_kept,
        inflections = summary.inflections.len(),
        output = %summary.output.display(),
        "projection written"
    );

    Ok(())
}
