//! regrid - nearest-neighbor and IDW regridding of point grids
//!
//! This is the main entry point for the regrid command-line tool.

use anyhow::Context;
use tracing::{error, info};

use regrid::{init_tracing, log_error, RegridConfig, Regridder, TracingSink};

fn main() -> anyhow::Result<()> {
    // Load configuration
    let (config, source_file, target_file) =
        RegridConfig::load().context("Failed to load configuration")?;

    // Validate configuration
    config.validate().context("Invalid configuration")?;

    let log_file = init_tracing(&config.log_level, config.log_dir.as_deref())?;

    info!("Starting regrid v{}", env!("CARGO_PKG_VERSION"));
    if let Some(log_file) = log_file {
        info!("Logging to {}", log_file.display());
    }
    info!(
        "Regridding {:?} onto {:?}, output in {:?}",
        source_file, target_file, config.output_path
    );

    let sink = TracingSink;
    let regridder = Regridder::new(&source_file, &target_file, &config, &sink)?;

    let summary = regridder.regrid().map_err(|e| {
        log_error(&e, "regrid");
        error!("Regridding failed: {}", e);
        e
    })?;

    info!(
        "Regridding completed successfully: {} of {} targets written to {}",
        summary.output_count,
        summary.target_count,
        summary.output_file.display()
    );

    Ok(())
}
