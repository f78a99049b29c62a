//! Logging utilities for regrid.
//!
//! This module sets up structured logging to stderr and, optionally, to a
//! timestamped log file, and provides helpers to log the phases of a run in a
//! searchable form.

use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use crate::error::{RegridError, Result};

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over `log_level`. When `log_dir` is given,
/// events are also appended to `<log_dir>/logs/regrid_<timestamp>.log`, whose
/// path is returned.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    let (file_layer, log_path) = match log_dir {
        Some(dir) => {
            let (file, path) = open_log_file(dir, Local::now())?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| RegridError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    if let Some(path) = &log_path {
        info!(log_file = %path.display(), "Logger initialized");
    }

    Ok(log_path)
}

/// Name of the log file opened at `now`
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("regrid_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Create `<dir>/logs` and open the log file for appending
fn open_log_file(dir: &Path, now: DateTime<Local>) -> Result<(File, PathBuf)> {
    let logs_dir = dir.join("logs");
    fs::create_dir_all(&logs_dir)?;

    let path = logs_dir.join(log_file_name(now));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let run_id = generate_run_id();

    debug!(
        operation = operation,
        run_id = %run_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        run_id = %run_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log the size of a finished regrid
pub fn log_regrid_stats(
    method: &str,
    metric: &str,
    source_count: usize,
    target_count: usize,
    output_count: usize,
    fallback_count: usize,
) {
    info!(
        operation = "regrid",
        method = method,
        metric = metric,
        sources = source_count,
        targets = target_count,
        outputs = output_count,
        dropped = target_count.saturating_sub(output_count),
        fallbacks = fallback_count,
        "Regrid statistics"
    );
}

/// Log an error with context
pub fn log_error(error: &RegridError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique run ID
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
