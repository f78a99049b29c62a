//! Configuration management for regrid.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)
//!
//! Programmatic callers use [`RegridConfigBuilder`], which validates each knob
//! as it is set.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RegridError, Result};
use crate::types::{DataLayout, DistanceMetric, InterpolationMethod};

/// Command-line arguments for regrid
#[derive(Parser, Debug)]
#[command(name = "regrid")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source grid file (values to interpolate from)
    pub source_file: PathBuf,

    /// Target grid file (locations to interpolate to)
    pub target_file: PathBuf,

    /// Path to JSON configuration file
    #[arg(short, long, env = "REGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interpolation method (nn, idw)
    #[arg(short, long, env = "REGRID_METHOD")]
    pub method: Option<InterpolationMethod>,

    /// Distance metric (haversine, euclidean)
    #[arg(long, env = "REGRID_METRIC")]
    pub metric: Option<DistanceMetric>,

    /// Input data layout (grid_by_time, year_by_year)
    #[arg(short, long, env = "REGRID_LAYOUT")]
    pub layout: Option<DataLayout>,

    /// IDW search radius in km
    #[arg(short, long, env = "REGRID_RADIUS")]
    pub radius: Option<f64>,

    /// IDW weighting power
    #[arg(short, long, env = "REGRID_POWER")]
    pub power: Option<f64>,

    /// Minimum sources inside the radius before falling back to nearest neighbor
    #[arg(long, env = "REGRID_MIN_POINTS")]
    pub min_points: Option<usize>,

    /// Maximum sources used per IDW target
    #[arg(long, env = "REGRID_MAX_POINTS")]
    pub max_points: Option<usize>,

    /// Keep longitudes as read instead of normalizing to [-180, 180]
    #[arg(long)]
    pub no_adjust_longitude: bool,

    /// Output decimal precision
    #[arg(long, env = "REGRID_PRECISION")]
    pub precision: Option<usize>,

    /// Report per-target diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the NN and IDW mapping reports
    #[arg(short, long)]
    pub write_mappings: bool,

    /// Output directory for all files
    #[arg(short, long, env = "REGRID_OUTPUT_PATH")]
    pub output_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REGRID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Also write logs under <DIR>/logs
    #[arg(long, env = "REGRID_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Configuration for a regrid run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegridConfig {
    /// Interpolation method
    pub interp_method: InterpolationMethod,
    /// Distance metric
    pub distance_metric: DistanceMetric,
    /// Input data layout
    pub data_layout: DataLayout,
    /// IDW radius in km (converted to degrees for Euclidean)
    pub radius: f64,
    /// IDW weighting power
    pub power: f64,
    /// Desired number of source points for IDW
    pub max_points: usize,
    /// Minimum points for IDW, below this the target falls back to nearest neighbor
    pub min_points: usize,
    /// Normalize longitudes from 0..360 to -180..180 when reading
    pub adjust_longitude: bool,
    /// Output decimal precision
    pub precision: usize,
    /// Enable verbose diagnostics
    pub verbose: bool,
    /// Write mapping files
    pub write_mappings: bool,
    /// Write source and target gridlists
    pub write_gridlists: bool,
    /// Nearest-neighbor mappings file
    pub nn_mappings_file: String,
    /// IDW mappings file
    pub idw_mappings_file: String,
    /// Regridded data file
    pub regridded_file: String,
    /// Rows buffered by the output writer between flushes
    pub chunk_size: usize,
    /// Output directory for all files (relative or absolute)
    pub output_path: PathBuf,
    /// Log level
    pub log_level: String,
    /// Base directory for log files
    pub log_dir: Option<PathBuf>,
}

impl RegridConfig {
    /// Start a validated configuration from the defaults
    pub fn builder() -> RegridConfigBuilder {
        RegridConfigBuilder::default()
    }

    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, PathBuf, PathBuf)> {
        let args = Args::parse();
        Self::from_args(args)
    }

    /// Build the configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, PathBuf, PathBuf)> {
        // Start with defaults, replaced wholesale by the JSON file if provided
        let mut config = match &args.config {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => RegridConfig::default(),
        };

        // Override with command-line arguments and environment
        if let Some(method) = args.method {
            config.interp_method = method;
        }
        if let Some(metric) = args.metric {
            config.distance_metric = metric;
        }
        if let Some(layout) = args.layout {
            config.data_layout = layout;
        }
        if let Some(radius) = args.radius {
            config.radius = radius;
        }
        if let Some(power) = args.power {
            config.power = power;
        }
        if let Some(max_points) = args.max_points {
            config.max_points = max_points;
            if args.min_points.is_none() && config.min_points > max_points {
                config.min_points = max_points;
            }
        }
        if let Some(min_points) = args.min_points {
            config.min_points = min_points;
        }
        if args.no_adjust_longitude {
            config.adjust_longitude = false;
        }
        if let Some(precision) = args.precision {
            config.precision = precision;
        }
        config.verbose |= args.verbose;
        config.write_mappings |= args.write_mappings;
        if let Some(output_path) = args.output_path {
            config.output_path = output_path;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }
        if args.log_dir.is_some() {
            config.log_dir = args.log_dir;
        }

        Ok((config, args.source_file, args.target_file))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RegridConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        check_radius(self.radius)?;
        check_power(self.power)?;
        check_positive("max_points", self.max_points, "Max points must be positive")?;
        check_positive("min_points", self.min_points, "Min points must be positive")?;
        if self.min_points > self.max_points {
            return Err(RegridError::invalid(
                "min_points",
                format!(
                    "Min points ({}) cannot exceed max points ({})",
                    self.min_points, self.max_points
                ),
            ));
        }
        check_positive("chunk_size", self.chunk_size, "Chunk size must be positive")?;
        check_filename("nn_mappings_file", &self.nn_mappings_file)?;
        check_filename("idw_mappings_file", &self.idw_mappings_file)?;
        check_filename("regridded_file", &self.regridded_file)?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(RegridError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            interp_method: InterpolationMethod::InverseDistanceWeighted,
            distance_metric: DistanceMetric::Haversine,
            data_layout: DataLayout::GridByTime,
            radius: 100.0,
            power: 2.0,
            max_points: 5,
            min_points: 5,
            adjust_longitude: true,
            precision: 5,
            verbose: false,
            write_mappings: false,
            write_gridlists: true,
            nn_mappings_file: "nn_mappings.txt".to_string(),
            idw_mappings_file: "idw_mappings.txt".to_string(),
            regridded_file: "regridded.txt".to_string(),
            chunk_size: 1000,
            output_path: PathBuf::from("./"),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Builder for [`RegridConfig`] that validates every setting
#[derive(Debug, Clone, Default)]
pub struct RegridConfigBuilder {
    config: RegridConfig,
}

impl RegridConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interpolation(mut self, method: InterpolationMethod) -> Self {
        self.config.interp_method = method;
        self
    }

    pub fn distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.config.distance_metric = metric;
        self
    }

    pub fn data_layout(mut self, layout: DataLayout) -> Self {
        self.config.data_layout = layout;
        self
    }

    pub fn radius(mut self, radius: f64) -> Result<Self> {
        check_radius(radius)?;
        self.config.radius = radius;
        Ok(self)
    }

    pub fn power(mut self, power: f64) -> Result<Self> {
        check_power(power)?;
        self.config.power = power;
        Ok(self)
    }

    /// Set the IDW neighbor cap, lowering `min_points` if it would exceed it
    pub fn max_points(mut self, max_points: usize) -> Result<Self> {
        check_positive("max_points", max_points, "Max points must be positive")?;
        self.config.max_points = max_points;
        if self.config.min_points > max_points {
            self.config.min_points = max_points;
        }
        Ok(self)
    }

    pub fn min_points(mut self, min_points: usize) -> Result<Self> {
        check_positive("min_points", min_points, "Min points must be positive")?;
        if min_points > self.config.max_points {
            return Err(RegridError::invalid(
                "min_points",
                "Min points cannot exceed max points",
            ));
        }
        self.config.min_points = min_points;
        Ok(self)
    }

    pub fn adjust_longitude(mut self, adjust: bool) -> Self {
        self.config.adjust_longitude = adjust;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.config.precision = precision;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn write_mappings(mut self, write: bool) -> Self {
        self.config.write_mappings = write;
        self
    }

    pub fn write_gridlists(mut self, write: bool) -> Self {
        self.config.write_gridlists = write;
        self
    }

    pub fn nn_mappings_file(mut self, filename: &str) -> Result<Self> {
        check_filename("nn_mappings_file", filename)?;
        self.config.nn_mappings_file = filename.to_string();
        Ok(self)
    }

    pub fn idw_mappings_file(mut self, filename: &str) -> Result<Self> {
        check_filename("idw_mappings_file", filename)?;
        self.config.idw_mappings_file = filename.to_string();
        Ok(self)
    }

    pub fn regridded_file(mut self, filename: &str) -> Result<Self> {
        check_filename("regridded_file", filename)?;
        self.config.regridded_file = filename.to_string();
        Ok(self)
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        check_positive("chunk_size", chunk_size, "Chunk size must be positive")?;
        self.config.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn build(self) -> RegridConfig {
        self.config
    }
}

fn check_radius(radius: f64) -> Result<()> {
    if !(radius >= 0.0) {
        return Err(RegridError::invalid("radius", "Radius must be non-negative"));
    }
    Ok(())
}

fn check_power(power: f64) -> Result<()> {
    if !(power > 0.0) {
        return Err(RegridError::invalid("power", "Power must be positive"));
    }
    Ok(())
}

fn check_positive(param: &str, value: usize, message: &str) -> Result<()> {
    if value == 0 {
        return Err(RegridError::invalid(param, message));
    }
    Ok(())
}

fn check_filename(param: &str, filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(RegridError::invalid(param, "Filename cannot be empty"));
    }
    Ok(())
}
