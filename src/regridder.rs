//! Regridding pipeline.
//!
//! Reads the source and target grids, checks that their layouts agree, maps
//! every target onto the sources, interpolates, and writes the results.

use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::RegridConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::{RegridError, Result};
use crate::interpolation::Interpolator;
use crate::io::{InputReader, OutputWriter};
use crate::logging::{
    log_operation_end, log_operation_start, log_regrid_stats, log_timed_operation,
};
use crate::spatial_index::SpatialMapper;
use crate::types::{DataLayout, IdwMapping, InterpolationMethod, NnMapping, SpatialData};

/// Header columns of a GRID_BY_TIME file: Lon, Lat, Time and 12 months
pub const GRID_BY_TIME_COLUMNS: usize = 15;

/// Mappings and interpolated points of one in-memory regrid
#[derive(Debug, Clone, Default)]
pub struct RegridOutcome {
    /// Empty unless the method is NN or mappings were requested
    pub nn_mappings: Vec<NnMapping>,
    /// Empty unless the method is IDW or mappings were requested
    pub idw_mappings: Vec<IdwMapping>,
    pub points: Vec<SpatialData>,
}

impl RegridOutcome {
    pub fn fallback_count(&self) -> usize {
        self.idw_mappings.iter().filter(|m| m.is_fallback).count()
    }
}

/// What a file-based regrid produced
#[derive(Debug, Clone)]
pub struct RegridSummary {
    pub source_count: usize,
    pub target_count: usize,
    pub nn_mapping_count: usize,
    pub idw_mapping_count: usize,
    pub fallback_count: usize,
    pub output_count: usize,
    pub output_file: PathBuf,
}

/// Check that the source and target headers fit the layout and each other
pub fn validate_headers(
    source_headers: &[String],
    target_headers: &[String],
    layout: DataLayout,
) -> Result<()> {
    if source_headers.len() < 3 || target_headers.len() < 3 {
        return Err(RegridError::LayoutMismatch {
            message: format!(
                "Invalid headers in source or target file: need at least 3 columns, got {} and {}",
                source_headers.len(),
                target_headers.len()
            ),
        });
    }
    if layout == DataLayout::GridByTime && source_headers.len() != GRID_BY_TIME_COLUMNS {
        return Err(RegridError::LayoutMismatch {
            message: format!(
                "GRID_BY_TIME requires 12 monthly value columns plus Lon, Lat, Year; source has {} columns",
                source_headers.len()
            ),
        });
    }
    if source_headers.len() != target_headers.len() {
        return Err(RegridError::LayoutMismatch {
            message: format!(
                "Source and target files have different number of columns: {} vs {}",
                source_headers.len(),
                target_headers.len()
            ),
        });
    }
    Ok(())
}

/// Map and interpolate in-memory point sets.
///
/// NN mappings are computed when the method is NN or `write_mappings` is set,
/// IDW mappings when the method is IDW or `write_mappings` is set.
pub fn regrid_points(
    sources: &[SpatialData],
    targets: &[SpatialData],
    config: &RegridConfig,
    sink: &dyn DiagnosticSink,
) -> Result<RegridOutcome> {
    if targets.is_empty() {
        return Err(RegridError::EmptyInput {
            message: "Target point list is empty".to_string(),
        });
    }

    let mapper = SpatialMapper::new(sources, config, sink)?;
    let mut outcome = RegridOutcome::default();

    if config.interp_method == InterpolationMethod::NearestNeighbor || config.write_mappings {
        outcome.nn_mappings = mapper.find_nearest_neighbors(targets)?;
        debug!(mappings = outcome.nn_mappings.len(), "Computed NN mappings");
    }
    if config.interp_method == InterpolationMethod::InverseDistanceWeighted
        || config.write_mappings
    {
        outcome.idw_mappings = mapper.find_idw_neighbors(targets)?;
        debug!(
            mappings = outcome.idw_mappings.len(),
            fallbacks = outcome.fallback_count(),
            "Computed IDW mappings"
        );
    }

    let interpolator = Interpolator::new(sources, config, sink)?;
    outcome.points =
        interpolator.interpolate(targets, &outcome.nn_mappings, &outcome.idw_mappings)?;

    Ok(outcome)
}

/// File-based regridding of one source grid onto one target grid
pub struct Regridder<'a> {
    source_file: PathBuf,
    target_file: PathBuf,
    config: &'a RegridConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Regridder<'a> {
    pub fn new(
        source_file: impl Into<PathBuf>,
        target_file: impl Into<PathBuf>,
        config: &'a RegridConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Result<Self> {
        let source_file = source_file.into();
        let target_file = target_file.into();
        if source_file.as_os_str().is_empty() || target_file.as_os_str().is_empty() {
            return Err(RegridError::invalid(
                "input",
                "Source or target file path is empty",
            ));
        }

        Ok(Self {
            source_file,
            target_file,
            config,
            sink,
        })
    }

    /// Run the whole pipeline
    pub fn regrid(&self) -> Result<RegridSummary> {
        let start = Instant::now();
        let details = format!(
            "{} -> {} ({}, {})",
            self.source_file.display(),
            self.target_file.display(),
            self.config.interp_method,
            self.config.distance_metric
        );
        log_operation_start("regrid", Some(&details));

        // Read
        info!(file = %self.source_file.display(), "Reading source data");
        let source = InputReader::new(&self.source_file, self.config, self.sink).read()?;
        info!(file = %self.target_file.display(), "Reading target data");
        let target = InputReader::new(&self.target_file, self.config, self.sink).read()?;

        validate_headers(&source.headers, &target.headers, self.config.data_layout)?;

        let writer = OutputWriter::new(self.config)?;
        if self.config.write_gridlists {
            writer.write_gridlist(&source.points, "source_gridlist.txt")?;
            writer.write_gridlist(&target.points, "target_gridlist.txt")?;
        }

        // Map and interpolate
        info!(
            sources = source.points.len(),
            targets = target.points.len(),
            "Computing spatial mappings and interpolating values"
        );
        let outcome = log_timed_operation("map_and_interpolate", || {
            regrid_points(&source.points, &target.points, self.config, self.sink)
        })?;

        // Write
        info!(output_path = %writer.output_path().display(), "Writing outputs");
        if self.config.write_mappings {
            if !outcome.nn_mappings.is_empty() {
                writer.write_nn_mappings(&outcome.nn_mappings, &self.config.nn_mappings_file)?;
            }
            if !outcome.idw_mappings.is_empty() {
                writer.write_idw_mappings(&outcome.idw_mappings, &self.config.idw_mappings_file)?;
            }
        }
        let output_file = writer.write_regridded_data(
            &outcome.points,
            &self.config.regridded_file,
            &source.headers,
        )?;

        let summary = RegridSummary {
            source_count: source.points.len(),
            target_count: target.points.len(),
            nn_mapping_count: outcome.nn_mappings.len(),
            idw_mapping_count: outcome.idw_mappings.len(),
            fallback_count: outcome.fallback_count(),
            output_count: outcome.points.len(),
            output_file,
        };

        log_regrid_stats(
            self.config.interp_method.name(),
            &self.config.distance_metric.to_string(),
            summary.source_count,
            summary.target_count,
            summary.output_count,
            summary.fallback_count,
        );
        log_operation_end("regrid", start, summary.output_count == summary.target_count);

        Ok(summary)
    }
}
