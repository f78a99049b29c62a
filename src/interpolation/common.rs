//! Common utilities for interpolation algorithms.
//!
//! Mappings only carry source coordinates, so every method first resolves
//! them back to full source records through [`SourceLookup`].

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{RegridError, Result};
use crate::types::SpatialData;

/// Coordinate tolerance, in degrees, when matching a mapping to a source record
pub const COORD_TOLERANCE: f64 = 1e-6;

/// Resolves mapped coordinates to the source records holding their values
pub struct SourceLookup<'a> {
    sources: &'a [SpatialData],
    value_len: usize,
}

impl<'a> SourceLookup<'a> {
    /// Wrap a non-empty source set whose value vectors all have the same length
    pub fn new(sources: &'a [SpatialData]) -> Result<Self> {
        let first = sources.first().ok_or_else(|| RegridError::EmptyInput {
            message: "Source point list is empty".to_string(),
        })?;

        let value_len = first.values.len();
        if let Some(odd) = sources.iter().find(|s| s.values.len() != value_len) {
            return Err(RegridError::LayoutMismatch {
                message: format!(
                    "Inconsistent value sizes in source points: expected {}, found {} at ({}, {})",
                    value_len,
                    odd.values.len(),
                    odd.longitude(),
                    odd.latitude()
                ),
            });
        }

        Ok(Self { sources, value_len })
    }

    /// Uniform length of the source value vectors
    pub fn value_len(&self) -> usize {
        self.value_len
    }

    /// First source at (lon, lat) within tolerance that shares `time_step`
    pub fn resolve(&self, lon: f64, lat: f64, time_step: i32) -> Option<&'a SpatialData> {
        self.sources.iter().find(|src| {
            (src.longitude() - lon).abs() < COORD_TOLERANCE
                && (src.latitude() - lat).abs() < COORD_TOLERANCE
                && src.time_step == time_step
        })
    }

    /// Like [`resolve`](Self::resolve), reporting a miss to the sink when verbose
    pub fn resolve_for(
        &self,
        target: &SpatialData,
        source_lon: f64,
        source_lat: f64,
        verbose: bool,
        sink: &dyn DiagnosticSink,
    ) -> Option<&'a SpatialData> {
        let found = self.resolve(source_lon, source_lat, target.time_step);
        if found.is_none() && verbose {
            sink.report(Diagnostic::SourceNotFound {
                target_lon: target.longitude(),
                target_lat: target.latitude(),
                time_step: target.time_step,
                source_lon,
                source_lat,
            });
        }
        found
    }
}

/// Look up the target a mapping refers to
pub fn target_at<'t>(
    targets: &'t [SpatialData],
    index: usize,
    method: &str,
) -> Result<&'t SpatialData> {
    targets.get(index).ok_or_else(|| {
        RegridError::invalid(
            "target_index",
            format!(
                "Invalid target index {} in {} mapping ({} targets)",
                index,
                method,
                targets.len()
            ),
        )
    })
}

/// Weight of a neighbor at `distance`; coincident points get a large finite cap
pub fn idw_weight(distance: f64, power: f64) -> f64 {
    const MIN_DISTANCE: f64 = 1e-6;
    const COINCIDENT_WEIGHT: f64 = 1e6;

    if distance > MIN_DISTANCE {
        1.0 / distance.powf(power)
    } else {
        COINCIDENT_WEIGHT
    }
}
