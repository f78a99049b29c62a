//! Interpolation of source values onto mapped target points.
//!
//! This module turns the mappings produced by the spatial mapper into
//! regridded records, either by copying the nearest source or by an inverse
//! distance weighted mean.

pub mod common;
pub mod idw;
pub mod nearest;

use crate::config::RegridConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::types::{IdwMapping, InterpolationMethod, NnMapping, SpatialData};

use common::SourceLookup;

/// Interpolates source values for the configured method
pub struct Interpolator<'a> {
    lookup: SourceLookup<'a>,
    config: &'a RegridConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Interpolator<'a> {
    /// Create an interpolator over a non-empty source set of uniform value length
    pub fn new(
        sources: &'a [SpatialData],
        config: &'a RegridConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Result<Self> {
        Ok(Self {
            lookup: SourceLookup::new(sources)?,
            config,
            sink,
        })
    }

    /// Produce one record per target whose mapped source(s) resolve.
    ///
    /// Only the mapping list of the configured method is read; the other may
    /// be empty.
    pub fn interpolate(
        &self,
        targets: &[SpatialData],
        nn_mappings: &[NnMapping],
        idw_mappings: &[IdwMapping],
    ) -> Result<Vec<SpatialData>> {
        match self.config.interp_method {
            InterpolationMethod::NearestNeighbor => self.interpolate_nearest(targets, nn_mappings),
            InterpolationMethod::InverseDistanceWeighted => {
                self.interpolate_idw(targets, idw_mappings)
            }
        }
    }

    pub fn interpolate_nearest(
        &self,
        targets: &[SpatialData],
        mappings: &[NnMapping],
    ) -> Result<Vec<SpatialData>> {
        nearest::interpolate_nearest(
            &self.lookup,
            targets,
            mappings,
            self.config.verbose,
            self.sink,
        )
    }

    pub fn interpolate_idw(
        &self,
        targets: &[SpatialData],
        mappings: &[IdwMapping],
    ) -> Result<Vec<SpatialData>> {
        idw::interpolate_idw(
            &self.lookup,
            targets,
            mappings,
            self.config.power,
            self.config.verbose,
            self.sink,
        )
    }

    /// Get the name of the configured interpolation method
    pub fn name(&self) -> &str {
        self.config.interp_method.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::error::RegridError;

    #[test]
    fn test_dispatch_by_method() {
        let sources = vec![SpatialData::new(0.0, 0.0, 1, vec![3.0])];
        let targets = vec![SpatialData::new(0.1, 0.0, 1, vec![0.0])];
        let nn = vec![NnMapping {
            target_lon: 0.1,
            target_lat: 0.0,
            source_lon: 0.0,
            source_lat: 0.0,
            distance_km: 11.1,
            target_index: 0,
        }];
        let sink = CollectingSink::new();

        let config = RegridConfig::builder()
            .interpolation(InterpolationMethod::NearestNeighbor)
            .build();
        let interpolator = Interpolator::new(&sources, &config, &sink).unwrap();
        assert_eq!(interpolator.name(), "NN");
        let result = interpolator.interpolate(&targets, &nn, &[]).unwrap();
        assert_eq!(result[0].values, vec![3.0]);

        // IDW ignores the NN list and has nothing to work with
        let config = RegridConfig::default();
        let interpolator = Interpolator::new(&sources, &config, &sink).unwrap();
        assert!(matches!(
            interpolator.interpolate(&targets, &nn, &[]),
            Err(RegridError::NoInterpolation { .. })
        ));
    }
}
