//! Spatial mapping of target points onto source points.
//!
//! Both searches are exact scans over every source point; there is no
//! acceleration structure. Ties are resolved in favor of the source seen first.

use std::cmp::Ordering;

use crate::config::RegridConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{RegridError, Result};
use crate::geodesy::{compute_distance, distance_in_km, km_to_degrees};
use crate::types::{DistanceMetric, IdwMapping, IdwNeighbor, NnMapping, SpatialData};

/// Maps target points onto a borrowed set of source points
pub struct SpatialMapper<'a> {
    sources: &'a [SpatialData],
    config: &'a RegridConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> SpatialMapper<'a> {
    /// Create a mapper over a non-empty source set
    pub fn new(
        sources: &'a [SpatialData],
        config: &'a RegridConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(RegridError::EmptyInput {
                message: "Source point list is empty".to_string(),
            });
        }

        Ok(Self {
            sources,
            config,
            sink,
        })
    }

    /// Find the nearest source of every target
    pub fn find_nearest_neighbors(&self, targets: &[SpatialData]) -> Result<Vec<NnMapping>> {
        let mut mappings = Vec::with_capacity(targets.len());

        for (target_index, target) in targets.iter().enumerate() {
            let (source, distance) = self.nearest_source(target)?;
            let distance_km =
                distance_in_km(distance, target.latitude(), self.config.distance_metric);

            if self.config.verbose && distance_km > self.config.radius {
                self.sink.report(Diagnostic::NearestBeyondRadius {
                    target_lon: target.longitude(),
                    target_lat: target.latitude(),
                    distance_km,
                    radius_km: self.config.radius,
                });
            }

            mappings.push(NnMapping {
                target_lon: target.longitude(),
                target_lat: target.latitude(),
                source_lon: source.longitude(),
                source_lat: source.latitude(),
                distance_km,
                target_index,
            });
        }

        Ok(mappings)
    }

    /// Find up to `max_points` sources inside the radius of every target,
    /// falling back to the nearest source when fewer than `min_points` qualify
    pub fn find_idw_neighbors(&self, targets: &[SpatialData]) -> Result<Vec<IdwMapping>> {
        let mut mappings = Vec::with_capacity(targets.len());

        for (target_index, target) in targets.iter().enumerate() {
            let mut neighbors = self.candidates_within_radius(target)?;
            let mut is_fallback = false;

            if neighbors.len() < self.config.min_points {
                if self.config.verbose {
                    self.sink.report(Diagnostic::IdwFallback {
                        target_lon: target.longitude(),
                        target_lat: target.latitude(),
                        found: neighbors.len(),
                        min_points: self.config.min_points,
                        radius_km: self.config.radius,
                    });
                }

                is_fallback = true;
                neighbors.clear();

                let (source, distance) = self.nearest_source(target)?;
                neighbors.push(IdwNeighbor {
                    source_lon: source.longitude(),
                    source_lat: source.latitude(),
                    distance_km: distance_in_km(
                        distance,
                        target.latitude(),
                        self.config.distance_metric,
                    ),
                });
            } else {
                // Stable sort keeps first-seen order among equal distances
                neighbors.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(Ordering::Equal)
                });
                neighbors.truncate(self.config.max_points);

                if self.config.distance_metric == DistanceMetric::Euclidean {
                    for neighbor in &mut neighbors {
                        neighbor.distance_km = distance_in_km(
                            neighbor.distance_km,
                            target.latitude(),
                            DistanceMetric::Euclidean,
                        );
                    }
                }
            }

            if neighbors.is_empty() {
                return Err(RegridError::NoSourceForTarget {
                    lon: target.longitude(),
                    lat: target.latitude(),
                });
            }

            mappings.push(IdwMapping {
                target_lon: target.longitude(),
                target_lat: target.latitude(),
                neighbors,
                target_index,
                is_fallback,
            });
        }

        Ok(mappings)
    }

    /// Nearest source and its distance in the metric's native unit
    fn nearest_source(&self, target: &SpatialData) -> Result<(&'a SpatialData, f64)> {
        let mut best: Option<(&'a SpatialData, f64)> = None;

        for source in self.sources {
            let distance = self.distance(target, source)?;
            match best {
                Some((_, min_distance)) if distance >= min_distance => {}
                _ => best = Some((source, distance)),
            }
        }

        best.ok_or_else(|| RegridError::NoSourceForTarget {
            lon: target.longitude(),
            lat: target.latitude(),
        })
    }

    /// Sources admitted by the radius test, distances still in the native unit
    fn candidates_within_radius(&self, target: &SpatialData) -> Result<Vec<IdwNeighbor>> {
        let threshold = match self.config.distance_metric {
            DistanceMetric::Haversine => self.config.radius,
            DistanceMetric::Euclidean => km_to_degrees(self.config.radius, target.latitude())?,
        };

        let mut candidates = Vec::new();
        for source in self.sources {
            let distance = self.distance(target, source)?;
            if distance <= threshold {
                candidates.push(IdwNeighbor {
                    source_lon: source.longitude(),
                    source_lat: source.latitude(),
                    distance_km: distance,
                });
            }
        }

        Ok(candidates)
    }

    fn distance(&self, target: &SpatialData, source: &SpatialData) -> Result<f64> {
        compute_distance(
            target.longitude(),
            target.latitude(),
            source.longitude(),
            source.latitude(),
            self.config.distance_metric,
        )
    }
}
