//! Inverse distance weighted interpolation.
//!
//! Every value component of a target is the weighted arithmetic mean of the
//! matching components of its resolved neighbors, with `w = 1 / d^power`.
//! Fallback mappings carry a single neighbor and are copied like nearest
//! neighbor.

use super::common::{idw_weight, target_at, SourceLookup};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{RegridError, Result};
use crate::types::{IdwMapping, SpatialData};

/// Interpolate every IDW mapping, dropping targets with no resolvable neighbor.
///
/// Fails with `NoInterpolation` when nothing is left.
pub fn interpolate_idw(
    lookup: &SourceLookup<'_>,
    targets: &[SpatialData],
    mappings: &[IdwMapping],
    power: f64,
    verbose: bool,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<SpatialData>> {
    let mut result = Vec::with_capacity(mappings.len());

    for mapping in mappings {
        let target = target_at(targets, mapping.target_index, "IDW")?;

        let values = if mapping.is_fallback {
            let neighbor = match mapping.neighbors.as_slice() {
                [only] => only,
                _ => {
                    return Err(RegridError::invalid(
                        "neighbors",
                        format!(
                            "Invalid fallback mapping for target {}: expected one source point, got {}",
                            mapping.target_index,
                            mapping.neighbors.len()
                        ),
                    ))
                }
            };
            lookup
                .resolve_for(target, neighbor.source_lon, neighbor.source_lat, verbose, sink)
                .map(|source| source.values.clone())
        } else {
            weighted_values(lookup, target, mapping, power, verbose, sink)
        };

        if let Some(values) = values {
            result.push(SpatialData {
                grid_point: target.grid_point,
                time_step: target.time_step,
                values,
            });
        }
    }

    if result.is_empty() {
        return Err(RegridError::NoInterpolation {
            method: "IDW".to_string(),
        });
    }

    Ok(result)
}

/// Weighted mean over the resolved neighbors, `None` if none resolved
fn weighted_values(
    lookup: &SourceLookup<'_>,
    target: &SpatialData,
    mapping: &IdwMapping,
    power: f64,
    verbose: bool,
    sink: &dyn DiagnosticSink,
) -> Option<Vec<f64>> {
    let mut values = vec![0.0; lookup.value_len()];
    let mut weight_sum = 0.0;
    let mut resolved = 0;

    for neighbor in &mapping.neighbors {
        let Some(source) =
            lookup.resolve_for(target, neighbor.source_lon, neighbor.source_lat, verbose, sink)
        else {
            continue;
        };

        let weight = idw_weight(neighbor.distance_km, power);
        weight_sum += weight;
        resolved += 1;
        for (acc, value) in values.iter_mut().zip(&source.values) {
            *acc += weight * value;
        }
    }

    if resolved == 0 {
        if verbose {
            sink.report(Diagnostic::NoResolvedNeighbors {
                target_lon: mapping.target_lon,
                target_lat: mapping.target_lat,
                time_step: target.time_step,
            });
        }
        return None;
    }

    for value in &mut values {
        *value /= weight_sum;
    }
    Some(values)
}
