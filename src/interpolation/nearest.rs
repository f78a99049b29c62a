//! Nearest neighbor interpolation.
//!
//! Each target receives a verbatim copy of the value vector of the source its
//! NN mapping points at.

use super::common::{target_at, SourceLookup};
use crate::diagnostics::DiagnosticSink;
use crate::error::{RegridError, Result};
use crate::types::{NnMapping, SpatialData};

/// Copy resolved source values onto the mapped targets.
///
/// Mappings whose source cannot be resolved are dropped. Fails with
/// `NoInterpolation` when nothing is left.
pub fn interpolate_nearest(
    lookup: &SourceLookup<'_>,
    targets: &[SpatialData],
    mappings: &[NnMapping],
    verbose: bool,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<SpatialData>> {
    let mut result = Vec::with_capacity(mappings.len());

    for mapping in mappings {
        let target = target_at(targets, mapping.target_index, "NN")?;
        if let Some(source) =
            lookup.resolve_for(target, mapping.source_lon, mapping.source_lat, verbose, sink)
        {
            result.push(SpatialData {
                grid_point: target.grid_point,
                time_step: target.time_step,
                values: source.values.clone(),
            });
        }
    }

    if result.is_empty() {
        return Err(RegridError::NoInterpolation {
            method: "NN".to_string(),
        });
    }

    Ok(result)
}
