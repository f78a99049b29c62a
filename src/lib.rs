//! # regrid
//!
//! Regridding of point-based geospatial data.
//!
//! Given a source set of observations on one point grid and a target set of
//! desired locations, this library produces, for every target, a vector of
//! values interpolated from nearby sources sharing the same time step.
//!
//! ## Key Features
//!
//! - **Two methods**: Nearest Neighbor and Inverse Distance Weighted, with a
//!   per-target fallback from IDW to nearest neighbor
//! - **Two metrics**: great-circle (Haversine) and planar degrees (Euclidean)
//! - **Two layouts**: fixed 12-value monthly rows and variable-length annual rows
//! - **Exact search**: every target is compared against every source
//!
//! ## Architecture
//!
//! - **Geodesy**: distances, longitude normalization, km/degree conversion
//! - **Spatial mapping**: NN and IDW neighbor selection
//! - **Interpolation**: value copy or weighted mean over the mapped sources
//! - **Pipeline**: file reading, layout checks, report and data writing

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geodesy;
pub mod interpolation;
pub mod io;
pub mod logging;
pub mod regridder;
pub mod spatial_index;
pub mod types;

pub use config::{RegridConfig, RegridConfigBuilder};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use error::{RegridError, Result};
pub use interpolation::Interpolator;
pub use logging::{
    generate_run_id, init_tracing, log_error, log_operation_end, log_operation_start,
    log_regrid_stats, log_timed_operation,
};
pub use regridder::{regrid_points, validate_headers, RegridOutcome, RegridSummary, Regridder};
pub use spatial_index::SpatialMapper;
pub use types::{
    DataLayout, DistanceMetric, GridPoint, IdwMapping, IdwNeighbor, InterpolationMethod,
    NnMapping, SpatialData,
};
