//! Core data types for regrid.
//!
//! This module defines the point records read from grid files, the option
//! enumerations that select metric, method and layout, and the mapping records
//! produced by the spatial mapper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RegridError;

/// A geospatial location in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
}

impl GridPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Data for a grid point at a specific time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialData {
    /// Geospatial coordinates
    pub grid_point: GridPoint,
    /// Time identifier (e.g. a year); only ever compared for equality
    pub time_step: i32,
    /// Data values (e.g. 12 monthly values)
    pub values: Vec<f64>,
}

impl SpatialData {
    pub fn new(longitude: f64, latitude: f64, time_step: i32, values: Vec<f64>) -> Self {
        Self {
            grid_point: GridPoint::new(longitude, latitude),
            time_step,
            values,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.grid_point.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.grid_point.latitude
    }
}

/// Interpolation method options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[serde(alias = "nn", alias = "nearest")]
    NearestNeighbor,
    #[serde(alias = "idw")]
    InverseDistanceWeighted,
}

impl InterpolationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::NearestNeighbor => "NN",
            InterpolationMethod::InverseDistanceWeighted => "IDW",
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = RegridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nn" | "nearest" | "nearest_neighbor" => Ok(InterpolationMethod::NearestNeighbor),
            "idw" | "inverse_distance_weighted" => Ok(InterpolationMethod::InverseDistanceWeighted),
            _ => Err(RegridError::invalid(
                "interp_method",
                format!("Unknown interpolation method: {}", s),
            )),
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Distance metric options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Planar distance in raw degrees
    Euclidean,
    /// Great-circle distance in kilometers
    Haversine,
}

impl FromStr for DistanceMetric {
    type Err = RegridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "haversine" => Ok(DistanceMetric::Haversine),
            _ => Err(RegridError::invalid(
                "distance_metric",
                format!("Unknown distance metric: {}", s),
            )),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => f.write_str("EUCLIDEAN"),
            DistanceMetric::Haversine => f.write_str("HAVERSINE"),
        }
    }
}

/// Data layout options for input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLayout {
    /// Variable number of values per row
    YearByYear,
    /// Exactly 12 monthly values per row
    GridByTime,
}

impl DataLayout {
    /// Number of values each row must carry, if fixed by the layout
    pub fn fixed_value_count(&self) -> Option<usize> {
        match self {
            DataLayout::GridByTime => Some(12),
            DataLayout::YearByYear => None,
        }
    }
}

impl FromStr for DataLayout {
    type Err = RegridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year_by_year" | "annual" => Ok(DataLayout::YearByYear),
            "grid_by_time" | "monthly" => Ok(DataLayout::GridByTime),
            _ => Err(RegridError::invalid(
                "data_layout",
                format!("Unknown data layout: {}", s),
            )),
        }
    }
}

impl fmt::Display for DataLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLayout::YearByYear => f.write_str("YEAR_BY_YEAR"),
            DataLayout::GridByTime => f.write_str("GRID_BY_TIME"),
        }
    }
}

/// Nearest-neighbor mapping of one target point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NnMapping {
    pub target_lon: f64,
    pub target_lat: f64,
    pub source_lon: f64,
    pub source_lat: f64,
    /// Always kilometers, whatever the metric
    pub distance_km: f64,
    /// Position of the target in the target sequence
    pub target_index: usize,
}

/// One source participating in an IDW mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IdwNeighbor {
    pub source_lon: f64,
    pub source_lat: f64,
    pub distance_km: f64,
}

/// Inverse-distance-weighted mapping of one target point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdwMapping {
    pub target_lon: f64,
    pub target_lat: f64,
    /// Sorted by ascending distance; exactly one entry when `is_fallback`
    pub neighbors: Vec<IdwNeighbor>,
    pub target_index: usize,
    /// Set when too few sources were inside the radius and the nearest one was used
    pub is_fallback: bool,
}
