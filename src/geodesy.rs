//! Geodesy primitives for handling coordinates and distances.
//!
//! Distances come in two flavors: great-circle kilometers (Haversine) and a
//! planar proxy in raw degrees (Euclidean). The Euclidean branch does not wrap
//! across the antimeridian, and callers that need kilometers must convert with
//! [`degrees_to_km`].

use crate::error::{RegridError, Result};
use crate::types::DistanceMetric;

/// Mean Earth radius used by the Haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.32;

/// Floor applied to |cos(lat)| so the conversion saturates at the poles
const MIN_COS_LAT: f64 = 1e-10;

/// Convert degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Normalize a longitude to [-180, 180] by whole turns
pub fn adjust_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return lon;
    }

    let mut adjusted = lon;
    if adjusted.abs() > 360.0 * 4.0 {
        // Jump close to the range first so huge inputs do not loop for long
        adjusted %= 360.0;
    }
    while adjusted > 180.0 {
        adjusted -= 360.0;
    }
    while adjusted < -180.0 {
        adjusted += 360.0;
    }
    adjusted
}

/// Convert a distance in km to degrees of longitude at the given latitude
pub fn km_to_degrees(km: f64, latitude: f64) -> Result<f64> {
    if km < 0.0 {
        return Err(RegridError::invalid(
            "km",
            "Distance in km must be non-negative",
        ));
    }
    if latitude.abs() > 90.0 {
        return Err(RegridError::invalid(
            "latitude",
            format!("Latitude must be in [-90, 90], got {}", latitude),
        ));
    }

    let cos_lat = to_radians(latitude).cos().abs().max(MIN_COS_LAT);
    Ok(km / (KM_PER_DEGREE * cos_lat))
}

/// Convert a planar distance in degrees to km at the given latitude
pub fn degrees_to_km(degrees: f64, latitude: f64) -> f64 {
    degrees * KM_PER_DEGREE * to_radians(latitude).cos()
}

/// Express a distance produced by `metric` in kilometers
pub fn distance_in_km(distance: f64, latitude: f64, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => distance,
        DistanceMetric::Euclidean => degrees_to_km(distance, latitude),
    }
}

/// Distance between two points: km for Haversine, degrees for Euclidean
pub fn compute_distance(
    lon1: f64,
    lat1: f64,
    lon2: f64,
    lat2: f64,
    metric: DistanceMetric,
) -> Result<f64> {
    if lat1.abs() > 90.0 || lat2.abs() > 90.0 {
        return Err(RegridError::invalid(
            "latitude",
            format!("Latitudes must be in [-90, 90], got {} and {}", lat1, lat2),
        ));
    }
    if lon1.abs() > 360.0 || lon2.abs() > 360.0 {
        return Err(RegridError::invalid(
            "longitude",
            format!(
                "Longitudes must be in [-360, 360], got {} and {}",
                lon1, lon2
            ),
        ));
    }

    let distance = match metric {
        DistanceMetric::Haversine => {
            let lat1_rad = to_radians(lat1);
            let lat2_rad = to_radians(lat2);
            let delta_lat = to_radians(lat2 - lat1);
            let delta_lon = to_radians(lon2 - lon1);

            let a = (delta_lat / 2.0).sin().powi(2)
                + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
            let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
            EARTH_RADIUS_KM * c
        }
        DistanceMetric::Euclidean => {
            let delta_lon = lon2 - lon1;
            let delta_lat = lat2 - lat1;
            (delta_lon * delta_lon + delta_lat * delta_lat).sqrt()
        }
    };

    Ok(distance)
}
