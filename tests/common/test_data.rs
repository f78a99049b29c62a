//! Test data generation utilities.
//!
//! This module writes small grid files in both input layouts with known
//! values for testing the regridding pipeline end to end.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regrid::SpatialData;

/// Header of a GRID_BY_TIME file
pub const MONTHLY_HEADER: &str = "Lon Lat Year Jan Feb Mar Apr May Jun Jul Aug Sep Oct Nov Dec";

/// Render points as a grid file body under `header`
pub fn render_grid(header: &str, points: &[SpatialData]) -> String {
    let mut content = String::new();
    writeln!(content, "{}", header).unwrap();
    for point in points {
        write!(
            content,
            "{} {} {}",
            point.longitude(),
            point.latitude(),
            point.time_step
        )
        .unwrap();
        for value in &point.values {
            write!(content, " {}", value).unwrap();
        }
        content.push('\n');
    }
    content
}

/// Write a grid file and return its path
pub fn write_grid(dir: &Path, name: &str, header: &str, points: &[SpatialData]) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, render_grid(header, points))?;
    Ok(path)
}

/// Monthly values of a smooth synthetic field at (lon, lat)
pub fn monthly_values(lon: f64, lat: f64, year: i32) -> Vec<f64> {
    (0..12)
        .map(|month| {
            let seasonal = (month as f64 * std::f64::consts::PI / 6.0).sin();
            10.0 + 0.1 * lon - 0.2 * lat + 5.0 * seasonal + (year - 2000) as f64
        })
        .collect()
}

/// Regular lon/lat grid with monthly values for each year
pub fn monthly_grid(lons: &[f64], lats: &[f64], years: &[i32]) -> Vec<SpatialData> {
    let mut points = Vec::new();
    for &year in years {
        for &lat in lats {
            for &lon in lons {
                points.push(SpatialData::new(lon, lat, year, monthly_values(lon, lat, year)));
            }
        }
    }
    points
}

/// Evenly spaced values from `start` with `count` steps of `step`
pub fn axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}
