//! Verbose diagnostics.
//!
//! The mapper, the interpolator and the input reader report recoverable
//! oddities (a nearest source beyond the radius, an IDW fallback, a source that
//! cannot be resolved) to a [`DiagnosticSink`] handed in by the caller. They
//! never change results. Components only emit them when `verbose` is set.

use std::cell::RefCell;
use std::fmt;
use tracing::warn;

/// A single verbose warning
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The nearest source of a target lies beyond the configured radius
    NearestBeyondRadius {
        target_lon: f64,
        target_lat: f64,
        distance_km: f64,
        radius_km: f64,
    },
    /// Too few sources inside the radius, IDW reverted to nearest neighbor
    IdwFallback {
        target_lon: f64,
        target_lat: f64,
        found: usize,
        min_points: usize,
        radius_km: f64,
    },
    /// No source record matches the coordinates and time step of a mapping
    SourceNotFound {
        target_lon: f64,
        target_lat: f64,
        time_step: i32,
        source_lon: f64,
        source_lat: f64,
    },
    /// None of the neighbors of an IDW target could be resolved
    NoResolvedNeighbors {
        target_lon: f64,
        target_lat: f64,
        time_step: i32,
    },
    /// An input line whose coordinates or time step did not parse
    MalformedLine { path: String, line: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NearestBeyondRadius {
                target_lon,
                target_lat,
                distance_km,
                radius_km,
            } => write!(
                f,
                "Nearest source point for target ({}, {}) is at distance {} km, exceeding radius {} km",
                target_lon, target_lat, distance_km, radius_km
            ),
            Diagnostic::IdwFallback {
                target_lon,
                target_lat,
                found,
                min_points,
                radius_km,
            } => write!(
                f,
                "Only {} points found within radius {} km for target ({}, {}); falling back to Nearest Neighbor (min_points = {})",
                found, radius_km, target_lon, target_lat, min_points
            ),
            Diagnostic::SourceNotFound {
                target_lon,
                target_lat,
                time_step,
                source_lon,
                source_lat,
            } => write!(
                f,
                "No source point found for target ({}, {}, {}) at source ({}, {})",
                target_lon, target_lat, time_step, source_lon, source_lat
            ),
            Diagnostic::NoResolvedNeighbors {
                target_lon,
                target_lat,
                time_step,
            } => write!(
                f,
                "No valid source points for target ({}, {}, {}) in IDW interpolation",
                target_lon, target_lat, time_step
            ),
            Diagnostic::MalformedLine { path, line } => {
                write!(f, "Skipping malformed line {} in file: {}", line, path)
            }
        }
    }
}

/// Receiver for verbose diagnostics
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the tracing subscriber as warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(diagnostic = %diagnostic, "Regrid diagnostic");
    }
}

/// Keeps diagnostics in memory, mostly for tests
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
