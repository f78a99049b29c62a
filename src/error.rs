//! Error types for regrid.
//!
//! Every failure of a regrid run is fatal to that run, so a single enum covers
//! configuration problems, malformed input, and the two terminal conditions of
//! the mapping and interpolation phases.

use thiserror::Error;

/// The main error type for regrid operations.
#[derive(Error, Debug)]
pub enum RegridError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Out-of-range parameters, coordinates or unknown enumerators
    #[error("Invalid argument: {param} - {message}")]
    InvalidArgument { param: String, message: String },

    /// Source or target set empty after parsing
    #[error("Empty input: {message}")]
    EmptyInput { message: String },

    /// Header shape incompatible with the layout, or source/target disagree
    #[error("Layout mismatch: {message}")]
    LayoutMismatch { message: String },

    /// A row of an input file could not be parsed
    #[error("Parse error in {path} at line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    /// IDW mapping found no neighbor even after the nearest-neighbor fallback
    #[error("No valid source points found for target ({lon}, {lat})")]
    NoSourceForTarget { lon: f64, lat: f64 },

    /// The interpolator produced no output records
    #[error("No points interpolated in {method} mode")]
    NoInterpolation { method: String },
}

impl RegridError {
    /// Shorthand for building an `InvalidArgument` error
    pub fn invalid(param: &str, message: impl Into<String>) -> Self {
        RegridError::InvalidArgument {
            param: param.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with RegridError
pub type Result<T> = std::result::Result<T, RegridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RegridError::invalid("radius", "Radius must be non-negative");
        assert_eq!(
            err.to_string(),
            "Invalid argument: radius - Radius must be non-negative"
        );

        let err = RegridError::NoSourceForTarget { lon: 1.5, lat: -2.0 };
        assert_eq!(
            err.to_string(),
            "No valid source points found for target (1.5, -2)"
        );

        let err = RegridError::Parse {
            path: "source.txt".to_string(),
            line: 7,
            message: "Missing monthly values".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RegridError = io.into();
        assert!(matches!(err, RegridError::Io(_)));
    }
}
