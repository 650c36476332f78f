//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// Latitude outside of `[-90, 90]` or not a finite number.
    #[error("invalid latitude: {0}")]
    Latitude(f64),
    /// Longitude outside of `[-180, 180]` or not a finite number.
    #[error("invalid longitude: {0}")]
    Longitude(f64),
    /// Camera measure that is not a positive finite number.
    #[error("invalid map measure: {0}")]
    Measure(f64),
}
