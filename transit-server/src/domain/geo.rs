//! Geographic coordinate type.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A WGS84 coordinate in degrees.
///
/// Carries no invariants beyond finiteness; callers that accept coordinates
/// from the outside world should run [`Coordinate::validate`] before using
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        let coord = Self { lat, lon };
        coord.validate()?;
        Ok(coord)
    }

    /// Check that both components are finite.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.lat.is_finite() && self.lon.is_finite() {
            Ok(())
        } else {
            Err(DomainError::NonFiniteCoordinate(self.lat, self.lon))
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
