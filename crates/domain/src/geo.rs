//! Home location and the flat-degree search box around it.
//!
//! The tracker's nearest-stop search takes a latitude/longitude rectangle.
//! The rectangle is a plain ± offset in degrees on both axes, not a geodesic
//! circle; that is only meaningful at the latitudes the service operates in.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Degrees of latitude per kilometre, as used by the tracker's own clients.
pub const DEGREES_PER_KM: f64 = 0.008_999;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The fixed place deliveries are tracked for, captured once at setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl HomeLocation {
    /// Parse user-supplied text into a home location.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name and
    /// [`ValidationError::InvalidCoordinates`] when either coordinate is not
    /// a finite decimal number.
    pub fn parse(name: &str, latitude: &str, longitude: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            latitude: parse_degrees("latitude", latitude)?,
            longitude: parse_degrees("longitude", longitude)?,
        })
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

fn parse_degrees(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::InvalidCoordinates {
            field,
            value: raw.to_string(),
        })
}

/// Half-width of the nearest-stop search box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Box used by the setup form of earlier releases (5 km).
    pub const SETUP_LEGACY: Self = Self(5.0 * DEGREES_PER_KM);
    /// Box used by polling (10 km). Default for both paths.
    pub const POLL: Self = Self(10.0 * DEGREES_PER_KM);

    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveRadius`] unless `degrees` is
    /// finite and strictly positive.
    pub fn new(degrees: f64) -> Result<Self, ValidationError> {
        if degrees.is_finite() && degrees > 0.0 {
            Ok(Self(degrees))
        } else {
            Err(ValidationError::NonPositiveRadius(degrees))
        }
    }

    #[must_use]
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self::POLL
    }
}

impl TryFrom<f64> for SearchRadius {
    type Error = ValidationError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees)
    }
}

impl From<SearchRadius> for f64 {
    fn from(radius: SearchRadius) -> Self {
        radius.0
    }
}

/// Axis-aligned latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_long: f64,
    pub max_long: f64,
}

impl BoundingBox {
    /// Square of ±`radius` degrees around `center`.
    #[must_use]
    pub fn around(center: Coordinate, radius: SearchRadius) -> Self {
        let r = radius.degrees();
        Self {
            min_lat: center.latitude - r,
            max_lat: center.latitude + r,
            min_long: center.longitude - r,
            max_long: center.longitude + r,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_long..=self.max_long).contains(&point.longitude)
    }
}
