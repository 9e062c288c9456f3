use std::str::FromStr;

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

use crate::ValidationViolation;

pub const DEFAULT_LATITUDE_DELTA: f64 = 0.0922;
pub const DEFAULT_LONGITUDE_DELTA: f64 = 0.0421;

/// A map centre plus the viewport span around it. The deltas are zoom, not
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Coordinates {
    /// A centre point with the default viewport.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationViolation> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationViolation::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationViolation::LongitudeOutOfRange(self.longitude));
        }
        if !(self.latitude_delta > 0.0 && self.longitude_delta > 0.0) {
            return Err(ValidationViolation::InvalidViewport);
        }
        Ok(())
    }

    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance between the two centres, in metres.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        self.point().haversine_distance(&other.point())
    }
}

impl FromStr for Coordinates {
    type Err = ValidationViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationViolation::MalformedCoordinates(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(malformed)?;
        let coords = Coordinates::new(
            lat.trim().parse().map_err(|_| malformed())?,
            lng.trim().parse().map_err(|_| malformed())?,
        );
        coords.validate()?;
        Ok(coords)
    }
}

/// What the geocoder made of a point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// The location most recently picked on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinates: Coordinates,
    pub address: AddressDetails,
}
