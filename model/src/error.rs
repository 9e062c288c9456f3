use thiserror::Error;

/// A caller handed over data that breaks the shape of an address.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationViolation {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid pincode {0:?}: expected 6 digits")]
    InvalidPincode(String),
    #[error("latitude {0} out of range")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} out of range")]
    LongitudeOutOfRange(f64),
    #[error("viewport deltas must be positive")]
    InvalidViewport,
    #[error("invalid coordinates {0:?}: expected <lat>,<lng>")]
    MalformedCoordinates(String),
}
