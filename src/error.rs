use std::io;

use thiserror::Error;

/// Geocoding and postal lookups that did not produce an answer.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("geocoder returned status {0}")]
    Api(String),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("no address found")]
    NoResults,
    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<ureq::Error> for ResolutionError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(x) => Self::Transport(x.to_string()),
        }
    }
}

impl From<io::Error> for ResolutionError {
    // ureq surfaces body read and JSON decode failures as io errors
    fn from(e: io::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for ResolutionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Why the device could not tell us where it is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission is denied")]
    PermissionDenied,
    #[error("location permission is blocked, enable it in the device settings")]
    Blocked,
    #[error("location permission is not available on this platform")]
    Unavailable,
    #[error("unable to determine your location")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("unknown location error (code {0})")]
    Unknown(i32),
}

impl LocationError {
    /// Maps the platform geolocation error codes.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            x => Self::Unknown(x),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage io: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}
