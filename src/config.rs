use std::{fs, path::Path, path::PathBuf, time::Duration};

use _model::Coordinates;
use anyhow::{Context, Result};
use serde::Deserialize;

pub const API_KEY_ENV: &str = "GEOCODING_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoding: GeocodingConfig,
    pub pincode: PincodeConfig,
    pub storage: StorageConfig,
    pub timeouts: Timeouts,
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub url: String,
    pub api_key: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PincodeConfig {
    pub url: String,
}

impl Default for PincodeConfig {
    fn default() -> Self {
        Self {
            url: "https://api.postalpincode.in/pincode".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub geocode_secs: u64,
    pub location_secs: u64,
    pub debounce_millis: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            geocode_secs: 10,
            location_secs: 15,
            debounce_millis: 500,
        }
    }
}

impl Timeouts {
    pub fn geocode(&self) -> Duration {
        Duration::from_secs(self.geocode_secs)
    }

    pub fn location(&self) -> Duration {
        Duration::from_secs(self.location_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }
}

/// Where the device believes it is. Without a position every fix fails.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DeviceConfig {
    pub fn position(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

impl Config {
    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads the file if there is one, then applies the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::parse(
                &fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            )
            .with_context(|| format!("Failed to parse {}", path.display()))?,
            None => Self::default(),
        };
        if let Ok(x) = std::env::var(API_KEY_ENV) {
            config.geocoding.api_key = x;
        }
        Ok(config)
    }
}
