use std::sync::Arc;

use _model::{AddressDetails, CityState};
use async_trait::async_trait;
use tracing::{debug, warn};
use ureq::{Agent, AgentBuilder};

use super::{GeocodeResponse, PincodeResponse, Resolver};
use crate::{
    config::{GeocodingConfig, PincodeConfig},
    error::ResolutionError,
};

/// Talks to the geocoding and postal lookup services over HTTP.
///
/// `ureq` blocks, so every call is moved onto tokio's blocking pool.
#[derive(Clone)]
pub struct HttpResolver {
    agent: Agent,
    geocoding: Arc<GeocodingConfig>,
    pincode: Arc<PincodeConfig>,
}

impl HttpResolver {
    pub fn new(geocoding: GeocodingConfig, pincode: PincodeConfig) -> Self {
        let agent = AgentBuilder::new()
            .user_agent(concat!("addresses/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            geocoding: Arc::new(geocoding),
            pincode: Arc::new(pincode),
        }
    }

    pub fn geocode_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latlng={latitude},{longitude}&key={}",
            self.geocoding.url, self.geocoding.api_key
        )
    }

    pub fn pincode_url(&self, code: &str) -> String {
        format!("{}/{code}", self.pincode.url.trim_end_matches('/'))
    }

    fn reverse_geocode_blocking(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AddressDetails, ResolutionError> {
        debug!(latitude, longitude, "reverse geocoding");
        let response: GeocodeResponse = self
            .agent
            .get(&self.geocode_url(latitude, longitude))
            .call()?
            .into_json()?;
        response.into_details().inspect_err(|e| {
            warn!(latitude, longitude, "no address for location: {e}");
        })
    }

    fn lookup_postal_code_blocking(&self, code: &str) -> Result<Option<CityState>, ResolutionError> {
        debug!(code, "looking up pincode");
        let response: Vec<PincodeResponse> = self
            .agent
            .get(&self.pincode_url(code))
            .call()?
            .into_json()?;
        Ok(PincodeResponse::city_state(response))
    }
}

async fn blocking<T, F>(f: F) -> Result<T, ResolutionError>
where
    F: FnOnce() -> Result<T, ResolutionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ResolutionError::Transport(e.to_string()))?
}

#[async_trait]
impl Resolver for HttpResolver {
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AddressDetails, ResolutionError> {
        let this = self.clone();
        blocking(move || this.reverse_geocode_blocking(latitude, longitude)).await
    }

    async fn lookup_postal_code(&self, code: &str) -> Result<Option<CityState>, ResolutionError> {
        let this = self.clone();
        let code = code.to_string();
        blocking(move || this.lookup_postal_code_blocking(&code)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        let resolver = HttpResolver::new(
            GeocodingConfig {
                url: "https://geo.example/json".into(),
                api_key: "k3y".into(),
            },
            PincodeConfig {
                url: "https://pin.example/pincode/".into(),
            },
        );
        assert_eq!(
            resolver.geocode_url(12.9716, 77.5946),
            "https://geo.example/json?latlng=12.9716,77.5946&key=k3y"
        );
        assert_eq!(
            resolver.pincode_url("560001"),
            "https://pin.example/pincode/560001"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let resolver = HttpResolver::new(
            GeocodingConfig {
                url: "http://127.0.0.1:9/json".into(),
                api_key: String::new(),
            },
            PincodeConfig {
                url: "http://127.0.0.1:9/pincode".into(),
            },
        );
        assert!(matches!(
            resolver.reverse_geocode(0.0, 0.0).await,
            Err(ResolutionError::Transport(_))
        ));
        assert!(matches!(
            resolver.lookup_postal_code("560001").await,
            Err(ResolutionError::Transport(_))
        ));
    }
}
