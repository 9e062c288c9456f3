//! Collaborators that know where things are: the geocoder, the postal
//! lookup and the device itself.

use _model::{AddressDetails, CityState};
use async_trait::async_trait;

use crate::error::ResolutionError;

mod device;
mod geocoding;
mod http;
mod pincode;

pub use device::{ensure_permission, DeviceLocator, Permission, PermissionGate, StaticLocator};
pub use geocoding::{find_component, AddressComponent, GeocodeResponse};
pub use http::HttpResolver;
pub use pincode::PincodeResponse;

#[async_trait]
pub trait Resolver: Send + Sync {
    /// Best-effort street address for a point.
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AddressDetails, ResolutionError>;

    /// `None` when the service has nothing for the code.
    async fn lookup_postal_code(&self, code: &str) -> Result<Option<CityState>, ResolutionError>;
}
