use std::{future::Future, time::Duration};

use _model::{AddressDetails, Coordinates};
use tracing::warn;

use crate::{
    error::{LocationError, ResolutionError},
    services::{DeviceLocator, Resolver},
};

/// Whichever settles first wins. On timeout the lookup future is dropped,
/// so nothing it would have done afterwards can happen.
pub async fn race<T, E, F>(limit: Duration, timed_out: E, lookup: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, lookup).await {
        Ok(x) => x,
        Err(_) => {
            warn!(?limit, "lookup timed out");
            Err(timed_out)
        }
    }
}

pub async fn geocode_within(
    resolver: &dyn Resolver,
    limit: Duration,
    at: &Coordinates,
) -> Result<AddressDetails, ResolutionError> {
    race(
        limit,
        ResolutionError::Timeout(limit),
        resolver.reverse_geocode(at.latitude, at.longitude),
    )
    .await
}

pub async fn locate_within(
    locator: &dyn DeviceLocator,
    limit: Duration,
) -> Result<Coordinates, LocationError> {
    race(limit, LocationError::Timeout, locator.current_position()).await
}
