use std::sync::Arc;

use _model::{AddressDetails, Coordinates, Location};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    config::Timeouts,
    error::LocationError,
    resolve::{geocode_within, locate_within, Debouncer},
    services::{ensure_permission, DeviceLocator, PermissionGate, Resolver},
};

#[derive(Debug, Clone, PartialEq)]
pub enum MapState {
    Loading,
    /// Location access was refused for good. `enable_access` asks again.
    PermissionBlocked,
    /// Something went wrong fetching the location. `retry` tries again.
    Failed(String),
    Ready {
        region: Coordinates,
        /// `None` while the address for the region is still being looked up.
        address: Option<AddressDetails>,
    },
}

/// Picking a point on a map: where the device is, what address is under the
/// pin, and which location the user confirmed.
pub struct MapSession {
    resolver: Arc<dyn Resolver>,
    locator: Arc<dyn DeviceLocator>,
    permissions: Arc<dyn PermissionGate>,
    timeouts: Timeouts,
    state: Arc<watch::Sender<MapState>>,
    debouncer: Debouncer,
}

impl MapSession {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        locator: Arc<dyn DeviceLocator>,
        permissions: Arc<dyn PermissionGate>,
        timeouts: Timeouts,
    ) -> Self {
        let (state, _) = watch::channel(MapState::Loading);
        Self {
            resolver,
            locator,
            permissions,
            debouncer: Debouncer::new(timeouts.debounce()),
            timeouts,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> MapState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MapState> {
        self.state.subscribe()
    }

    fn publish(&self, state: MapState) {
        if self.debouncer.is_alive() {
            self.state.send_replace(state);
        }
    }

    /// Starts from the device's own position, asking for permission first.
    pub async fn open(&mut self) {
        self.publish(MapState::Loading);
        match ensure_permission(self.permissions.as_ref()).await {
            Ok(()) => self.fetch().await,
            Err(LocationError::Blocked) => self.publish(MapState::PermissionBlocked),
            Err(e) => {
                debug!("no location permission: {e}");
                self.publish(MapState::Failed(e.to_string()));
            }
        }
    }

    /// Starts from a known point, e.g. a place search result.
    pub async fn open_at(&mut self, region: Coordinates) {
        self.publish(MapState::Ready {
            region,
            address: None,
        });
        self.resolve(region).await;
    }

    pub async fn retry(&mut self) {
        self.fetch().await;
    }

    /// The remediation for [`MapState::PermissionBlocked`].
    pub async fn enable_access(&mut self) {
        self.open().await;
    }

    async fn fetch(&mut self) {
        self.publish(MapState::Loading);
        let region = match locate_within(self.locator.as_ref(), self.timeouts.location()).await {
            Ok(x) => x,
            Err(e) => {
                warn!("failed to get current location: {e}");
                self.publish(MapState::Failed(e.to_string()));
                return;
            }
        };
        self.publish(MapState::Ready {
            region,
            address: None,
        });
        self.resolve(region).await;
    }

    async fn resolve(&mut self, region: Coordinates) {
        match geocode_within(self.resolver.as_ref(), self.timeouts.geocode(), &region).await {
            Ok(address) => self.publish(MapState::Ready {
                region,
                address: Some(address),
            }),
            Err(e) => {
                warn!("failed to fetch address: {e}");
                self.publish(MapState::Failed(e.to_string()));
            }
        }
    }

    /// The map moved. The region updates now, the address once the map has
    /// settled; a failed lookup keeps the previous address.
    pub fn region_changed(&mut self, region: Coordinates) {
        if !self.debouncer.is_alive() {
            return;
        }
        self.state.send_modify(|x| match x {
            MapState::Ready { region: r, .. } => *r = region,
            x => {
                *x = MapState::Ready {
                    region,
                    address: None,
                }
            }
        });

        let resolver = self.resolver.clone();
        let state = self.state.clone();
        let limit = self.timeouts.geocode();
        self.debouncer.schedule(move |ticket| async move {
            let result = geocode_within(resolver.as_ref(), limit, &region).await;
            if !ticket.is_current() {
                debug!("dropping address for superseded region");
                return;
            }
            match result {
                Ok(address) => {
                    // checked again under the lock so `close` cannot slip in between
                    state.send_if_modified(|x| match x {
                        MapState::Ready {
                            region: r,
                            address: a,
                        } if ticket.is_current() && *r == region => {
                            *a = Some(address);
                            true
                        }
                        _ => false,
                    });
                }
                Err(e) => warn!("failed to fetch address for this location: {e}"),
            }
        });
    }

    /// The picked location, once there is an address for it.
    pub fn confirm(&self) -> Option<Location> {
        match self.state() {
            MapState::Ready {
                region,
                address: Some(address),
            } => Some(Location {
                coordinates: region,
                address,
            }),
            _ => None,
        }
    }

    /// Nothing scheduled before this will touch the state afterwards.
    pub fn close(&mut self) {
        self.debouncer.close();
        // waits out a write already holding the lock
        self.state.send_if_modified(|_| false);
    }
}
