use _model::Coordinates;
use async_trait::async_trait;
use tracing::debug;

use crate::error::LocationError;

#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// The device's current (or last known) fix, with the default viewport.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    /// Not granted yet, asking may help.
    Denied,
    /// Refused for good, only the user can change it in the device settings.
    Blocked,
    Unavailable,
}

#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn check(&self) -> Permission;
    async fn request(&self) -> Permission;
}

/// Check, asking once when that could still help.
pub async fn ensure_permission(gate: &dyn PermissionGate) -> Result<(), LocationError> {
    let permission = match gate.check().await {
        Permission::Denied => {
            debug!("location permission denied, requesting");
            gate.request().await
        }
        x => x,
    };
    match permission {
        Permission::Granted => Ok(()),
        Permission::Denied => Err(LocationError::PermissionDenied),
        Permission::Blocked => Err(LocationError::Blocked),
        Permission::Unavailable => Err(LocationError::Unavailable),
    }
}

/// A device that stays put, at a configured position if it has one.
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    position: Option<Coordinates>,
}

impl StaticLocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl DeviceLocator for StaticLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.position
            .map(|x| Coordinates::new(x.latitude, x.longitude))
            .ok_or(LocationError::PositionUnavailable)
    }
}

#[async_trait]
impl PermissionGate for Permission {
    async fn check(&self) -> Permission {
        *self
    }

    async fn request(&self) -> Permission {
        *self
    }
}
