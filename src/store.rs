use std::time::{SystemTime, UNIX_EPOCH};

use _model::{Address, AddressDraft, AddressId, AddressPatch, Location};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One mutation of the address store.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetLocation(Location),
    AddAddress(AddressDraft),
    UpdateAddress { id: AddressId, patch: AddressPatch },
    DeleteAddress(AddressId),
    SetDefaultAddress(AddressId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
}

/// The part of the store that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub addresses: Vec<Address>,
}

/// Addresses in insertion order plus the location currently picked on the
/// map.
#[derive(Debug, Default)]
pub struct AddressStore {
    addresses: Vec<Address>,
    current_location: Option<Location>,
    last_id: u64,
}

impl AddressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let last_id = snapshot
            .addresses
            .iter()
            .filter_map(|x| x.id.numeric())
            .max()
            .unwrap_or_default();
        Self {
            addresses: snapshot.addresses,
            current_location: None,
            last_id,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            addresses: self.addresses.clone(),
        }
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|x| &x.id == id)
    }

    pub fn current_location(&self) -> Option<&Location> {
        self.current_location.as_ref()
    }

    pub fn get_default(&self) -> Option<&Address> {
        self.addresses.iter().find(|x| x.is_default)
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::SetLocation(x) => {
                self.set_location(x);
                Outcome::Applied
            }
            Command::AddAddress(x) => {
                self.add_address(x);
                Outcome::Applied
            }
            Command::UpdateAddress { id, patch } => self.update_address(&id, patch),
            Command::DeleteAddress(id) => self.delete_address(&id),
            Command::SetDefaultAddress(id) => self.set_default_address(&id),
        }
    }

    pub fn set_location(&mut self, location: Location) {
        debug!(address = %location.address.formatted_address, "picked location");
        self.current_location = Some(location);
    }

    /// Appends the draft under a fresh id. `is_default` is taken as given:
    /// other defaults are left alone.
    pub fn add_address(&mut self, draft: AddressDraft) -> AddressId {
        let id = self.next_id();
        info!(%id, "adding address");
        self.addresses.push(Address::new(id.clone(), draft));
        id
    }

    /// Unknown ids are ignored.
    pub fn update_address(&mut self, id: &AddressId, patch: AddressPatch) -> Outcome {
        match self.addresses.iter_mut().find(|x| &x.id == id) {
            Some(x) => {
                info!(%id, "updating address");
                x.apply(patch);
                Outcome::Applied
            }
            None => {
                debug!(%id, "update for unknown address ignored");
                Outcome::Unchanged
            }
        }
    }

    pub fn delete_address(&mut self, id: &AddressId) -> Outcome {
        let before = self.addresses.len();
        self.addresses.retain(|x| &x.id != id);
        if self.addresses.len() == before {
            return Outcome::Unchanged;
        }
        info!(%id, "deleted address");
        Outcome::Applied
    }

    /// Moves the default flag to `id`. An unknown id leaves no default at all.
    pub fn set_default_address(&mut self, id: &AddressId) -> Outcome {
        let mut changed = false;
        for x in self.addresses.iter_mut() {
            let is_default = &x.id == id;
            changed |= x.is_default != is_default;
            x.is_default = is_default;
        }
        if changed {
            info!(%id, "default address moved");
            Outcome::Applied
        } else {
            Outcome::Unchanged
        }
    }

    fn next_id(&mut self) -> AddressId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|x| x.as_millis() as u64)
            .unwrap_or_default();
        if let Some(next) = self.last_id.checked_add(1) {
            self.last_id = now.max(next);
            return AddressId::from(self.last_id);
        }
        // a stored id sits at u64::MAX; of len + 1 candidates one is free
        warn!("address id counter exhausted, picking any free id");
        (0..=self.addresses.len() as u64)
            .map(|x| AddressId::from(now.wrapping_add(x)))
            .find(|x| self.get(x).is_none())
            .unwrap_or_else(|| AddressId::from(now))
    }
}
