use std::time::Duration;

use _model::{AddressDraft, AddressId, CityState, Coordinates, Location, ValidationViolation};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::ResolutionError,
    resolve::race,
    services::{find_component, AddressComponent, Resolver},
    store::{AddressStore, Command},
};

/// A pick from the place search box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceSelection {
    pub description: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// The add/edit address form.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    pub draft: AddressDraft,
    editing: Option<AddressId>,
}

impl AddressForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edits the stored address, or starts a blank form if there is none.
    pub fn edit(store: &AddressStore, id: &AddressId) -> Self {
        match store.get(id) {
            Some(x) => Self {
                draft: x.draft(),
                editing: Some(id.clone()),
            },
            None => {
                debug!(%id, "nothing to edit, starting a new address");
                Self::new()
            }
        }
    }

    pub fn editing(&self) -> Option<&AddressId> {
        self.editing.as_ref()
    }

    /// Prefills from a picked location. Returns the postal code worth
    /// looking up, if the geocoder found one.
    pub fn apply_location(&mut self, location: &Location) -> Option<String> {
        let address = &location.address;
        self.draft.address_line1 = address.formatted_address.clone();
        self.draft.pincode = address.postal_code.clone().unwrap_or_default();
        self.draft.city = address.city.clone().unwrap_or_default();
        self.draft.state = address.state.clone().unwrap_or_default();
        address.postal_code.clone()
    }

    /// Blank answers keep what the form already had.
    pub fn apply_city_state(&mut self, found: Option<CityState>) {
        let Some(found) = found else {
            return;
        };
        if !found.city.is_empty() {
            self.draft.city = found.city;
        }
        if !found.state.is_empty() {
            self.draft.state = found.state;
        }
    }

    /// Prefills from a location, then refines city and state from the
    /// postal lookup. A failed lookup leaves the geocoder's answer in place.
    pub async fn load_location(
        &mut self,
        location: &Location,
        resolver: &dyn Resolver,
        limit: Duration,
    ) {
        let Some(code) = self.apply_location(location) else {
            return;
        };
        match race(
            limit,
            ResolutionError::Timeout(limit),
            resolver.lookup_postal_code(&code),
        )
        .await
        {
            Ok(found) => self.apply_city_state(found),
            Err(e) => warn!(%code, "error fetching city/state: {e}"),
        }
    }

    /// Prefills from a place search pick. Returns where to open the map.
    pub fn apply_place(&mut self, place: &PlaceSelection) -> Option<Coordinates> {
        let component = |kind| {
            find_component(&place.address_components, kind)
                .unwrap_or_default()
                .to_string()
        };
        self.draft.address_line1 = place.description.clone();
        self.draft.pincode = component("postal_code");
        self.draft.city = component("locality");
        self.draft.state = component("administrative_area_level_1");

        let at = place.geometry.as_ref()?.location;
        Some(Coordinates::new(at.lat, at.lng))
    }

    /// Turns the form into the store command it stands for. The picked
    /// location's coordinates come along when there is one.
    ///
    /// An edit without a fresh pick keeps the stored coordinates instead of
    /// clearing them: the patch leaves `coordinates` unset, and an unset
    /// patch field never erases anything.
    pub fn submit(self, location: Option<&Location>) -> Result<Command, ValidationViolation> {
        let mut draft = self.draft.normalized();
        if let Some(x) = location {
            draft.coordinates = Some(x.coordinates);
        }
        draft.validate()?;

        Ok(match self.editing {
            Some(id) => Command::UpdateAddress {
                id,
                patch: draft.into_patch(),
            },
            None => Command::AddAddress(draft),
        })
    }
}

#[cfg(test)]
mod tests {
    use _model::{Address, AddressDetails, AddressType};
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::store::Snapshot;

    fn location(postal_code: Option<&str>) -> Location {
        Location {
            coordinates: Coordinates::new(12.97, 77.59),
            address: AddressDetails {
                formatted_address: "12, MG Road, Bengaluru".into(),
                postal_code: postal_code.map(|x| x.to_string()),
                city: Some("Bengaluru".into()),
                state: Some("Karnataka".into()),
            },
        }
    }

    struct Lookup(Result<Option<CityState>, ()>);

    #[async_trait]
    impl Resolver for Lookup {
        async fn reverse_geocode(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<AddressDetails, ResolutionError> {
            Err(ResolutionError::NoResults)
        }

        async fn lookup_postal_code(
            &self,
            _code: &str,
        ) -> Result<Option<CityState>, ResolutionError> {
            self.0
                .clone()
                .map_err(|_| ResolutionError::Transport("offline".into()))
        }
    }

    #[test]
    fn prefill_from_location() {
        let mut form = AddressForm::new();
        form.draft.flat_number = "4B".into();
        assert_eq!(
            form.apply_location(&location(Some("560001"))).as_deref(),
            Some("560001")
        );
        assert_eq!(form.draft.address_line1, "12, MG Road, Bengaluru");
        assert_eq!(form.draft.pincode, "560001");
        assert_eq!(form.draft.city, "Bengaluru");
        assert_eq!(form.draft.flat_number, "4B");

        let mut sparse = location(None);
        sparse.address.city = None;
        assert_eq!(form.apply_location(&sparse), None);
        assert_eq!(form.draft.pincode, "");
        assert_eq!(form.draft.city, "");
    }

    #[test]
    fn city_state_keeps_blanks() {
        let mut form = AddressForm::new();
        form.apply_location(&location(Some("560001")));
        form.apply_city_state(Some(CityState {
            city: "Bangalore".into(),
            state: String::new(),
        }));
        assert_eq!(form.draft.city, "Bangalore");
        assert_eq!(form.draft.state, "Karnataka");

        form.apply_city_state(None);
        assert_eq!(form.draft.city, "Bangalore");
    }

    #[tokio::test]
    async fn load_location_refines_city() {
        let mut form = AddressForm::new();
        let found = Lookup(Ok(Some(CityState {
            city: "Bangalore".into(),
            state: "Karnataka".into(),
        })));
        form.load_location(&location(Some("560001")), &found, Duration::from_secs(10))
            .await;
        assert_eq!(form.draft.city, "Bangalore");

        let mut form = AddressForm::new();
        let offline = Lookup(Err(()));
        form.load_location(&location(Some("560001")), &offline, Duration::from_secs(10))
            .await;
        assert_eq!(form.draft.city, "Bengaluru");
        assert_eq!(form.draft.state, "Karnataka");
    }

    #[test]
    fn prefill_from_place() {
        let place: PlaceSelection = serde_json::from_value(json!({
            "description": "Cubbon Park, Bengaluru, Karnataka, India",
            "address_components": [
                { "long_name": "Bengaluru", "types": ["locality", "political"] },
                { "long_name": "Karnataka", "types": ["administrative_area_level_1"] },
                { "long_name": "560001", "types": ["postal_code"] }
            ],
            "geometry": { "location": { "lat": 12.9763, "lng": 77.5929 } }
        }))
        .unwrap();

        let mut form = AddressForm::new();
        let at = form.apply_place(&place).unwrap();
        assert_eq!(at, Coordinates::new(12.9763, 77.5929));
        assert_eq!(form.draft.address_line1, "Cubbon Park, Bengaluru, Karnataka, India");
        assert_eq!(form.draft.pincode, "560001");
        assert_eq!(form.draft.city, "Bengaluru");
        assert_eq!(form.draft.state, "Karnataka");

        let bare = PlaceSelection {
            description: "Somewhere".into(),
            ..Default::default()
        };
        assert_eq!(form.apply_place(&bare), None);
        assert_eq!(form.draft.city, "");
    }

    #[test]
    fn submit_new() {
        let mut form = AddressForm::new();
        form.apply_location(&location(Some("560001")));
        form.draft.flat_number = " 4B ".into();
        form.draft.kind = AddressType::Office;

        let picked = location(Some("560001"));
        match form.submit(Some(&picked)).unwrap() {
            Command::AddAddress(x) => {
                assert_eq!(x.flat_number, "4B");
                assert_eq!(x.kind, AddressType::Office);
                assert_eq!(x.coordinates, Some(picked.coordinates));
                assert!(!x.is_default);
            }
            x => panic!("unexpected {x:?}"),
        }
    }

    #[test]
    fn submit_rejects_incomplete() {
        let mut form = AddressForm::new();
        form.apply_location(&location(None));
        assert_eq!(
            form.submit(None),
            Err(ValidationViolation::MissingField("pincode"))
        );
    }

    #[test]
    fn submit_edit() {
        let existing = Address::new(
            AddressId::from("7"),
            AddressDraft {
                address_line1: "Old Road".into(),
                pincode: "110001".into(),
                city: "New Delhi".into(),
                state: "Delhi".into(),
                coordinates: Some(Coordinates::new(28.61, 77.20)),
                is_default: true,
                ..Default::default()
            },
        );
        let mut store = AddressStore::from_snapshot(Snapshot {
            addresses: vec![existing],
        });

        let mut form = AddressForm::edit(&store, &AddressId::from("7"));
        assert_eq!(form.editing(), Some(&AddressId::from("7")));
        assert!(form.draft.is_default);
        form.draft.address_line1 = "New Road".into();

        let command = form.submit(None).unwrap();
        store.apply(command);
        let x = store.get(&AddressId::from("7")).unwrap();
        assert_eq!(x.address_line1, "New Road");
        // no new pick: stored coordinates survive
        assert_eq!(x.coordinates, Some(Coordinates::new(28.61, 77.20)));
        assert!(x.is_default);

        let form = AddressForm::edit(&store, &AddressId::from("missing"));
        assert_eq!(form.editing(), None);
        assert_eq!(form.draft, AddressDraft::default());
    }
}
