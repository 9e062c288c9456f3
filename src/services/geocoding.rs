use _model::AddressDetails;
use serde::Deserialize;

use crate::error::ResolutionError;

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

/// One tagged piece of a geocoded address, shared with place search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// The first component carrying `kind` among its types.
pub fn find_component<'a>(components: &'a [AddressComponent], kind: &str) -> Option<&'a str> {
    components
        .iter()
        .find(|x| x.types.iter().any(|t| t == kind))
        .map(|x| x.long_name.as_str())
}

impl GeocodeResponse {
    pub fn into_details(self) -> Result<AddressDetails, ResolutionError> {
        match self.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => {}
            Some(x) => return Err(ResolutionError::Api(x.to_string())),
        }

        let result = self
            .results
            .and_then(|x| x.into_iter().next())
            .ok_or(ResolutionError::NoResults)?;
        let components = &result.address_components;
        let component = |kind| find_component(components, kind).map(|x| x.to_string());

        Ok(AddressDetails {
            postal_code: component("postal_code"),
            city: component("locality"),
            state: component("administrative_area_level_1"),
            formatted_address: result.formatted_address,
        })
    }
}
