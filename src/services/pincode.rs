use _model::CityState;
use serde::Deserialize;

/// One entry of the postal lookup's response array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PincodeResponse {
    status: String,
    #[serde(default)]
    post_office: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostOffice {
    district: String,
    state: String,
}

impl PincodeResponse {
    /// Only the first entry is consulted, and only when it reports success.
    pub fn city_state(response: Vec<PincodeResponse>) -> Option<CityState> {
        let first = response.into_iter().next()?;
        if first.status != "Success" {
            return None;
        }
        let office = first.post_office?.into_iter().next()?;
        Some(CityState {
            city: office.district,
            state: office.state,
        })
    }
}
