use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{AddressId, Coordinates, Pincode, ValidationViolation};

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum AddressType {
    #[default]
    Home,
    Office,
    Other,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Office => write!(f, "Office"),
            Self::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub flat_number: String,
    pub building_name: String,
    pub address_line1: String,
    pub pincode: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: AddressType,
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// An address that has not been given an id yet. This is also what the
/// address form edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub flat_number: String,
    pub building_name: String,
    pub address_line1: String,
    pub pincode: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: AddressType,
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Fields to overwrite on an existing address. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    pub flat_number: Option<String>,
    pub building_name: Option<String>,
    pub address_line1: Option<String>,
    pub pincode: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AddressType>,
    pub is_default: Option<bool>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityState {
    pub city: String,
    pub state: String,
}

impl Address {
    pub fn new(id: AddressId, draft: AddressDraft) -> Self {
        Self {
            id,
            flat_number: draft.flat_number,
            building_name: draft.building_name,
            address_line1: draft.address_line1,
            pincode: draft.pincode,
            city: draft.city,
            state: draft.state,
            kind: draft.kind,
            is_default: draft.is_default,
            coordinates: draft.coordinates,
        }
    }

    /// Shallow merge. The id is never touched.
    pub fn apply(&mut self, patch: AddressPatch) {
        if let Some(x) = patch.flat_number {
            self.flat_number = x;
        }
        if let Some(x) = patch.building_name {
            self.building_name = x;
        }
        if let Some(x) = patch.address_line1 {
            self.address_line1 = x;
        }
        if let Some(x) = patch.pincode {
            self.pincode = x;
        }
        if let Some(x) = patch.city {
            self.city = x;
        }
        if let Some(x) = patch.state {
            self.state = x;
        }
        if let Some(x) = patch.kind {
            self.kind = x;
        }
        if let Some(x) = patch.is_default {
            self.is_default = x;
        }
        if let Some(x) = patch.coordinates {
            self.coordinates = Some(x);
        }
    }

    pub fn draft(&self) -> AddressDraft {
        AddressDraft {
            flat_number: self.flat_number.clone(),
            building_name: self.building_name.clone(),
            address_line1: self.address_line1.clone(),
            pincode: self.pincode.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            kind: self.kind,
            is_default: self.is_default,
            coordinates: self.coordinates,
        }
    }
}

impl AddressDraft {
    pub fn normalized(mut self) -> Self {
        for x in [
            &mut self.flat_number,
            &mut self.building_name,
            &mut self.pincode,
            &mut self.city,
            &mut self.state,
        ] {
            *x = x.trim().to_string();
        }
        self.address_line1 = self
            .address_line1
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        self
    }

    pub fn validate(&self) -> Result<(), ValidationViolation> {
        for (name, value) in [
            ("addressLine1", &self.address_line1),
            ("pincode", &self.pincode),
            ("city", &self.city),
            ("state", &self.state),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationViolation::MissingField(name));
            }
        }
        self.pincode.parse::<Pincode>()?;
        if let Some(x) = &self.coordinates {
            x.validate()?;
        }
        Ok(())
    }

    /// Every field set, for overwriting a stored address wholesale.
    pub fn into_patch(self) -> AddressPatch {
        AddressPatch {
            flat_number: Some(self.flat_number),
            building_name: Some(self.building_name),
            address_line1: Some(self.address_line1),
            pincode: Some(self.pincode),
            city: Some(self.city),
            state: Some(self.state),
            kind: Some(self.kind),
            is_default: Some(self.is_default),
            coordinates: self.coordinates,
        }
    }
}
