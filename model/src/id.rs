use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque address identifier. Issued ids are decimal millisecond timestamps,
/// but anything read back from storage is accepted as-is.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(String);

impl AddressId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value of ids issued from a clock, if this is one.
    pub fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for AddressId {
    fn from(x: u64) -> Self {
        Self(x.to_string())
    }
}

impl From<&str> for AddressId {
    fn from(x: &str) -> Self {
        Self(x.to_string())
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
