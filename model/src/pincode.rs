use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::ValidationViolation;

/// Six digit postal index number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Pincode(String);

impl Pincode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pincode {
    type Err = ValidationViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|x| x.is_ascii_digit()) {
            return Err(ValidationViolation::InvalidPincode(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!(" 560001 ".parse::<Pincode>().unwrap().as_str(), "560001");
        assert!("56001".parse::<Pincode>().is_err());
        assert!("5600011".parse::<Pincode>().is_err());
        assert!("56OO01".parse::<Pincode>().is_err());
        // not a u32 check: leading zeros and signs matter
        assert!("+56001".parse::<Pincode>().is_err());
        assert!("000001".parse::<Pincode>().is_ok());
    }

    #[test]
    fn serde() {
        let x: Pincode = serde_json::from_str("\"110001\"").unwrap();
        assert_eq!(serde_json::to_string(&x).unwrap(), "\"110001\"");
        assert!(serde_json::from_str::<Pincode>("\"11\"").is_err());
    }
}
