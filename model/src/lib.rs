mod address;
mod error;
mod id;
mod location;
mod pincode;

pub use address::{Address, AddressDraft, AddressPatch, AddressType, CityState};
pub use error::ValidationViolation;
pub use id::AddressId;
pub use location::{
    AddressDetails, Coordinates, Location, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA,
};
pub use pincode::Pincode;
