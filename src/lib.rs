pub mod config;
pub mod error;
pub mod form;
pub mod map;
pub mod persist;
pub mod resolve;
pub mod services;
pub mod store;

pub use _model::*;
