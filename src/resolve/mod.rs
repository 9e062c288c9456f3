//! Keeping slow lookups from clobbering fresher state.

mod debounce;
mod deadline;

pub use debounce::{Debouncer, Ticket};
pub use deadline::{geocode_within, locate_within, race};
