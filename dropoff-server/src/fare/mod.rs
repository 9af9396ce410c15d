//! Deterministic fare model.
//!
//! An internal approximation of ride pricing used to compare drop-off
//! points against riding all the way. Not authoritative pricing.

mod geofence;
mod quote;
mod time_of_day;

pub use geofence::{BoundingBox, GeoFence, geofence_penalty};
pub use quote::{BandPolicy, FareQuote, Ratecard, estimate};
pub use time_of_day::{PeakWindow, TimeOfDayPolicy};
