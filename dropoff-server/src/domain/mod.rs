//! Domain types for drop-off discovery.
//!
//! This module contains the geographic value types and route model shared
//! by every other layer. Types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod error;
pub mod geometry;
mod point;
mod route;

pub use error::DomainError;
pub use geometry::{bearing, distance, offset};
pub use point::{CoordKey, DEFAULT_KEY_DECIMALS, GeoPoint, InvalidPoint};
pub use route::{Route, RouteClass};
