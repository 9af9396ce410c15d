//! Alternate drop-off discovery server.
//!
//! Answers: "where near my destination could the ride end so that it costs
//! less, at the price of a short walk?"

pub mod cache;
pub mod directions;
pub mod discovery;
pub mod domain;
pub mod fare;
pub mod settings;
pub mod web;
