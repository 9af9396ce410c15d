//! Web layer for drop-off discovery.
//!
//! Provides HTTP endpoints for discovery and place lookup.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
