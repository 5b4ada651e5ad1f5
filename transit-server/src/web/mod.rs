//! Web layer for the transit trip server.
//!
//! Provides HTTP endpoints for searching routes and driving live trips.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, TripRegistry};
