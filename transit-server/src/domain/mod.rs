//! Domain types for the transit trip planner.
//!
//! This module contains the core domain model: canonical legs and route
//! options produced by the itinerary normalizer, plus the small value types
//! shared across components. Invariants are enforced at construction time,
//! so code that receives these types can trust their validity.

mod error;
mod geo;
mod leg;
mod route;
mod session;

pub use error::DomainError;
pub use geo::Coordinate;
pub use leg::{Leg, LegMode};
pub use route::RouteOption;
pub use session::SessionId;
