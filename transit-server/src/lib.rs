//! Multi-modal transit trip server.
//!
//! Searches door-to-door transit routes, scores their reliability, and
//! tracks live trips: "which of these routes should I take, and am I still
//! on the best one?"

pub mod advisor;
pub mod domain;
pub mod explain;
pub mod planner;
pub mod search;
pub mod trip;
pub mod web;
