//! Request/response DTOs for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, RouteOption, SessionId};

/// Response to a route search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Normalized route options, in planner order.
    pub options: Vec<RouteOption>,
}

/// Request to start tracking a route.
#[derive(Debug, Deserialize)]
pub struct StartTripRequest {
    /// Id of a route option from a recent search.
    pub selected_route_id: String,

    /// Free-text rider context forwarded to the advisor.
    #[serde(default)]
    pub user_context: Option<String>,
}

/// Response to a trip start.
#[derive(Debug, Serialize)]
pub struct StartTripResponse {
    /// Session the trip reports under.
    pub session_id: SessionId,
}

/// One positioning update from the rider's device.
///
/// Exactly one of the fields should be present: a coordinate fix, or a
/// description of why positioning failed.
#[derive(Debug, Deserialize)]
pub struct PositionReport {
    /// Coordinate fix.
    #[serde(default)]
    pub location: Option<Coordinate>,

    /// Positioning failure description.
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
