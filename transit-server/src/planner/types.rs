//! Raw trip-planner response DTOs.
//!
//! These types map directly to the OTP-style JSON returned by the upstream
//! planner. They use `Option` liberally because the planner omits fields
//! rather than sending nulls in many cases. Instants are epoch milliseconds.

use serde::Deserialize;

/// Top-level response from the planner's `/plan` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// The computed plan, absent on error.
    pub plan: Option<Plan>,

    /// Planner-reported error, present even with a 200 status.
    pub error: Option<PlanError>,
}

/// The itineraries of a successful plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Candidate itineraries, best first.
    pub itineraries: Vec<RawItinerary>,
}

/// In-body planner error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanError {
    /// Machine-readable error id.
    pub id: Option<String>,

    /// Human-readable message.
    pub message: Option<String>,
}

/// One candidate itinerary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItinerary {
    /// Total duration in seconds.
    pub duration: Option<f64>,

    /// Ordered legs. May be empty for degenerate upstream data.
    #[serde(default)]
    pub legs: Vec<RawLeg>,

    /// Transfer count, when the planner provides one.
    pub transfers: Option<i64>,
}

/// One leg of a raw itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLeg {
    /// Planner mode label, e.g. "WALK", "BUS", "RAIL".
    pub mode: String,

    /// Route identifier.
    pub route_id: Option<String>,

    /// Trip identifier.
    pub trip_id: Option<String>,

    /// Structured trip reference (alternative carrier of the trip id).
    pub trip: Option<TripRef>,

    /// Generic route label.
    pub route: Option<String>,

    /// Short route name (e.g. a line number).
    pub route_short_name: Option<String>,

    /// Long route name.
    pub route_long_name: Option<String>,

    /// Vehicle headsign.
    pub headsign: Option<String>,

    /// Departure instant, epoch milliseconds.
    pub start_time: i64,

    /// Arrival instant, epoch milliseconds.
    pub end_time: i64,

    /// Whether this leg is live-tracked. `Some(false)` means explicitly not.
    pub real_time: Option<bool>,

    /// Leg distance in meters.
    pub distance: Option<f64>,

    /// Predicted departure delay in seconds.
    pub departure_delay: Option<i64>,

    /// Predicted arrival delay in seconds.
    pub arrival_delay: Option<i64>,

    /// Boarding place.
    pub from: Option<PlaceRef>,

    /// Alighting place.
    pub to: Option<PlaceRef>,
}

impl RawLeg {
    /// Predicted delay for scoring: departure delay, else arrival delay,
    /// else zero, floored at zero.
    pub fn effective_delay_secs(&self) -> u32 {
        self.departure_delay
            .or(self.arrival_delay)
            .unwrap_or(0)
            .max(0) as u32
    }
}

/// Structured trip reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRef {
    /// Trip identifier.
    pub id: Option<String>,
}

/// A boarding or alighting place on a leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRef {
    /// Display name of the place.
    pub name: Option<String>,

    /// Stop reference, in one of the planner's two shapes.
    pub stop_id: Option<RawStopRef>,
}

/// A stop reference as the planner sends it.
///
/// The planner is duck-typed here: sometimes a plain string (possibly the
/// composite `agency:identifier` form), sometimes a structured object. The
/// untagged deserialisation resolves the shape once at ingestion;
/// [`RawStopRef::stop_id`] is the only interpretation downstream code uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawStopRef {
    /// Plain identifier, possibly `agency:identifier`.
    Id(String),

    /// Structured reference.
    Object {
        id: Option<String>,
        #[serde(rename = "agencyId")]
        agency_id: Option<String>,
    },
}

impl RawStopRef {
    /// Extract the bare stop identifier.
    ///
    /// Composite strings yield the substring after the last `:`; structured
    /// references yield their `id` field. An empty identifier counts as
    /// absent.
    pub fn stop_id(&self) -> Option<&str> {
        let id = match self {
            RawStopRef::Id(raw) => match raw.rsplit_once(':') {
                Some((_, tail)) => tail,
                None => raw.as_str(),
            },
            RawStopRef::Object { id, .. } => id.as_deref()?,
        };

        if id.is_empty() { None } else { Some(id) }
    }
}
