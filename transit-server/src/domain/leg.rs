//! Canonical trip leg type.
//!
//! A `Leg` is one continuous segment of travel by a single mode, as produced
//! by the itinerary normalizer. Legs are immutable once produced; times come
//! straight from the planner and are not corrected here (an arrival before
//! the departure is an upstream data anomaly).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Travel mode of a leg.
///
/// The normalizer folds every planner mode label into one of these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegMode {
    Walk,
    Bus,
    Train,
}

impl std::fmt::Display for LegMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LegMode::Walk => "WALK",
            LegMode::Bus => "BUS",
            LegMode::Train => "TRAIN",
        };
        f.write_str(label)
    }
}

/// A single leg of a route option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Travel mode.
    pub mode: LegMode,

    /// Route identifier (e.g. a bus line number), if known.
    pub route_id: Option<String>,

    /// Trip identifier within the route, if known.
    pub trip_id: Option<String>,

    /// Boarding stop identifier, if known.
    pub from_stop_id: Option<String>,

    /// Alighting stop identifier, if known.
    pub to_stop_id: Option<String>,

    /// Scheduled departure instant.
    pub depart_time: DateTime<Utc>,

    /// Scheduled arrival instant. Expected to be >= `depart_time`.
    pub arrive_time: DateTime<Utc>,

    /// Predicted delay in seconds (never negative).
    pub predicted_delay_secs: u32,

    /// Human-readable description (e.g. "Bus 74 towards University").
    pub description: Option<String>,
}

impl Leg {
    /// Returns the scheduled duration of this leg.
    ///
    /// Negative when upstream data is anomalous; callers display, never fix.
    pub fn duration(&self) -> chrono::Duration {
        self.arrive_time.signed_duration_since(self.depart_time)
    }
}
