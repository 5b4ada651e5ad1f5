//! Live trip state.

use serde::Serialize;

use crate::domain::{Coordinate, RouteOption, SessionId};

/// Advice shown before the advisor has said anything.
pub const DEFAULT_ADVICE: &str = "You are on the best route.";

/// Phase of a live trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    /// Created but not yet started.
    Idle,
    /// Progressing through the route's legs.
    Tracking,
    /// Final leg finished; progress pinned at 100.
    Completed,
    /// Torn down. No field changes after this.
    Ended,
}

/// Mutable state of one live trip.
///
/// Owned exclusively by the trip engine; everything else sees clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveTripState {
    /// Advisor session this trip reports under.
    pub session_id: SessionId,

    /// Current phase.
    pub phase: TripPhase,

    /// Index of the current leg. Always < the route's leg count.
    pub leg_index: usize,

    /// Progress through the current leg, 0–100.
    pub progress_percent: u8,

    /// Most recent coordinate fix. Earlier fixes are discarded.
    pub last_fix: Option<Coordinate>,

    /// Current advice text.
    pub advice: String,

    /// Alternative routes last suggested by the advisor.
    pub alternatives: Vec<RouteOption>,

    /// Latest positioning failure, if any. Visible but never fatal.
    pub position_error: Option<String>,

    /// Number of advisory calls that have failed so far.
    pub advisory_failures: u32,
}

impl LiveTripState {
    /// Fresh state for a new session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            phase: TripPhase::Idle,
            leg_index: 0,
            progress_percent: 0,
            last_fix: None,
            advice: DEFAULT_ADVICE.to_string(),
            alternatives: Vec::new(),
            position_error: None,
            advisory_failures: 0,
        }
    }
}
