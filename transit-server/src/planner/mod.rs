//! Trip-planner collaborator: client, DTOs, normalization, scoring.
//!
//! The upstream planner returns loosely-typed OTP-style itineraries; this
//! module fetches them ([`PlannerClient`], [`MockPlannerClient`]) and
//! normalizes them into canonical [`crate::domain::RouteOption`]s
//! ([`normalize_itineraries`]), with reliability scoring ([`risk_score`]).

mod client;
mod error;
mod mock;
mod normalize;
mod risk;
pub mod types;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

pub use client::{PlannerClient, PlannerConfig};
pub use error::PlannerError;
pub use mock::MockPlannerClient;
pub use normalize::{classify_mode, normalize_itineraries};
pub use risk::{DELAY_CEILING_SECS, EMPTY_ITINERARY_SCORE, NO_REALTIME_PENALTY, risk_score};
pub use types::RawItinerary;

/// A route search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Trip origin.
    pub origin: Coordinate,

    /// Trip destination.
    pub destination: Coordinate,

    /// Desired departure instant. The planner's "now" applies when absent.
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,

    /// Maximum number of transfers to allow.
    #[serde(default)]
    pub max_transfers: Option<u32>,

    /// Free-text rider context, forwarded to the explanation collaborator.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Planner backend: real HTTP client or fixture-backed mock.
#[derive(Clone)]
pub enum PlannerBackend {
    /// Live upstream planner.
    Http(PlannerClient),
    /// Canned fixtures from disk.
    Mock(MockPlannerClient),
}

impl PlannerBackend {
    /// Search for itineraries with whichever backend is configured.
    pub async fn plan(&self, request: &SearchRequest) -> Result<Vec<RawItinerary>, PlannerError> {
        match self {
            PlannerBackend::Http(client) => client.plan(request).await,
            PlannerBackend::Mock(client) => client.plan(request).await,
        }
    }
}
