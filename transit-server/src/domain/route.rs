//! Route option type.
//!
//! A `RouteOption` is one candidate trip plan in a search result: a
//! non-empty, chronologically ordered sequence of legs plus the derived
//! metrics the normalizer computes for it. Options are read-only after
//! creation, except for the single late attachment of an AI-generated
//! explanation.

use serde::{Deserialize, Serialize};

use super::{DomainError, Leg};

/// A candidate trip plan produced by the itinerary normalizer.
///
/// # Invariants
///
/// - `legs` is non-empty (enforced at construction)
/// - `risk_score` is in `[0, 1]`
/// - `ai_reason` is write-once: the first [`attach_reason`](Self::attach_reason)
///   wins, later calls are ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOption {
    /// Identifier, unique within one search result.
    pub id: String,

    /// One-line summary, e.g. "Walk → Bus 74 → Train to North District".
    pub summary: String,

    /// Total trip duration in seconds.
    pub total_duration_secs: u32,

    /// Number of transfers.
    pub transfer_count: u32,

    /// Minimum buffer between consecutive legs, in seconds.
    pub min_transfer_slack_secs: u32,

    /// Unreliability estimate in [0, 1]. Higher is riskier.
    pub risk_score: f64,

    /// Ordered legs. Never empty.
    legs: Vec<Leg>,

    /// AI-generated explanation, attached asynchronously after creation.
    #[serde(default)]
    ai_reason: Option<String>,
}

impl RouteOption {
    /// Construct a route option, rejecting an empty leg list.
    ///
    /// A trip with no motion cannot be represented; the normalizer drops
    /// zero-leg itineraries before ever reaching this constructor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        summary: String,
        total_duration_secs: u32,
        transfer_count: u32,
        min_transfer_slack_secs: u32,
        risk_score: f64,
        legs: Vec<Leg>,
    ) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyRoute);
        }

        Ok(Self {
            id,
            summary,
            total_duration_secs,
            transfer_count,
            min_transfer_slack_secs,
            risk_score,
            legs,
            ai_reason: None,
        })
    }

    /// Returns the ordered legs. Guaranteed non-empty.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the attached explanation, if any.
    pub fn reason(&self) -> Option<&str> {
        self.ai_reason.as_deref()
    }

    /// Attach an explanation. Write-once: returns `false` (and changes
    /// nothing) if one is already present.
    pub fn attach_reason(&mut self, reason: String) -> bool {
        if self.ai_reason.is_some() {
            return false;
        }
        self.ai_reason = Some(reason);
        true
    }
}
