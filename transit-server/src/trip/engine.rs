//! Live trip state machine.
//!
//! The engine is a pure, tick-driven state machine: timers live in the
//! runner, which calls into the engine, so tests can simulate any schedule
//! without a clock. Every mutation path checks the phase first; once the
//! trip is ended, nothing changes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::advisor::{Advisory, AdvisorError};
use crate::domain::{Coordinate, RouteOption, SessionId};

use super::state::{LiveTripState, TripPhase};

/// Progress added to the current leg per progress tick.
pub const PROGRESS_STEP: u8 = 5;

/// Result of one progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick ignored: the trip is not tracking.
    Ignored,
    /// Progress advanced within the current leg.
    Advanced,
    /// The current leg finished; tracking moved to the next leg.
    LegCompleted,
    /// The final leg finished; the trip is complete.
    TripCompleted,
}

/// State machine for one live trip.
///
/// # Invariants
///
/// - `0 <= progress_percent <= 100`
/// - `leg_index < route.legs().len()` (the route is non-empty by
///   construction)
/// - at most one advisory request is in flight at a time
/// - after [`end`](Self::end), no state field changes
#[derive(Debug)]
pub struct TripEngine {
    route: Arc<RouteOption>,
    state: LiveTripState,
    advisory_in_flight: bool,
}

impl TripEngine {
    /// Create an engine in the `Idle` phase.
    pub fn new(route: Arc<RouteOption>, session_id: SessionId) -> Self {
        Self {
            route,
            state: LiveTripState::new(session_id),
            advisory_in_flight: false,
        }
    }

    /// Begin tracking: `Idle -> Tracking(0, 0)`.
    ///
    /// Returns `false` (and changes nothing) from any other phase.
    pub fn start(&mut self) -> bool {
        if self.state.phase != TripPhase::Idle {
            return false;
        }
        self.state.phase = TripPhase::Tracking;
        self.state.leg_index = 0;
        self.state.progress_percent = 0;
        true
    }

    /// Advance progress by [`PROGRESS_STEP`].
    ///
    /// When the step reaches or passes 100: on the final leg the trip
    /// completes with progress pinned at 100; otherwise tracking moves to
    /// the next leg with progress reset to 0.
    pub fn progress_tick(&mut self) -> TickOutcome {
        if self.state.phase != TripPhase::Tracking {
            return TickOutcome::Ignored;
        }

        let next = self.state.progress_percent.saturating_add(PROGRESS_STEP);
        if next < 100 {
            self.state.progress_percent = next;
            return TickOutcome::Advanced;
        }

        if self.state.leg_index + 1 >= self.route.legs().len() {
            self.state.progress_percent = 100;
            self.state.phase = TripPhase::Completed;
            TickOutcome::TripCompleted
        } else {
            self.state.leg_index += 1;
            self.state.progress_percent = 0;
            TickOutcome::LegCompleted
        }
    }

    /// Record a coordinate fix. Last write wins; a fix clears any previous
    /// positioning error. Never changes leg index or progress.
    pub fn record_fix(&mut self, coord: Coordinate) {
        if self.state.phase == TripPhase::Ended {
            return;
        }
        self.state.last_fix = Some(coord);
        self.state.position_error = None;
    }

    /// Record a positioning failure. Visible, non-fatal: leg progression
    /// continues and advisory calls are skipped until a fix resumes.
    pub fn record_position_error(&mut self, message: String) {
        if self.state.phase == TripPhase::Ended {
            return;
        }
        self.state.position_error = Some(message);
    }

    /// Claim the next advisory request, if one should be issued.
    ///
    /// Returns `None` when the trip is not tracking, when no fix has ever
    /// been recorded, or when a previous request is still in flight (the
    /// tick is skipped entirely, not queued). On `Some`, the in-flight slot
    /// is taken and must be released by [`apply_advisory`](Self::apply_advisory).
    pub fn begin_advisory(&mut self) -> Option<(SessionId, Coordinate)> {
        if self.state.phase != TripPhase::Tracking {
            return None;
        }
        if self.advisory_in_flight {
            debug!(session = %self.state.session_id, "advisory tick skipped: request in flight");
            return None;
        }
        let fix = self.state.last_fix?;

        self.advisory_in_flight = true;
        Some((self.state.session_id.clone(), fix))
    }

    /// Apply the outcome of an advisory request, releasing the in-flight
    /// slot. Success replaces advice and alternatives; failure leaves them
    /// untouched and bumps the failure counter.
    pub fn apply_advisory(&mut self, result: Result<Advisory, AdvisorError>) {
        self.advisory_in_flight = false;

        if self.state.phase == TripPhase::Ended {
            return;
        }

        match result {
            Ok(advisory) => {
                self.state.advice = advisory.advice;
                self.state.alternatives = advisory.alternatives;
            }
            Err(e) => {
                warn!(session = %self.state.session_id, error = %e, "advisory call failed");
                self.state.advisory_failures += 1;
            }
        }
    }

    /// End the trip: any phase -> `Ended`. Idempotent; every later
    /// operation is a no-op.
    pub fn end(&mut self) {
        self.state.phase = TripPhase::Ended;
    }

    /// Current state.
    pub fn state(&self) -> &LiveTripState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> TripPhase {
        self.state.phase
    }

    /// The route this trip tracks.
    pub fn route(&self) -> &Arc<RouteOption> {
        &self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, LegMode};
    use chrono::TimeZone;

    fn coord() -> Coordinate {
        Coordinate {
            lat: 32.08,
            lon: 34.78,
        }
    }

    fn route_with_legs(count: usize) -> Arc<RouteOption> {
        let base = chrono::Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        let legs = (0..count)
            .map(|i| Leg {
                mode: LegMode::Bus,
                route_id: None,
                trip_id: None,
                from_stop_id: None,
                to_stop_id: None,
                depart_time: base + chrono::Duration::minutes(10 * i as i64),
                arrive_time: base + chrono::Duration::minutes(10 * i as i64 + 8),
                predicted_delay_secs: 0,
                description: None,
            })
            .collect();

        Arc::new(
            RouteOption::new("r1".into(), "test".into(), 1800, 0, 0, 0.1, legs).unwrap(),
        )
    }

    fn tracking_engine(leg_count: usize) -> TripEngine {
        let mut engine =
            TripEngine::new(route_with_legs(leg_count), SessionId::new("s1").unwrap());
        assert!(engine.start());
        engine
    }

    fn advisory(text: &str) -> Advisory {
        Advisory {
            advice: text.into(),
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn start_only_from_idle() {
        let mut engine = TripEngine::new(route_with_legs(1), SessionId::new("s1").unwrap());
        assert_eq!(engine.phase(), TripPhase::Idle);
        assert!(engine.start());
        assert_eq!(engine.phase(), TripPhase::Tracking);
        assert!(!engine.start());

        engine.end();
        assert!(!engine.start());
        assert_eq!(engine.phase(), TripPhase::Ended);
    }

    #[test]
    fn twenty_ticks_advance_leg_exactly_once() {
        let mut engine = tracking_engine(3);

        let mut leg_advances = 0;
        for _ in 0..20 {
            if engine.progress_tick() == TickOutcome::LegCompleted {
                leg_advances += 1;
            }
        }

        assert_eq!(leg_advances, 1);
        assert_eq!(engine.state().leg_index, 1);
        assert_eq!(engine.state().progress_percent, 0);
        assert_eq!(engine.phase(), TripPhase::Tracking);
    }

    #[test]
    fn three_legs_complete_after_sixty_ticks() {
        let mut engine = tracking_engine(3);

        for tick in 1..=59 {
            let outcome = engine.progress_tick();
            assert_ne!(outcome, TickOutcome::TripCompleted, "completed at tick {tick}");
        }

        assert_eq!(engine.progress_tick(), TickOutcome::TripCompleted);
        assert_eq!(engine.phase(), TripPhase::Completed);
        assert_eq!(engine.state().leg_index, 2);
        assert_eq!(engine.state().progress_percent, 100);

        // Further ticks are ignored and change nothing.
        assert_eq!(engine.progress_tick(), TickOutcome::Ignored);
        assert_eq!(engine.state().progress_percent, 100);
    }

    #[test]
    fn progress_stays_in_bounds() {
        let mut engine = tracking_engine(2);
        for _ in 0..100 {
            engine.progress_tick();
            assert!(engine.state().progress_percent <= 100);
            assert!(engine.state().leg_index < 2);
        }
    }

    #[test]
    fn fix_is_last_write_wins() {
        let mut engine = tracking_engine(1);

        engine.record_fix(Coordinate { lat: 1.0, lon: 1.0 });
        engine.record_fix(Coordinate { lat: 2.0, lon: 2.0 });

        assert_eq!(engine.state().last_fix, Some(Coordinate { lat: 2.0, lon: 2.0 }));
    }

    #[test]
    fn fix_never_moves_progress() {
        let mut engine = tracking_engine(2);
        engine.progress_tick();
        let before = engine.state().clone();

        engine.record_fix(coord());

        assert_eq!(engine.state().leg_index, before.leg_index);
        assert_eq!(engine.state().progress_percent, before.progress_percent);
    }

    #[test]
    fn fix_clears_position_error() {
        let mut engine = tracking_engine(1);

        engine.record_position_error("denied".into());
        assert_eq!(engine.state().position_error.as_deref(), Some("denied"));

        engine.record_fix(coord());
        assert!(engine.state().position_error.is_none());
    }

    #[test]
    fn advisory_requires_a_fix() {
        let mut engine = tracking_engine(1);
        assert!(engine.begin_advisory().is_none());

        engine.record_fix(coord());
        let (session, fix) = engine.begin_advisory().unwrap();
        assert_eq!(session.as_str(), "s1");
        assert_eq!(fix, coord());
    }

    #[test]
    fn advisory_at_most_one_in_flight() {
        let mut engine = tracking_engine(1);
        engine.record_fix(coord());

        assert!(engine.begin_advisory().is_some());
        // Second tick while in flight is skipped, not queued.
        assert!(engine.begin_advisory().is_none());

        engine.apply_advisory(Ok(advisory("keep going")));
        assert!(engine.begin_advisory().is_some());
    }

    #[test]
    fn advisory_success_replaces_advice_and_alternatives() {
        let mut engine = tracking_engine(1);
        engine.record_fix(coord());
        engine.begin_advisory().unwrap();

        engine.apply_advisory(Ok(advisory("switch buses")));

        assert_eq!(engine.state().advice, "switch buses");
        assert_eq!(engine.state().advisory_failures, 0);
    }

    #[test]
    fn advisory_failure_keeps_previous_advice() {
        let mut engine = tracking_engine(1);
        engine.record_fix(coord());
        engine.begin_advisory().unwrap();
        engine.apply_advisory(Ok(advisory("first advice")));

        engine.begin_advisory().unwrap();
        engine.apply_advisory(Err(AdvisorError::Api {
            status: 503,
            message: "unavailable".into(),
        }));

        assert_eq!(engine.state().advice, "first advice");
        assert_eq!(engine.state().advisory_failures, 1);
        assert_eq!(engine.phase(), TripPhase::Tracking);
    }

    #[test]
    fn no_advisory_once_completed() {
        let mut engine = tracking_engine(1);
        engine.record_fix(coord());
        for _ in 0..20 {
            engine.progress_tick();
        }
        assert_eq!(engine.phase(), TripPhase::Completed);
        assert!(engine.begin_advisory().is_none());
    }

    #[test]
    fn end_freezes_everything() {
        let mut engine = tracking_engine(3);
        engine.record_fix(coord());
        engine.progress_tick();
        engine.end();

        let frozen = engine.state().clone();

        // Previously scheduled timers firing after end change nothing.
        assert_eq!(engine.progress_tick(), TickOutcome::Ignored);
        engine.record_fix(Coordinate { lat: 9.0, lon: 9.0 });
        engine.record_position_error("late error".into());
        assert!(engine.begin_advisory().is_none());
        engine.apply_advisory(Ok(advisory("too late")));
        engine.apply_advisory(Err(AdvisorError::MissingSession));
        engine.end();

        assert_eq!(engine.state(), &frozen);
        assert_eq!(engine.phase(), TripPhase::Ended);
    }

    #[test]
    fn in_flight_response_after_end_is_dropped() {
        let mut engine = tracking_engine(1);
        engine.record_fix(coord());
        engine.begin_advisory().unwrap();

        engine.end();
        engine.apply_advisory(Ok(advisory("stale response")));

        assert_eq!(engine.state().advice, super::super::state::DEFAULT_ADVICE);
    }
}
