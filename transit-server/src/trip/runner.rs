//! Async driver for a live trip.
//!
//! Owns the spawned task that runs a trip's two periodic activities (the
//! progress-advance timer and the advisory-poll timer) and the positioning
//! subscription. All engine mutation happens inside that single task or
//! through the synchronous [`TripHandle::end`], so callbacks never overlap.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::advisor::{Advisor, Advisory, AdvisorError};
use crate::domain::{RouteOption, SessionId};

use super::engine::{TickOutcome, TripEngine};
use super::position::{PositionFeed, PositionUpdate};
use super::state::LiveTripState;

/// Default progress-advance period.
const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Default advisory-poll period.
const DEFAULT_ADVISORY_INTERVAL: Duration = Duration::from_secs(10);

/// Timer configuration for a live trip.
#[derive(Debug, Clone)]
pub struct TripConfig {
    /// Period of the progress-advance timer.
    pub progress_interval: Duration,

    /// Period of the advisory-poll timer. Independent of progress.
    pub advisory_interval: Duration,
}

impl TripConfig {
    /// Set the progress-advance period.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the advisory-poll period.
    pub fn with_advisory_interval(mut self, interval: Duration) -> Self {
        self.advisory_interval = interval;
        self
    }
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            advisory_interval: DEFAULT_ADVISORY_INTERVAL,
        }
    }
}

/// Handle to a running live trip.
///
/// Dropping the handle aborts the trip task; prefer [`end`](Self::end) for
/// an orderly teardown that also freezes the state.
pub struct TripHandle {
    engine: Arc<Mutex<TripEngine>>,
    feed: PositionFeed,
    task: tokio::task::JoinHandle<()>,
}

impl TripHandle {
    /// Start tracking a route: spawns the trip task with both timers and
    /// the positioning subscription, `Idle -> Tracking(0, 0)`.
    pub fn start(
        route: Arc<RouteOption>,
        session_id: SessionId,
        advisor: Arc<dyn Advisor>,
        config: TripConfig,
    ) -> Self {
        let mut engine = TripEngine::new(route, session_id);
        engine.start();
        let engine = Arc::new(Mutex::new(engine));

        let (feed, position_rx) = PositionFeed::channel();

        let task = tokio::spawn(run_trip(engine.clone(), advisor, config, position_rx));

        Self { engine, feed, task }
    }

    /// Snapshot of the current trip state.
    pub fn snapshot(&self) -> LiveTripState {
        lock(&self.engine).state().clone()
    }

    /// The session this trip reports under.
    pub fn session_id(&self) -> SessionId {
        lock(&self.engine).state().session_id.clone()
    }

    /// Sender half of the positioning subscription.
    pub fn position_feed(&self) -> PositionFeed {
        self.feed.clone()
    }

    /// End the trip.
    ///
    /// Synchronous and idempotent: the engine is frozen (no field of the
    /// trip state can change afterwards) and the trip task is aborted,
    /// which tears down both timers and the positioning subscription
    /// together, before this returns.
    pub fn end(&self) {
        lock(&self.engine).end();
        self.task.abort();
    }

    /// True once the trip task has stopped (completed, ended, or aborted).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TripHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poison recovery: the engine holds no invariant that a panicking lock
/// holder could break mid-update, so continuing with the inner value is
/// safe.
fn lock(engine: &Mutex<TripEngine>) -> MutexGuard<'_, TripEngine> {
    engine.lock().unwrap_or_else(|e| e.into_inner())
}

async fn run_trip(
    engine: Arc<Mutex<TripEngine>>,
    advisor: Arc<dyn Advisor>,
    config: TripConfig,
    mut position_rx: tokio::sync::watch::Receiver<Option<PositionUpdate>>,
) {
    let mut progress = tokio::time::interval(config.progress_interval);
    let mut advisory = tokio::time::interval(config.advisory_interval);
    // First tick of an interval is immediate; skip it for both timers.
    progress.tick().await;
    advisory.tick().await;

    // In-flight advisory results come back through a single-slot channel.
    // The engine guarantees at most one request is ever outstanding.
    let (advisory_tx, mut advisory_rx) = mpsc::channel::<Result<Advisory, AdvisorError>>(1);
    let mut feed_open = true;

    loop {
        tokio::select! {
            _ = progress.tick() => {
                let outcome = lock(&engine).progress_tick();
                if outcome == TickOutcome::TripCompleted {
                    // Both periodic activities stop together.
                    break;
                }
            }

            _ = advisory.tick() => {
                if let Some((session, location)) = lock(&engine).begin_advisory() {
                    let advisor = advisor.clone();
                    let tx = advisory_tx.clone();
                    tokio::spawn(async move {
                        let result = advisor.advise(&session, location).await;
                        let _ = tx.send(result).await;
                    });
                } else {
                    debug!("advisory tick skipped");
                }
            }

            Some(result) = advisory_rx.recv() => {
                lock(&engine).apply_advisory(result);
            }

            changed = position_rx.changed(), if feed_open => {
                match changed {
                    Ok(()) => {
                        let update = position_rx.borrow_and_update().clone();
                        match update {
                            Some(PositionUpdate::Fix(coord)) => {
                                lock(&engine).record_fix(coord);
                            }
                            Some(PositionUpdate::Error(message)) => {
                                lock(&engine).record_position_error(message);
                            }
                            None => {}
                        }
                    }
                    Err(_) => feed_open = false,
                }
            }
        }
    }
}
