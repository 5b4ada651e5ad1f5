//! Live trip tracking.
//!
//! A live trip walks a chosen route leg by leg. [`TripEngine`] is the pure
//! state machine (what a tick, fix, or advisory does to the state);
//! [`TripHandle`] wraps it in the async driver that supplies the timers,
//! the advisory calls, and the positioning subscription.

mod engine;
mod position;
mod runner;
mod state;

pub use engine::{PROGRESS_STEP, TickOutcome, TripEngine};
pub use position::{PositionFeed, PositionUpdate};
pub use runner::{TripConfig, TripHandle};
pub use state::{DEFAULT_ADVICE, LiveTripState, TripPhase};
