//! Remote trip advisor collaborator.
//!
//! The advisor owns trip sessions: it mints session identifiers and, given
//! the latest known location, returns advice text plus zero or more
//! alternative routes. The live trip controller only talks to it through
//! the [`Advisor`] trait, so tests can script responses.

mod client;
mod error;
mod mock;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, RouteOption, SessionId};

pub use client::{AdvisorClient, AdvisorConfig};
pub use error::AdvisorError;
pub use mock::ScriptedAdvisor;

/// One advisory assessment of live trip progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    /// Advice text for the traveler.
    pub advice: String,

    /// Alternative routes worth switching to. Often empty.
    pub alternatives: Vec<RouteOption>,
}

/// Remote advisor interface.
///
/// Implementations are shared, read-only collaborators: they influence trip
/// state only through the responses they return.
pub trait Advisor: Send + Sync {
    /// Establish an advisory session for a selected route.
    ///
    /// A response without a usable session identifier is a fatal start
    /// failure; implementations must return [`AdvisorError::MissingSession`]
    /// rather than an empty identifier.
    fn start_session<'a>(
        &'a self,
        route_id: &'a str,
        user_context: Option<&'a str>,
    ) -> BoxFuture<'a, Result<SessionId, AdvisorError>>;

    /// Request advice for the session given the latest known location.
    fn advise<'a>(
        &'a self,
        session: &'a SessionId,
        location: Coordinate,
    ) -> BoxFuture<'a, Result<Advisory, AdvisorError>>;
}
