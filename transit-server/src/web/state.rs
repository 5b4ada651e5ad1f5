//! Application state for the web layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::advisor::Advisor;
use crate::domain::SessionId;
use crate::search::SearchService;
use crate::trip::{TripConfig, TripHandle};

/// Live trips by session id.
pub struct TripRegistry {
    trips: Mutex<HashMap<SessionId, TripHandle>>,
}

impl TripRegistry {
    pub fn new() -> Self {
        Self {
            trips: Mutex::new(HashMap::new()),
        }
    }

    /// Register a trip under its session. An existing trip with the same
    /// session is ended and replaced.
    pub fn insert(&self, session: SessionId, handle: TripHandle) {
        if let Some(previous) = self.lock().insert(session, handle) {
            previous.end();
        }
    }

    /// Run `f` on the trip for `session`, if registered.
    pub fn with<T>(&self, session: &SessionId, f: impl FnOnce(&TripHandle) -> T) -> Option<T> {
        self.lock().get(session).map(f)
    }

    /// End and deregister the trip for `session`. No-op when unknown.
    pub fn end(&self, session: &SessionId) {
        if let Some(handle) = self.lock().remove(session) {
            handle.end();
        }
    }

    /// Number of registered trips.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, TripHandle>> {
        self.trips.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TripRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Route search (planner + cache + explanations).
    pub search: Arc<SearchService>,

    /// Remote trip advisor.
    pub advisor: Arc<dyn Advisor>,

    /// Live trips by session.
    pub trips: Arc<TripRegistry>,

    /// Timer configuration for new trips.
    pub trip_config: TripConfig,
}

impl AppState {
    /// Create a new app state.
    pub fn new(search: SearchService, advisor: Arc<dyn Advisor>, trip_config: TripConfig) -> Self {
        Self {
            search: Arc::new(search),
            advisor,
            trips: Arc::new(TripRegistry::new()),
            trip_config,
        }
    }
}
