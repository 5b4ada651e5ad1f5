//! Mock planner client for testing without upstream access.
//!
//! Loads canned plan responses from JSON files and serves them as if they
//! were live planner responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::SearchRequest;
use super::error::PlannerError;
use super::types::{PlanResponse, RawItinerary};

/// Fixture name served for ordinary plan requests.
const DEFAULT_FIXTURE: &str = "default";

/// Mock planner client that serves plan responses from JSON files.
///
/// Useful for development and testing without a reachable planner.
/// Expects files named `{fixture}.json`; plain [`plan`](Self::plan) calls
/// serve the `default` fixture.
#[derive(Clone)]
pub struct MockPlannerClient {
    /// Pre-loaded plan responses, keyed by fixture name.
    plans: Arc<RwLock<HashMap<String, PlanResponse>>>,
}

impl MockPlannerClient {
    /// Create a new mock client by loading JSON files from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let data_dir = data_dir.as_ref();
        let mut plans = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            PlannerError::Fixture(format!("failed to read fixture directory: {e}"))
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| PlannerError::Fixture(format!("failed to read entry: {e}")))?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| PlannerError::Fixture(format!("invalid filename: {path:?}")))?
                .to_string();

            let json = std::fs::read_to_string(&path)
                .map_err(|e| PlannerError::Fixture(format!("failed to read {path:?}: {e}")))?;

            let response: PlanResponse = serde_json::from_str(&json)
                .map_err(|e| PlannerError::Fixture(format!("failed to parse {path:?}: {e}")))?;

            plans.insert(name, response);
        }

        if plans.is_empty() {
            return Err(PlannerError::Fixture(format!(
                "no plan fixtures found in {data_dir:?}"
            )));
        }

        Ok(Self {
            plans: Arc::new(RwLock::new(plans)),
        })
    }

    /// Search for itineraries.
    ///
    /// Mimics the real `PlannerClient::plan` interface. The request is
    /// ignored; the `default` fixture is served.
    pub async fn plan(&self, _request: &SearchRequest) -> Result<Vec<RawItinerary>, PlannerError> {
        self.fixture(DEFAULT_FIXTURE).await
    }

    /// Serve a named fixture.
    pub async fn fixture(&self, name: &str) -> Result<Vec<RawItinerary>, PlannerError> {
        let plans = self.plans.read().await;

        let response = plans.get(name).ok_or_else(|| {
            PlannerError::Fixture(format!(
                "no fixture named {name:?}. Available: {:?}",
                plans.keys().collect::<Vec<_>>()
            ))
        })?;

        if let Some(message) = response.error.as_ref().and_then(|e| e.message.clone()) {
            return Err(PlannerError::Upstream(message));
        }

        Ok(response
            .plan
            .as_ref()
            .map(|p| p.itineraries.clone())
            .unwrap_or_default())
    }

    /// List available fixture names.
    pub async fn available_fixtures(&self) -> Vec<String> {
        let plans = self.plans.read().await;
        plans.keys().cloned().collect()
    }

    /// Reload fixtures from disk (useful for development).
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), PlannerError> {
        let new_client = Self::new(data_dir)?;
        let mut plans = self.plans.write().await;
        let new_plans = new_client.plans.read().await;
        *plans = new_plans.clone();
        Ok(())
    }
}
