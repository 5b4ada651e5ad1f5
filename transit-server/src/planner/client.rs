//! Trip-planner HTTP client.
//!
//! Queries the upstream OTP-style planner for itineraries. Uses a semaphore
//! to bound concurrent requests and avoid upstream rate limiting.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use super::SearchRequest;
use super::error::PlannerError;
use super::types::{PlanResponse, RawItinerary};

/// Default base URL for the planner.
const DEFAULT_BASE_URL: &str = "https://api.curlbus.app";

/// Default OTP router identifier.
const DEFAULT_ROUTER_ID: &str = "israel";

/// Default number of itineraries to request.
const DEFAULT_NUM_ITINERARIES: u8 = 5;

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the planner client.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Base URL of the planner.
    pub base_url: String,
    /// OTP router identifier.
    pub router_id: String,
    /// Number of itineraries to request per search.
    pub num_itineraries: u8,
    /// Maximum concurrent requests.
    pub max_concurrent: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl PlannerConfig {
    /// Create a config with the default public planner.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            router_id: DEFAULT_ROUTER_ID.to_string(),
            num_itineraries: DEFAULT_NUM_ITINERARIES,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing or self-hosted planners).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the router identifier.
    pub fn with_router_id(mut self, router: impl Into<String>) -> Self {
        self.router_id = router.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trip-planner API client.
#[derive(Debug, Clone)]
pub struct PlannerClient {
    http: reqwest::Client,
    base_url: String,
    router_id: String,
    num_itineraries: u8,
    semaphore: Arc<Semaphore>,
}

impl PlannerClient {
    /// Create a new planner client with the given configuration.
    pub fn new(config: PlannerConfig) -> Result<Self, PlannerError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            router_id: config.router_id,
            num_itineraries: config.num_itineraries,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Search the planner for itineraries.
    ///
    /// Returns the raw itineraries in planner order. A planner-reported
    /// in-body error is a search failure; it is propagated once, with no
    /// automatic retry.
    pub async fn plan(&self, request: &SearchRequest) -> Result<Vec<RawItinerary>, PlannerError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| PlannerError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/otp/routers/{}/plan", self.base_url, self.router_id);

        let mut query: Vec<(&str, String)> = vec![
            ("fromPlace", request.origin.to_string()),
            ("toPlace", request.destination.to_string()),
            ("mode", "TRANSIT,WALK".to_string()),
            ("numItineraries", self.num_itineraries.to_string()),
        ];

        if let Some(departure) = request.departure_time {
            query.push(("date", departure.format("%Y-%m-%d").to_string()));
            query.push(("time", departure.format("%H:%M:%S").to_string()));
        }

        if let Some(max_transfers) = request.max_transfers {
            query.push(("maxTransfers", max_transfers.to_string()));
        }

        debug!(%url, "planning trip");

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();

        match status.as_u16() {
            401 | 403 => return Err(PlannerError::Unauthorized),
            429 => return Err(PlannerError::RateLimited),
            s if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(PlannerError::ApiError { status: s, message });
            }
            _ => {}
        }

        let body = response.text().await?;
        let parsed: PlanResponse =
            serde_json::from_str(&body).map_err(|e| PlannerError::Json {
                message: e.to_string(),
                body: Some(truncate_body(&body)),
            })?;

        if let Some(message) = parsed.error.and_then(|e| e.message) {
            return Err(PlannerError::Upstream(message));
        }

        Ok(parsed.plan.map(|p| p.itineraries).unwrap_or_default())
    }
}

/// Truncate a response body for error messages.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}
