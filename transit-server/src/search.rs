//! Route search with caching.
//!
//! Wraps the planner backend, normalizes its itineraries, and caches the
//! normalized options. Coordinates are quantized to ~11 m and departure
//! times fall into 5-minute buckets, which bounds cache cardinality while
//! keeping results reasonably fresh.
//!
//! Searched options are also kept in a registry keyed by option id, so a
//! later trip-start can resolve the option the rider picked.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::{debug, info};

use crate::domain::RouteOption;
use crate::explain::RouteExplainer;
use crate::planner::{PlannerBackend, PlannerError, SearchRequest, normalize_itineraries};

/// Cache key for a search: (lat, lon, lat, lon quantized to 1e-4 degrees,
/// departure time bucket, max transfers).
type SearchKey = (i64, i64, i64, i64, i64, Option<u32>);

/// Cached search entry.
type SearchEntry = Arc<Vec<RouteOption>>;

/// Configuration for the search service.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// TTL for cached search results.
    pub ttl: Duration,

    /// Maximum number of cached searches.
    pub max_capacity: u64,

    /// Departure time bucket size in minutes.
    pub bucket_mins: i64,

    /// How long a searched option stays resolvable for trip-start.
    pub option_ttl: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
            bucket_mins: 5,
            option_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Route search service: planner + normalization + caching + explanations.
pub struct SearchService {
    planner: PlannerBackend,
    explainer: Option<RouteExplainer>,
    searches: MokaCache<SearchKey, SearchEntry>,
    options: MokaCache<String, Arc<RouteOption>>,
    bucket_mins: i64,
}

impl SearchService {
    /// Create a new service with the given configuration.
    pub fn new(
        planner: PlannerBackend,
        explainer: Option<RouteExplainer>,
        config: &SearchConfig,
    ) -> Self {
        let searches = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        let options = MokaCache::builder()
            .time_to_live(config.option_ttl)
            .max_capacity(config.max_capacity * 8)
            .build();

        Self {
            planner,
            explainer,
            searches,
            options,
            bucket_mins: config.bucket_mins,
        }
    }

    /// Search for route options.
    ///
    /// Results come from cache when a matching search is fresh enough;
    /// otherwise the planner is queried and its itineraries normalized.
    /// Either way every returned option is registered for later
    /// [`option`](Self::option) lookup, and explanations are attached when
    /// the explainer is configured.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<RouteOption>, PlannerError> {
        let key = self.search_key(request);

        let entry = match self.searches.get(&key).await {
            Some(cached) => {
                debug!(?key, "search cache hit");
                cached
            }
            None => {
                let itineraries = self.planner.plan(request).await?;
                let options = normalize_itineraries(&itineraries);
                info!(
                    itineraries = itineraries.len(),
                    options = options.len(),
                    "planner search completed"
                );

                let entry = Arc::new(options);
                self.searches.insert(key, entry.clone()).await;
                entry
            }
        };

        for option in entry.iter() {
            self.options
                .insert(option.id.clone(), Arc::new(option.clone()))
                .await;
        }

        let mut results: Vec<RouteOption> = entry.as_ref().clone();
        self.attach_explanations(&mut results, request).await;
        Ok(results)
    }

    /// Resolve a previously searched option by id. `None` once expired.
    pub async fn option(&self, id: &str) -> Option<Arc<RouteOption>> {
        self.options.get(id).await
    }

    /// Number of cached searches (for monitoring).
    pub fn search_entry_count(&self) -> u64 {
        self.searches.entry_count()
    }

    /// Ask the explainer about each option concurrently. Best-effort: an
    /// option that gets no answer keeps no explanation.
    async fn attach_explanations(&self, options: &mut [RouteOption], request: &SearchRequest) {
        let Some(explainer) = &self.explainer else {
            return;
        };

        let reasons = join_all(
            options
                .iter()
                .map(|option| explainer.explain(option, request)),
        )
        .await;

        for (option, reason) in options.iter_mut().zip(reasons) {
            if let Some(reason) = reason {
                option.attach_reason(reason);
            }
        }
    }

    fn search_key(&self, request: &SearchRequest) -> SearchKey {
        let departure = request.departure_time.unwrap_or_else(Utc::now);
        let bucket = departure.timestamp_millis() / (self.bucket_mins * 60_000);

        (
            quantize(request.origin.lat),
            quantize(request.origin.lon),
            quantize(request.destination.lat),
            quantize(request.destination.lon),
            bucket,
            request.max_transfers,
        )
    }
}

/// Quantize a coordinate to 1e-4 degrees (about 11 m).
fn quantize(degrees: f64) -> i64 {
    (degrees * 10_000.0).round() as i64
}
