//! Advisor HTTP client.

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, RouteOption, SessionId};

use super::error::AdvisorError;
use super::{Advisor, Advisory};

/// Request body for session start.
#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    selected_route_id: &'a str,
    user_context: Option<&'a str>,
}

/// Response body for session start.
#[derive(Debug, Deserialize)]
struct StartResponse {
    session_id: Option<String>,
}

/// Request body for a progress update.
#[derive(Debug, Serialize)]
struct ProgressRequest<'a> {
    session_id: &'a str,
    current_location: Coordinate,
    timestamp: String,
}

/// Response body for a progress update.
#[derive(Debug, Deserialize)]
struct ProgressResponse {
    advice: String,
    #[serde(default)]
    maybe_better_options: Vec<RouteOption>,
}

/// Configuration for the advisor client.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Base URL of the advisor service.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl AdvisorConfig {
    /// Create a config for the given advisor base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 15,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for the remote advisor.
#[derive(Debug, Clone)]
pub struct AdvisorClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdvisorClient {
    /// Create a new advisor client.
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AdvisorError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AdvisorError::Json {
            message: e.to_string(),
        })
    }
}

impl Advisor for AdvisorClient {
    fn start_session<'a>(
        &'a self,
        route_id: &'a str,
        user_context: Option<&'a str>,
    ) -> BoxFuture<'a, Result<SessionId, AdvisorError>> {
        async move {
            let response: StartResponse = self
                .post_json(
                    "/v1/trip/start",
                    &StartRequest {
                        selected_route_id: route_id,
                        user_context,
                    },
                )
                .await?;

            // An absent or empty session id means no session was established.
            response
                .session_id
                .and_then(|raw| SessionId::new(raw).ok())
                .ok_or(AdvisorError::MissingSession)
        }
        .boxed()
    }

    fn advise<'a>(
        &'a self,
        session: &'a SessionId,
        location: Coordinate,
    ) -> BoxFuture<'a, Result<Advisory, AdvisorError>> {
        async move {
            let response: ProgressResponse = self
                .post_json(
                    "/v1/trip/progress",
                    &ProgressRequest {
                        session_id: session.as_str(),
                        current_location: location,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
                .await?;

            Ok(Advisory {
                advice: response.advice,
                alternatives: response.maybe_better_options,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AdvisorConfig::new("http://localhost:8081");
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.timeout_secs, 15);

        let config = config.with_timeout(5);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn progress_response_tolerates_missing_options() {
        let response: ProgressResponse =
            serde_json::from_str(r#"{"advice": "all good"}"#).unwrap();
        assert_eq!(response.advice, "all good");
        assert!(response.maybe_better_options.is_empty());
    }

    #[test]
    fn start_response_tolerates_missing_id() {
        let response: StartResponse = serde_json::from_str("{}").unwrap();
        assert!(response.session_id.is_none());
    }
}
