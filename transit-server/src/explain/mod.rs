//! Route explanation collaborator.
//!
//! Given a route option and the search request that produced it, asks a
//! chat-completions style endpoint for a short explanation of why the route
//! might suit the rider. This collaborator is strictly best-effort: when it
//! is not configured, or the request fails in any way, the route simply gets
//! no explanation. It never produces an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::RouteOption;
use crate::planner::SearchRequest;

/// Upper bound on generated explanation length.
const MAX_TOKENS: u32 = 120;

/// Sampling temperature for explanation generation.
const TEMPERATURE: f64 = 0.7;

/// Configuration for the route explainer.
#[derive(Debug, Clone)]
pub struct ExplainerConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ExplainerConfig {
    /// Create a config for the given endpoint, key, and model.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: 20,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatContent>,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: Option<String>,
}

/// Best-effort route explanation client.
#[derive(Debug, Clone)]
pub struct RouteExplainer {
    http: reqwest::Client,
    config: ExplainerConfig,
}

impl RouteExplainer {
    /// Create a new explainer. Returns `None` when the HTTP client cannot
    /// be built, consistent with the collaborator's best-effort contract.
    pub fn new(config: ExplainerConfig) -> Option<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .ok()?;

        Some(Self { http, config })
    }

    /// Ask for an explanation of the route. `None` on any failure.
    pub async fn explain(&self, route: &RouteOption, request: &SearchRequest) -> Option<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a concise transit planning assistant. Explain why a \
                              traveler might like a proposed public transit route. Keep the \
                              tone practical and friendly."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(route, request),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let result = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(route_id = %route.id, error = %e, "route explanation request failed");
                return None;
            }
        };

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(route_id = %route.id, error = %e, "route explanation response unreadable");
                return None;
            }
        };

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }
}

/// Build the user prompt describing the route.
fn build_prompt(route: &RouteOption, request: &SearchRequest) -> String {
    let legs_summary = route
        .legs()
        .iter()
        .map(|leg| {
            format!(
                "{} from {} to {}",
                leg.mode,
                leg.depart_time.format("%H:%M"),
                leg.arrive_time.format("%H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let notes_line = match request.notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => format!("Rider notes: {notes}"),
        _ => "No rider notes provided.".to_string(),
    };

    format!(
        "Route summary: {}\nTotal duration: {} minutes\nTransfers: {}\nLegs:\n{}\n{}\n\n\
         In 1-2 sentences, explain why this route could be a good choice.",
        route.summary,
        (route.total_duration_secs as f64 / 60.0).round() as i64,
        route.transfer_count,
        legs_summary,
        notes_line,
    )
}
