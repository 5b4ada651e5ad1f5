//! Planner client error types.

use std::fmt;

/// Errors from the trip-planner HTTP client.
#[derive(Debug)]
pub enum PlannerError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Planner returned an error status code
    ApiError { status: u16, message: String },

    /// Planner returned an in-body error (e.g. no path found)
    Upstream(String),

    /// Rate limited by the planner
    RateLimited,

    /// Invalid credentials or unauthorized
    Unauthorized,

    /// Mock fixture missing or unreadable
    Fixture(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::Http(e) => write!(f, "HTTP error: {e}"),
            PlannerError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            PlannerError::ApiError { status, message } => {
                write!(f, "planner error {status}: {message}")
            }
            PlannerError::Upstream(message) => write!(f, "planner rejected search: {message}"),
            PlannerError::RateLimited => write!(f, "rate limited by planner"),
            PlannerError::Unauthorized => write!(f, "unauthorized (invalid planner credentials)"),
            PlannerError::Fixture(message) => write!(f, "mock fixture error: {message}"),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::Http(err)
    }
}
