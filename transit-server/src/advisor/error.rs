//! Advisor API error types.

/// Errors that can occur when interacting with the remote advisor.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("advisor error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Session-start response carried no session identifier
    #[error("advisor response missing session identifier")]
    MissingSession,
}
