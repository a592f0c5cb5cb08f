//! Error types for metis-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// API error
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an empty completion
    #[error("empty response from provider")]
    EmptyResponse,
}

impl Error {
    /// Whether a retry can plausibly succeed.
    ///
    /// Everything except a missing configuration is treated as transient:
    /// network failures, timeouts, rate limits and malformed or empty
    /// provider responses. Agent-level JSON parse failures never reach this
    /// type; they are terminal in the orchestrator.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Error::NotConfigured(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_is_terminal() {
        assert!(!Error::NotConfigured("MOONSHOT_API_KEY not set".into()).is_transient());
    }

    #[test]
    fn test_transport_errors_are_transient() {
        assert!(Error::Network("connection reset".into()).is_transient());
        assert!(Error::Timeout(30_000).is_transient());
        assert!(Error::RateLimit.is_transient());
        assert!(Error::InvalidResponse("no choices".into()).is_transient());
        assert!(Error::EmptyResponse.is_transient());
    }
}
