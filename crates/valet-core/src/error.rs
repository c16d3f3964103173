//! Error taxonomy for the AI routing layer
//!
//! Adapter failures are explicit sum types so the router can match on the
//! kind of failure instead of catching opaque errors. Only total exhaustion
//! of the fallback chain surfaces to callers, as [`RouterError::Exhausted`].

use thiserror::Error;

/// Failure of a single provider adapter call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials missing or invalid at initialization
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Upstream quota or billing exhausted
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// Network failure, timeout, non-success status, or malformed response
    #[error("provider request failed: {0}")]
    RequestFailed(String),
}

impl ProviderError {
    /// Whether this failure came from upstream quota/billing limits
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Failure of the router after every provider in the chain has been tried
#[derive(Debug, Error)]
pub enum RouterError {
    /// Every provider failed, including the terminal fallback. Carries one
    /// entry per attempted provider, in try order.
    #[error("all providers failed for {operation}: {}", describe_attempts(.attempts))]
    Exhausted {
        operation: &'static str,
        attempts: Vec<(String, ProviderError)>,
    },
}

fn describe_attempts(attempts: &[(String, ProviderError)]) -> String {
    attempts
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::RateLimited("quota exceeded".to_string());
        assert_eq!(err.to_string(), "provider rate limited: quota exceeded");
        assert!(err.is_rate_limited());
        assert!(!ProviderError::Unavailable("no key".to_string()).is_rate_limited());
    }

    #[test]
    fn test_exhausted_lists_every_attempt() {
        let err = RouterError::Exhausted {
            operation: "generate_response",
            attempts: vec![
                (
                    "gemini".to_string(),
                    ProviderError::RateLimited("quota".to_string()),
                ),
                (
                    "mock".to_string(),
                    ProviderError::RequestFailed("injected".to_string()),
                ),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("generate_response"));
        assert!(message.contains("gemini: provider rate limited: quota"));
        assert!(message.contains("mock: provider request failed: injected"));
    }
}
