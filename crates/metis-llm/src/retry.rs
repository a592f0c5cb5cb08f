//! Bounded-attempt retry over transient provider failures
//!
//! The attempt ceiling is an exact count: a call that keeps failing
//! transiently is issued `max_attempts` times and then gives up with the
//! last error. Terminal errors (missing configuration) are returned
//! immediately without consuming further attempts.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use std::time::Duration;
use tracing::warn;

/// Retry policy for LLM calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly per attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt ceiling
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
        }
    }

    /// Set the base delay between attempts
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }
}

/// Complete a request, retrying transient failures up to the policy ceiling.
///
/// A completion with only-whitespace content counts as a transient failure:
/// an empty body is indistinguishable from a truncated one and a fresh
/// attempt can succeed.
pub async fn complete_with_retry(
    provider: &dyn LlmProvider,
    request: &CompletionRequest,
    policy: &RetryPolicy,
) -> Result<CompletionResponse> {
    let mut last_error = Error::EmptyResponse;

    for attempt in 1..=policy.max_attempts {
        match provider.complete(request.clone()).await {
            Ok(response) if response.content.trim().is_empty() => {
                last_error = Error::EmptyResponse;
            }
            Ok(response) => return Ok(response),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => last_error = e,
        }

        if attempt < policy.max_attempts {
            warn!(
                provider = provider.name(),
                attempt,
                max_attempts = policy.max_attempts,
                error = %last_error,
                "LLM call failed, retrying"
            );
            tokio::time::sleep(policy.base_delay * attempt).await;
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that fails transiently a fixed number of times, counting calls.
    struct FlakyProvider {
        calls: AtomicU32,
        failures_before_success: u32,
    }

    impl FlakyProvider {
        fn new(failures_before_success: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures_before_success,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn available_models(&self) -> Vec<String> {
            vec!["flaky-model".to_string()]
        }

        fn default_model(&self) -> &str {
            "flaky-model"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(Error::Network("connection reset".to_string()))
            } else {
                Ok(CompletionResponse {
                    content: "{\"ok\":true}".to_string(),
                    usage: None,
                    model: "flaky-model".to_string(),
                })
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts).with_base_delay(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let provider = FlakyProvider::new(2);
        let request = CompletionRequest::new("plan");

        let response = complete_with_retry(&provider, &request, &fast_policy(3))
            .await
            .unwrap();

        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausts_exactly_max_attempts() {
        let provider = FlakyProvider::new(u32::MAX);
        let request = CompletionRequest::new("plan");

        let err = complete_with_retry(&provider, &request, &fast_policy(4))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_terminal_error_short_circuits() {
        struct Unconfigured;

        #[async_trait::async_trait]
        impl LlmProvider for Unconfigured {
            fn name(&self) -> &str {
                "unconfigured"
            }
            fn available_models(&self) -> Vec<String> {
                vec![]
            }
            fn default_model(&self) -> &str {
                ""
            }
            async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
                Err(Error::NotConfigured("MOONSHOT_API_KEY not set".to_string()))
            }
        }

        let err = complete_with_retry(&Unconfigured, &CompletionRequest::new("x"), &fast_policy(5))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_empty_content_is_retried() {
        struct EmptyThenFull {
            calls: AtomicU32,
        }

        #[async_trait::async_trait]
        impl LlmProvider for EmptyThenFull {
            fn name(&self) -> &str {
                "empty-then-full"
            }
            fn available_models(&self) -> Vec<String> {
                vec![]
            }
            fn default_model(&self) -> &str {
                "m"
            }
            async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
                let call = self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(CompletionResponse {
                    content: if call == 0 { "  \n".into() } else { "{}".into() },
                    usage: None,
                    model: "m".to_string(),
                })
            }
        }

        let provider = EmptyThenFull {
            calls: AtomicU32::new(0),
        };
        let response = complete_with_retry(&provider, &CompletionRequest::new("x"), &fast_policy(2))
            .await
            .unwrap();
        assert_eq!(response.content, "{}");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
