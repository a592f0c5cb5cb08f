//! LLM provider resolution
//!
//! Maps a configured provider id to a concrete provider, reading credential
//! material from the environment. This is the single place where "which
//! vendor are we talking to" is decided; everything downstream sees only
//! `Arc<dyn LlmProvider>`.

use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use crate::providers::anthropic::{AnthropicConfig, AnthropicProvider};
use crate::providers::moonshot::{MoonshotConfig, MoonshotProvider};
use crate::providers::ollama::{OllamaConfig, OllamaProvider};
use crate::providers::openai::{OpenAiConfig, OpenAiProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Settings for provider resolution
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Provider id: moonshot | openai | anthropic | ollama
    pub provider: String,
    /// Model override (empty uses the provider default)
    pub model: Option<String>,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "moonshot".to_string(),
            model: None,
            timeout_secs: 120,
        }
    }
}

/// Resolve a provider from settings and environment credentials
///
/// # Errors
/// Returns `Error::NotConfigured` when the provider id is unknown or the
/// selected provider's credentials are absent.
pub fn resolve_provider(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    let provider: Arc<dyn LlmProvider> = match settings.provider.as_str() {
        "moonshot" | "kimi" => {
            let mut config = MoonshotConfig::from_env()?.with_timeout(timeout);
            if let Some(model) = &settings.model {
                config = config.with_model(model);
            }
            Arc::new(MoonshotProvider::new(config)?)
        }
        "openai" => {
            let mut config = OpenAiConfig::from_env()?.with_timeout(timeout);
            if let Some(model) = &settings.model {
                config = config.with_model(model);
            }
            Arc::new(OpenAiProvider::new(config))
        }
        "anthropic" => {
            let mut config = AnthropicConfig::from_env()?.with_timeout(timeout);
            if let Some(model) = &settings.model {
                config = config.with_model(model);
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
        "ollama" => {
            let mut config = OllamaConfig::from_env().with_timeout(timeout);
            if let Some(model) = &settings.model {
                config = config.with_model(model);
            }
            Arc::new(OllamaProvider::new(config)?)
        }
        other => {
            return Err(Error::NotConfigured(format!(
                "unknown LLM provider '{other}' (expected moonshot, openai, anthropic or ollama)"
            )));
        }
    };

    info!(
        provider = provider.name(),
        model = provider.default_model(),
        "Resolved LLM provider"
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_not_configured() {
        let settings = LlmSettings {
            provider: "palm".to_string(),
            model: None,
            timeout_secs: 10,
        };
        let err = match resolve_provider(&settings) {
            Err(e) => e,
            Ok(_) => panic!("expected resolve_provider to fail for unknown provider"),
        };
        assert!(matches!(err, Error::NotConfigured(_)));
        assert!(err.to_string().contains("palm"));
    }

    #[test]
    fn test_default_settings_select_moonshot() {
        let settings = LlmSettings::default();
        assert_eq!(settings.provider, "moonshot");
    }
}
