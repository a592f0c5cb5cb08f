//! Metis LLM - LLM Provider Abstraction
//!
//! This crate provides LLM integration for Metis:
//! - Provider: the single text-in/text-out trait every agent call goes through
//! - Moonshot: Kimi K2 family (the default provider)
//! - OpenAI: GPT family via async-openai
//! - Anthropic: Claude family
//! - Ollama: local models
//! - Retry: bounded-attempt retry over transient failures
//! - Factory: provider resolution from configuration + environment

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod factory;
pub mod mock;
pub mod provider;
pub mod providers;
pub mod retry;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use factory::{resolve_provider, LlmSettings};
pub use mock::MockProvider;
pub use provider::LlmProvider;
pub use retry::{complete_with_retry, RetryPolicy};

// Re-export provider types
pub use providers::anthropic::{AnthropicConfig, AnthropicProvider};
pub use providers::moonshot::{MoonshotConfig, MoonshotProvider};
pub use providers::ollama::{OllamaConfig, OllamaProvider};
pub use providers::openai::{OpenAiConfig, OpenAiProvider};
