//! Error types for metis-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A requested agent name is not in the registry
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// The project description was empty
    #[error("empty project description")]
    EmptyDescription,

    /// An explicit agent selection named no agents
    #[error("no agents selected")]
    EmptyAgentSet,

    /// A referenced dataset id does not exist
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    /// Dataset upload or parsing failed
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Identity token verification failed
    #[error("auth error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    /// Persistence backend error
    #[error("store error: {0}")]
    Store(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] metis_llm::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
