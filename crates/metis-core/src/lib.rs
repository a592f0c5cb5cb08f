//! Metis Core - agents, orchestration and service boundaries
//!
//! This crate contains everything between the HTTP surface and the LLM
//! providers:
//! - `agents`: the immutable registry of planning agents (prompt builder +
//!   response parser per agent)
//! - `run`: run request/result types with per-agent tagged outcomes
//! - `orchestrator`: concurrent fan-out over the selected agents with
//!   bounded retries and per-agent error isolation
//! - `sink`: bounded background handoff for export and persistence side
//!   effects (they never fail a run)
//! - `auth`: verification of externally issued identity tokens
//! - `store`: append-only persistence of runs to a hosted Supabase table
//! - `datasets`: uploaded tabular dataset registry and summaries

#![forbid(unsafe_code)]

pub mod agents;
pub mod auth;
pub mod datasets;
pub mod error;
pub mod orchestrator;
pub mod run;
pub mod sink;
pub mod store;

pub use agents::{AgentRegistry, AgentSpec, PromptContext};
pub use auth::{AuthError, TokenVerifier, UserIdentity};
pub use datasets::{DatasetRecord, DatasetStore};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use run::{AgentFailure, AgentOutcome, FailureKind, RunRequest, RunResult};
pub use sink::{ExportRun, RunExporter, SinkHandle, SinkJob};
pub use store::{PersistedRun, SupabaseConfig, SupabaseStore};
