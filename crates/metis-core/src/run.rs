//! Run request and result types
//!
//! A run is one orchestration of a description over a set of agents. The
//! result is a mapping keyed by agent name; each entry is a tagged outcome
//! (parsed payload or typed failure) so downstream consumers handle a
//! closed set of cases instead of an untyped blob.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Request for one orchestrated run
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    /// High-level project description for the agents
    pub description: String,
    /// Agents to run; `None` selects every registered agent
    #[serde(default)]
    pub agents: Option<Vec<String>>,
    /// Per-request override of the configured export default
    #[serde(default)]
    pub export_enabled: Option<bool>,
    /// Optional dataset reference for data-aware agents
    #[serde(default)]
    pub dataset_id: Option<String>,
}

impl RunRequest {
    /// Create a request running every registered agent
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            agents: None,
            export_enabled: None,
            dataset_id: None,
        }
    }

    /// Restrict the run to the given agents
    #[must_use]
    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    /// Override the export toggle for this run
    #[must_use]
    pub fn with_export(mut self, enabled: bool) -> Self {
        self.export_enabled = Some(enabled);
        self
    }

    /// Reference a dataset
    #[must_use]
    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }
}

/// Why an agent's entry is a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transient provider failures exhausted the retry ceiling
    Transient,
    /// The agent's reply was not valid JSON
    Parse,
    /// Terminal provider error (e.g. missing credentials)
    Provider,
}

/// Typed per-agent failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFailure {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable message (already credential-sanitized upstream)
    pub message: String,
}

/// Outcome of one agent within a run
///
/// Serializes untagged: a success is the payload itself, a failure is
/// `{"error": {"kind": ..., "message": ...}}`. Either way the agent's key is
/// present in the result mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutcome {
    /// Typed failure entry
    Failure {
        /// Failure details
        error: AgentFailure,
    },
    /// Parsed JSON payload
    Success(serde_json::Value),
}

impl AgentOutcome {
    /// Build a success outcome
    #[must_use]
    pub fn success(payload: serde_json::Value) -> Self {
        Self::Success(payload)
    }

    /// Build a failure outcome
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            error: AgentFailure {
                kind,
                message: message.into(),
            },
        }
    }

    /// Whether this outcome carries a payload
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Joined result of one run, keyed by agent name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Per-agent outcomes
    pub results: BTreeMap<String, AgentOutcome>,
}

impl RunResult {
    /// The set of agent names present in the result
    #[must_use]
    pub fn key_set(&self) -> BTreeSet<&str> {
        self.results.keys().map(String::as_str).collect()
    }

    /// Serialize the result mapping alone (the persisted/exported shape)
    #[must_use]
    pub fn results_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.results).unwrap_or_else(|_| serde_json::json!({}))
    }
}
