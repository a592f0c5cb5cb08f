//! Orchestrator - concurrent agent fan-out
//!
//! One run fans a project description out to the selected agents, issues
//! every LLM call concurrently, and joins the outcomes into a mapping keyed
//! by agent name. Agents never depend on each other's output, so there is
//! no sequencing between them and no shared mutable state: each agent
//! produces only its own entry, merged at join time.
//!
//! One agent's failure never aborts the run for its siblings: retry
//! exhaustion and parse failures become typed per-agent entries. Export and
//! persistence are handed to the sink after the full join and cannot alter
//! the returned result.

use crate::agents::{AgentRegistry, AgentSpec, PromptContext};
use crate::auth::UserIdentity;
use crate::datasets::DatasetStore;
use crate::error::{Error, Result};
use crate::run::{AgentOutcome, FailureKind, RunRequest, RunResult};
use crate::sink::{ExportRun, SinkHandle, SinkJob};
use metis_llm::{complete_with_retry, CompletionRequest, LlmProvider, RetryPolicy};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Retry policy for each agent's LLM call
    pub retry: RetryPolicy,
    /// Token budget per agent reply
    pub max_tokens: u32,
    /// Sampling temperature for agent replies
    pub temperature: f32,
    /// Export runs by default (per-request override wins)
    pub export_default: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_tokens: 2000,
            temperature: 0.7,
            export_default: false,
        }
    }
}

/// Runs agents concurrently and joins their results
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    provider: Arc<dyn LlmProvider>,
    config: OrchestratorConfig,
    datasets: Option<Arc<DatasetStore>>,
    sink: Option<SinkHandle>,
}

impl Orchestrator {
    /// Create an orchestrator over a registry and provider
    #[must_use]
    pub fn new(registry: Arc<AgentRegistry>, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            registry,
            provider,
            config: OrchestratorConfig::default(),
            datasets: None,
            sink: None,
        }
    }

    /// Replace the default configuration
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach the dataset store for dataset-aware runs
    #[must_use]
    pub fn with_datasets(mut self, datasets: Arc<DatasetStore>) -> Self {
        self.datasets = Some(datasets);
        self
    }

    /// Attach the export/persistence sink
    #[must_use]
    pub fn with_sink(mut self, sink: SinkHandle) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The registry this orchestrator runs over
    #[must_use]
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Name of the underlying LLM provider
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Execute one run
    ///
    /// # Errors
    /// Rejects empty descriptions, unknown agent names and unknown dataset
    /// references before any LLM call. Per-agent failures are not errors;
    /// they appear as typed entries in the result mapping.
    #[instrument(skip_all, fields(agents = ?request.agents))]
    pub async fn run(
        &self,
        request: &RunRequest,
        user: Option<UserIdentity>,
    ) -> Result<RunResult> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        let selected = self.select_agents(request)?;

        let mut ctx = PromptContext::new(description);
        if let Some(dataset_id) = &request.dataset_id {
            let datasets = self
                .datasets
                .as_ref()
                .ok_or_else(|| Error::UnknownDataset(dataset_id.clone()))?;
            ctx.dataset_summary = Some(datasets.summary_for(dataset_id).await?);
        }

        info!(
            agent_count = selected.len(),
            provider = self.provider.name(),
            "starting planning run"
        );

        let ctx_ref = &ctx;
        let outcomes = futures::future::join_all(
            selected
                .into_iter()
                .map(|spec| async move { (spec.name, self.run_agent(spec, ctx_ref).await) }),
        )
        .await;

        let mut results = BTreeMap::new();
        for (name, outcome) in outcomes {
            results.insert(name.to_string(), outcome);
        }
        let result = RunResult { results };

        let export = request
            .export_enabled
            .unwrap_or(self.config.export_default);
        if export || user.is_some() {
            match &self.sink {
                Some(sink) => sink.submit(SinkJob {
                    run: ExportRun {
                        description: description.to_string(),
                        results: result.results_json(),
                    },
                    export,
                    user,
                }),
                None => debug!("no sink configured, skipping export/persistence"),
            }
        }

        Ok(result)
    }

    /// Resolve and validate the agent selection, preserving request order
    fn select_agents(&self, request: &RunRequest) -> Result<Vec<&AgentSpec>> {
        let Some(names) = &request.agents else {
            return Ok(self.registry.iter().collect());
        };

        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(names.len());
        for name in names {
            let spec = self
                .registry
                .get(name)
                .ok_or_else(|| Error::UnknownAgent(name.clone()))?;
            if seen.insert(spec.name) {
                specs.push(spec);
            }
        }

        if specs.is_empty() {
            return Err(Error::EmptyAgentSet);
        }
        Ok(specs)
    }

    /// Run one agent to a terminal outcome
    async fn run_agent(&self, spec: &AgentSpec, ctx: &PromptContext) -> AgentOutcome {
        let prompt = (spec.prompt)(ctx);
        let request = CompletionRequest::new(prompt)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        debug!(agent = spec.name, "calling LLM");

        match complete_with_retry(self.provider.as_ref(), &request, &self.config.retry).await {
            Ok(response) => match (spec.parse)(&response.content) {
                Ok(payload) => {
                    debug!(agent = spec.name, "agent completed");
                    AgentOutcome::success(payload)
                }
                Err(e) => {
                    warn!(agent = spec.name, error = %e, "agent reply failed to parse");
                    AgentOutcome::failure(FailureKind::Parse, e.to_string())
                }
            },
            Err(e) if e.is_transient() => {
                warn!(agent = spec.name, error = %e, "agent failed after retries");
                AgentOutcome::failure(FailureKind::Transient, e.to_string())
            }
            Err(e) => {
                warn!(agent = spec.name, error = %e, "agent failed");
                AgentOutcome::failure(FailureKind::Provider, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::AgentOutcome;
    use crate::sink::{self, ExportError, RunExporter};
    use metis_llm::mock::text_response;
    use metis_llm::{Error as LlmError, MockProvider};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_config(max_attempts: u32) -> OrchestratorConfig {
        OrchestratorConfig {
            retry: RetryPolicy::new(max_attempts).with_base_delay(Duration::from_millis(0)),
            ..OrchestratorConfig::default()
        }
    }

    fn orchestrator_with(provider: MockProvider, max_attempts: u32) -> Orchestrator {
        Orchestrator::new(Arc::new(AgentRegistry::standard()), Arc::new(provider))
            .with_config(fast_config(max_attempts))
    }

    #[tokio::test]
    async fn test_result_key_set_equals_selection() {
        let provider = MockProvider::with_responder(|_| Ok(text_response("{}")));
        let orchestrator = orchestrator_with(provider, 1);

        let request = RunRequest::new("Global AI FinTech platform")
            .with_agents(["architect", "pm", "cost"]);
        let result = orchestrator.run(&request, None).await.unwrap();

        assert_eq!(
            result.key_set().into_iter().collect::<Vec<_>>(),
            vec!["architect", "cost", "pm"]
        );
    }

    #[tokio::test]
    async fn test_default_selection_runs_every_agent() {
        let provider = MockProvider::with_responder(|_| Ok(text_response("{}")));
        let orchestrator = orchestrator_with(provider, 1);

        let request = RunRequest::new("Global AI FinTech platform");
        let result = orchestrator.run(&request, None).await.unwrap();

        assert_eq!(
            result.results.len(),
            AgentRegistry::standard().len(),
            "every registered agent must have an entry"
        );
    }

    #[tokio::test]
    async fn test_unknown_agent_rejected_before_any_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_seen = calls.clone();
        let provider = MockProvider::with_responder(move |_| {
            calls_seen.fetch_add(1, Ordering::SeqCst);
            Ok(text_response("{}"))
        });
        let orchestrator = orchestrator_with(provider, 1);

        let request =
            RunRequest::new("platform").with_agents(["architect", "astrologer"]);
        let err = orchestrator.run(&request, None).await.unwrap_err();

        assert!(matches!(err, Error::UnknownAgent(name) if name == "astrologer"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_description_rejected() {
        let provider = MockProvider::with_responder(|_| Ok(text_response("{}")));
        let orchestrator = orchestrator_with(provider, 1);

        let err = orchestrator
            .run(&RunRequest::new("   "), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyDescription));
    }

    #[tokio::test]
    async fn test_empty_agent_selection_rejected() {
        let provider = MockProvider::with_responder(|_| Ok(text_response("{}")));
        let orchestrator = orchestrator_with(provider, 1);

        let request = RunRequest::new("platform").with_agents(Vec::<String>::new());
        let err = orchestrator.run(&request, None).await.unwrap_err();
        assert!(matches!(err, Error::EmptyAgentSet));
    }

    #[tokio::test]
    async fn test_transient_failure_consumes_ceiling_and_spares_siblings() {
        let architect_calls = Arc::new(AtomicU32::new(0));
        let counter = architect_calls.clone();
        let provider = MockProvider::with_responder(move |req| {
            if req.prompt.contains("cloud architect") {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::Network("connection reset".to_string()))
            } else {
                Ok(text_response(r#"{"duration_days": 112}"#))
            }
        });
        let orchestrator = orchestrator_with(provider, 3);

        let request = RunRequest::new("platform").with_agents(["architect", "pm"]);
        let result = orchestrator.run(&request, None).await.unwrap();

        // Exactly the retry ceiling, no more
        assert_eq!(architect_calls.load(Ordering::SeqCst), 3);

        match &result.results["architect"] {
            AgentOutcome::Failure { error } => {
                assert_eq!(error.kind, FailureKind::Transient);
            }
            AgentOutcome::Success(_) => panic!("architect should have failed"),
        }
        assert!(result.results["pm"].is_success());
    }

    #[tokio::test]
    async fn test_parse_error_consumes_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let provider = MockProvider::with_responder(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(text_response("this is definitely not JSON"))
        });
        let orchestrator = orchestrator_with(provider, 5);

        let request = RunRequest::new("platform").with_agents(["pm"]);
        let result = orchestrator.run(&request, None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match &result.results["pm"] {
            AgentOutcome::Failure { error } => assert_eq!(error.kind, FailureKind::Parse),
            AgentOutcome::Success(_) => panic!("pm should have failed to parse"),
        }
    }

    #[tokio::test]
    async fn test_fixed_responses_produce_exact_mapping() {
        let provider = MockProvider::with_responder(|req| {
            if req.prompt.contains("cloud architect") {
                Ok(text_response(
                    r#"{"architecture_pattern": "event-driven microservices"}"#,
                ))
            } else {
                Ok(text_response(r#"{"duration_days": 112}"#))
            }
        });
        let orchestrator = orchestrator_with(provider, 1);

        let request = RunRequest::new("Global AI FinTech platform")
            .with_agents(["architect", "pm"]);
        let result = orchestrator.run(&request, None).await.unwrap();

        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(
            body,
            json!({
                "results": {
                    "architect": {"architecture_pattern": "event-driven microservices"},
                    "pm": {"duration_days": 112},
                }
            })
        );
    }

    struct FailingExporter;

    #[async_trait::async_trait]
    impl RunExporter for FailingExporter {
        fn name(&self) -> &str {
            "failing"
        }

        async fn export(&self, _run: &sink::ExportRun) -> std::result::Result<(), ExportError> {
            Err("sheets API is down".into())
        }
    }

    #[tokio::test]
    async fn test_export_failure_does_not_change_result() {
        let provider = MockProvider::with_responder(|_| {
            Ok(text_response(r#"{"duration_days": 112}"#))
        });
        let handle = sink::spawn(4, vec![Arc::new(FailingExporter) as Arc<dyn RunExporter>], None);
        let orchestrator = orchestrator_with(provider, 1).with_sink(handle);

        let request = RunRequest::new("platform")
            .with_agents(["pm"])
            .with_export(true);
        let result = orchestrator.run(&request, None).await.unwrap();

        assert!(result.results["pm"].is_success());
        assert_eq!(result.results.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_dataset_rejected_before_any_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let provider = MockProvider::with_responder(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(text_response("{}"))
        });

        let dir = tempfile::tempdir().unwrap();
        let datasets = Arc::new(DatasetStore::new(dir.path()).unwrap());
        let orchestrator = orchestrator_with(provider, 1).with_datasets(datasets);

        let request = RunRequest::new("platform")
            .with_agents(["datasci"])
            .with_dataset(uuid::Uuid::new_v4().to_string());
        let err = orchestrator.run(&request, None).await.unwrap_err();

        assert!(matches!(err, Error::UnknownDataset(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
