//! One-shot planning run from the terminal
//!
//! Mirrors `POST /run` without the server: resolve the provider, run the
//! selected agents over a description (inline or from a text file) and
//! print the result JSON. Export, when requested, runs inline so the
//! process does not exit before the adapters finish.

use anyhow::{bail, Context, Result};
use clap::Args;
use metis_core::sink::{ExportRun, RunExporter};
use metis_core::{AgentRegistry, Orchestrator, OrchestratorConfig, RunRequest};
use metis_llm::{LlmSettings, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Arguments for the `run` subcommand
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Project description text
    #[arg(long, conflicts_with = "file")]
    pub description: Option<String>,

    /// Read the project description from a text file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Comma-separated list of agents to run (default: all)
    #[arg(long)]
    pub agents: Option<String>,

    /// Export results for this run
    #[arg(long)]
    pub export: bool,
}

/// Execute the `run` subcommand
pub async fn run(args: RunArgs) -> Result<()> {
    let config = crate::server::load_config()?;

    let description = match (&args.description, &args.file) {
        (Some(description), _) => description.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read description file {}", path.display()))?,
        (None, None) => bail!("provide --description or --file"),
    };

    let provider = metis_llm::resolve_provider(&LlmSettings {
        provider: config.llm.provider.clone(),
        model: config.llm.model.clone(),
        timeout_secs: config.llm.timeout_secs,
    })?;

    let orchestrator = Orchestrator::new(Arc::new(AgentRegistry::standard()), provider)
        .with_config(OrchestratorConfig {
            retry: RetryPolicy::new(config.llm.max_retries)
                .with_base_delay(Duration::from_millis(config.llm.retry_delay_ms)),
            ..OrchestratorConfig::default()
        });

    let mut request = RunRequest::new(description.trim());
    if let Some(agents) = &args.agents {
        request = request.with_agents(
            agents
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>(),
        );
    }

    let result = orchestrator.run(&request, None).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if args.export {
        let run = ExportRun {
            description: description.trim().to_string(),
            results: result.results_json(),
        };
        let exporters = crate::server::build_exporters(&config.export);
        if exporters.is_empty() {
            warn!("--export requested but no exporter is configured");
        }
        for exporter in exporters {
            if let Err(e) = exporter.export(&run).await {
                warn!(exporter = exporter.name(), error = %e, "export failed");
            } else {
                eprintln!("exported via {}", exporter.name());
            }
        }
    }

    Ok(())
}
