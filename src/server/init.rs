//! Server initialization
//!
//! Wires the registry, provider, stores and sink together, builds the
//! router and serves it.

use super::config::{AppConfig, ExportConfig};
use crate::middleware::auth::AuthState;
use anyhow::{Context, Result};
use axum::{Extension, Router};
use metis_core::sink::{RunExporter, RunStore};
use metis_core::store::{SupabaseConfig, SupabaseStore};
use metis_core::{
    AgentRegistry, DatasetStore, Orchestrator, OrchestratorConfig, TokenVerifier,
};
use metis_export::{CsvExporter, SheetsConfig, SheetsExporter};
use metis_llm::{LlmSettings, RetryPolicy};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Load configuration and run the server
pub async fn run() -> Result<()> {
    let config = super::loader::load_config()?;
    run_with_config(config).await
}

/// Run the server with an explicit configuration
async fn run_with_config(config: AppConfig) -> Result<()> {
    let registry = Arc::new(AgentRegistry::standard());

    let provider = metis_llm::resolve_provider(&LlmSettings {
        provider: config.llm.provider.clone(),
        model: config.llm.model.clone(),
        timeout_secs: config.llm.timeout_secs,
    })
    .context("Failed to resolve LLM provider")?;

    let datasets = Arc::new(
        DatasetStore::new(&config.datasets.dir).context("Failed to open dataset store")?,
    );

    let store = build_store(&config)?;
    let verifier = config
        .supabase
        .jwt_secret
        .as_ref()
        .map(|secret| Arc::new(TokenVerifier::new(secret.clone())));
    if verifier.is_none() {
        info!("No JWT secret configured; runs are anonymous and history is unavailable");
    }

    let exporters = build_exporters(&config.export);
    let sink = metis_core::sink::spawn(
        config.sink.capacity,
        exporters,
        store.clone().map(|s| s as Arc<dyn RunStore>),
    );

    let orchestrator = Arc::new(
        Orchestrator::new(registry.clone(), provider)
            .with_config(OrchestratorConfig {
                retry: RetryPolicy::new(config.llm.max_retries)
                    .with_base_delay(Duration::from_millis(config.llm.retry_delay_ms)),
                export_default: config.export.enabled,
                ..OrchestratorConfig::default()
            })
            .with_datasets(datasets.clone())
            .with_sink(sink),
    );

    let app = router(registry, orchestrator, store, datasets, AuthState::new(verifier));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Metis server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Build the main router with all endpoints
fn router(
    registry: Arc<AgentRegistry>,
    orchestrator: Arc<Orchestrator>,
    store: Option<Arc<SupabaseStore>>,
    datasets: Arc<DatasetStore>,
    auth: AuthState,
) -> Router {
    Router::new()
        .merge(crate::api::health_routes())
        .merge(crate::api::agents_routes())
        .merge(crate::api::runs_routes())
        .merge(crate::api::projects_routes())
        .merge(crate::api::datasets_routes())
        .merge(crate::api::ui_routes())
        .layer(Extension(registry))
        .layer(Extension(orchestrator))
        .layer(Extension(store))
        .layer(Extension(datasets))
        .layer(Extension(auth))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Build the persistence store when Supabase is configured
fn build_store(config: &AppConfig) -> Result<Option<Arc<SupabaseStore>>> {
    match (&config.supabase.url, &config.supabase.anon_key) {
        (Some(url), Some(anon_key)) => {
            let store = SupabaseStore::new(
                SupabaseConfig::new(url.clone(), anon_key.clone())
                    .with_table(config.supabase.table.clone()),
            )
            .context("Failed to create Supabase store")?;
            info!("Supabase persistence enabled");
            Ok(Some(Arc::new(store)))
        }
        _ => {
            info!("Supabase not configured; runs will not be persisted");
            Ok(None)
        }
    }
}

/// Build the configured export adapters
pub fn build_exporters(config: &ExportConfig) -> Vec<Arc<dyn RunExporter>> {
    let mut exporters: Vec<Arc<dyn RunExporter>> = Vec::new();

    if let Some(path) = &config.csv_path {
        exporters.push(Arc::new(CsvExporter::new(path)));
        info!(path, "Registered CSV exporter");
    }

    if config.sheets {
        match SheetsConfig::from_env().and_then(SheetsExporter::new) {
            Ok(exporter) => {
                exporters.push(Arc::new(exporter));
                info!("Registered Google Sheets exporter");
            }
            Err(e) => warn!("Sheets exporter not available: {}", e),
        }
    }

    exporters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_exporters_by_default() {
        assert!(build_exporters(&ExportConfig::default()).is_empty());
    }

    #[test]
    fn test_csv_exporter_registered_from_config() {
        let config = ExportConfig {
            enabled: true,
            csv_path: Some("runs.csv".to_string()),
            sheets: false,
        };
        let exporters = build_exporters(&config);
        assert_eq!(exporters.len(), 1);
        assert_eq!(exporters[0].name(), "csv");
    }
}
