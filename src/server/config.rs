//! Server configuration types
//!
//! Contains all configuration structures for the Metis server. Credentials
//! (provider API keys, Sheets token) are never stored here; the provider
//! and exporter `from_env` constructors read those directly.

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmAppConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub supabase: SupabaseAppConfig,
    #[serde(default)]
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAppConfig {
    /// Provider id: moonshot | openai | anthropic | ollama
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model override (provider default when unset)
    #[serde(default)]
    pub model: Option<String>,
    /// Attempt ceiling per agent call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmAppConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "moonshot".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    120
}

/// Export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export every run unless the request overrides it
    #[serde(default)]
    pub enabled: bool,
    /// CSV destination path; unset disables the CSV adapter
    #[serde(default)]
    pub csv_path: Option<String>,
    /// Register the Google Sheets adapter (credentials come from
    /// `SHEETS_SPREADSHEET_ID` / `SHEETS_ACCESS_TOKEN`)
    #[serde(default)]
    pub sheets: bool,
}

/// Supabase persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseAppConfig {
    /// Project URL; unset disables persistence
    #[serde(default)]
    pub url: Option<String>,
    /// Anonymous API key
    #[serde(default)]
    pub anon_key: Option<String>,
    /// JWT signing secret for verifying user tokens
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Table holding run records
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for SupabaseAppConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            jwt_secret: None,
            table: default_table(),
        }
    }
}

fn default_table() -> String {
    metis_core::store::DEFAULT_TABLE.to_string()
}

/// Dataset storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// Directory for uploaded dataset files
    #[serde(default = "default_datasets_dir")]
    pub dir: String,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            dir: default_datasets_dir(),
        }
    }
}

fn default_datasets_dir() -> String {
    "data/datasets".to_string()
}

/// Export/persistence sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Bounded queue capacity for pending side-effect jobs
    #[serde(default = "default_sink_capacity")]
    pub capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            capacity: default_sink_capacity(),
        }
    }
}

fn default_sink_capacity() -> usize {
    64
}
