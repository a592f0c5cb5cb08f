//! Google Sheets export adapter
//!
//! Appends flattened run rows to a spreadsheet via the Sheets v4
//! `values:append` endpoint, chunked to stay under the API's payload
//! limits. Credentials are a ready OAuth bearer token from the
//! environment; the token-granting flow belongs to the platform, not to
//! this service.

use crate::error::{Error, Result};
use crate::flatten::{flatten_results, HEADER};
use metis_core::sink::{ExportError, ExportRun, RunExporter};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sheets API base URL
pub const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Rows per append request
const CHUNK_ROWS: usize = 500;

/// Sheets destination configuration
#[derive(Clone)]
pub struct SheetsConfig {
    /// Target spreadsheet id
    pub spreadsheet_id: String,
    /// OAuth bearer token with spreadsheets scope
    pub access_token: String,
    /// A1-notation range (worksheet) to append to
    pub range: String,
    /// Request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("access_token", &"[REDACTED]")
            .field("range", &self.range)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SheetsConfig {
    /// Create a configuration for a spreadsheet
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
            range: "Sheet1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration from environment variables
    ///
    /// # Errors
    /// Returns `Error::NotConfigured` when `SHEETS_SPREADSHEET_ID` or
    /// `SHEETS_ACCESS_TOKEN` is absent.
    pub fn from_env() -> Result<Self> {
        let spreadsheet_id = std::env::var("SHEETS_SPREADSHEET_ID")
            .map_err(|_| Error::NotConfigured("SHEETS_SPREADSHEET_ID not set".to_string()))?;
        let access_token = std::env::var("SHEETS_ACCESS_TOKEN")
            .map_err(|_| Error::NotConfigured("SHEETS_ACCESS_TOKEN not set".to_string()))?;
        let range = std::env::var("SHEETS_RANGE").unwrap_or_else(|_| "Sheet1".to_string());

        Ok(Self {
            spreadsheet_id,
            access_token,
            range,
            timeout: Duration::from_secs(30),
        })
    }

    /// Set the worksheet range
    #[must_use]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }
}

#[derive(Serialize)]
struct AppendBody<'a> {
    values: &'a [Vec<String>],
}

/// Sheets exporter
pub struct SheetsExporter {
    client: Client,
    config: SheetsConfig,
}

impl SheetsExporter {
    /// Create an exporter
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn append_url(&self) -> String {
        format!(
            "{API_BASE}/{}/values/{}:append?valueInputOption=RAW",
            self.config.spreadsheet_id, self.config.range
        )
    }

    #[instrument(skip(self, run), fields(description = %run.description))]
    async fn append_run(&self, run: &ExportRun) -> Result<()> {
        let values = run_to_values(run);

        for chunk in values.chunks(CHUNK_ROWS) {
            let response = self
                .client
                .post(self.append_url())
                .bearer_auth(&self.config.access_token)
                .json(&AppendBody { values: chunk })
                .send()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(Error::Api(format!("append failed ({status}): {text}")));
            }
        }

        debug!(rows = values.len(), "run appended to spreadsheet");
        Ok(())
    }
}

/// Build the value grid: one header row plus one row per flattened leaf
fn run_to_values(run: &ExportRun) -> Vec<Vec<String>> {
    let mut values = Vec::new();
    values.push(HEADER.iter().map(|s| (*s).to_string()).collect());
    for row in flatten_results(&run.results) {
        values.push(vec![row.agent, row.key_path, row.value]);
    }
    values
}

#[async_trait::async_trait]
impl RunExporter for SheetsExporter {
    fn name(&self) -> &str {
        "sheets"
    }

    async fn export(&self, run: &ExportRun) -> std::result::Result<(), ExportError> {
        self.append_run(run).await.map_err(Into::into)
    }
}
