//! Supabase persistence adapter
//!
//! Runs are persisted to a hosted PostgREST table, append-only: Metis never
//! updates or deletes rows. Every call forwards the verified user's own
//! bearer token so the platform's row-level policies see the same identity
//! this service verified.

use crate::auth::UserIdentity;
use crate::error::{Error, Result};
use crate::sink::{ExportError, RunStore};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default table name for persisted runs
pub const DEFAULT_TABLE: &str = "project_runs";

/// Supabase connection configuration
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Anonymous (publishable) API key
    pub anon_key: String,
    /// Table holding run records
    pub table: String,
    /// Request timeout
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// Create a configuration for a project
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the table name
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

/// One persisted run row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRun {
    /// Row id assigned by the platform
    pub id: uuid::Uuid,
    /// Owning-user identifier
    pub user_id: String,
    /// Project description the run was made for
    pub description: String,
    /// The result mapping as stored
    pub results: serde_json::Value,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// Append-only store over a Supabase table
pub struct SupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    /// Create a store
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Store(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    /// Append one run record for the verified user
    #[instrument(skip(self, user, results), fields(user_id = %user.user_id))]
    pub async fn insert_run(
        &self,
        user: &UserIdentity,
        description: &str,
        results: &serde_json::Value,
    ) -> Result<()> {
        let body = serde_json::json!({
            "user_id": user.user_id,
            "description": description,
            "results": results,
        });

        let response = self
            .client
            .post(self.rows_url())
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", user.token))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("insert failed ({status}): {text}")));
        }

        debug!("run row inserted");
        Ok(())
    }

    /// Fetch the most recent run per description for the verified user
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn latest_runs(&self, user: &UserIdentity) -> Result<Vec<PersistedRun>> {
        let url = format!(
            "{}?select=id,user_id,description,results,created_at&user_id=eq.{}&order=created_at.desc&limit=100",
            self.rows_url(),
            user.user_id
        );

        let response = self
            .client
            .get(url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", user.token))
            .send()
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("query failed ({status}): {text}")));
        }

        let rows: Vec<PersistedRun> = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("unexpected row shape: {e}")))?;

        Ok(latest_per_description(rows))
    }
}

#[async_trait::async_trait]
impl RunStore for SupabaseStore {
    async fn append(
        &self,
        user: &UserIdentity,
        description: &str,
        results: &serde_json::Value,
    ) -> std::result::Result<(), ExportError> {
        self.insert_run(user, description, results)
            .await
            .map_err(|e| -> ExportError { e.to_string().into() })
    }
}

/// Keep only the newest row per description
///
/// Rows arrive ordered newest-first, so the first occurrence of each
/// description wins and overall ordering is preserved.
fn latest_per_description(rows: Vec<PersistedRun>) -> Vec<PersistedRun> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.description.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(description: &str, secs: i64) -> PersistedRun {
        PersistedRun {
            id: uuid::Uuid::new_v4(),
            user_id: "user-42".to_string(),
            description: description.to_string(),
            results: json!({}),
            created_at: DateTime::from_timestamp(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_latest_per_description_keeps_first_seen() {
        let rows = vec![row("fintech", 300), row("ecommerce", 200), row("fintech", 100)];
        let latest = latest_per_description(rows);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].description, "fintech");
        assert_eq!(latest[0].created_at.timestamp(), 300);
        assert_eq!(latest[1].description, "ecommerce");
    }

    #[test]
    fn test_rows_url_strips_trailing_slash() {
        let store = SupabaseStore::new(SupabaseConfig::new(
            "https://abc.supabase.co/",
            "anon-key",
        ))
        .unwrap();
        assert_eq!(
            store.rows_url(),
            "https://abc.supabase.co/rest/v1/project_runs"
        );
    }

    #[test]
    fn test_custom_table_in_url() {
        let config = SupabaseConfig::new("https://abc.supabase.co", "k").with_table("runs_v2");
        let store = SupabaseStore::new(config).unwrap();
        assert!(store.rows_url().ends_with("/rest/v1/runs_v2"));
    }
}
