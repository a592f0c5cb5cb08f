//! CSV file export adapter
//!
//! Appends flattened run rows to a local CSV file, writing the header only
//! when the file is first created. The file accumulates runs over time,
//! one row per flattened leaf.

use crate::error::Result;
use crate::flatten::{flatten_results, HEADER};
use metis_core::sink::{ExportError, ExportRun, RunExporter};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// CSV file exporter
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing to `path`
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[instrument(skip(self, run), fields(path = %self.path.display()))]
    fn append_run(&self, run: &ExportRun) -> Result<()> {
        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if write_header {
            writer.write_record(HEADER)?;
        }
        let rows = flatten_results(&run.results);
        let count = rows.len();
        for row in rows {
            writer.write_record([&row.agent, &row.key_path, &row.value])?;
        }
        writer.flush()?;

        debug!(rows = count, "run appended to CSV");
        Ok(())
    }
}

#[async_trait::async_trait]
impl RunExporter for CsvExporter {
    fn name(&self) -> &str {
        "csv"
    }

    async fn export(&self, run: &ExportRun) -> std::result::Result<(), ExportError> {
        self.append_run(run).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run() -> ExportRun {
        ExportRun {
            description: "demo".to_string(),
            results: json!({
                "architect": {"pattern": "microservices"},
                "pm": {"duration_days": 112},
            }),
        }
    }

    #[tokio::test]
    async fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");
        let exporter = CsvExporter::new(&path);

        exporter.export(&run()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Agent,KeyPath,Value");
        assert_eq!(lines[1], "architect,pattern,microservices");
        assert_eq!(lines[2], "pm,duration_days,112");
    }

    #[tokio::test]
    async fn test_second_export_appends_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");
        let exporter = CsvExporter::new(&path);

        exporter.export(&run()).await.unwrap();
        exporter.export(&run()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|line| *line == "Agent,KeyPath,Value")
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_values_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");
        let exporter = CsvExporter::new(&path);

        let run = ExportRun {
            description: "demo".to_string(),
            results: json!({"ux": {"patterns": "progressive disclosure, skeletal loading"}}),
        };
        exporter.export(&run).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"progressive disclosure, skeletal loading\""));
    }
}
