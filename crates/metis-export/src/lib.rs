//! Metis Export - run result export adapters
//!
//! Adapters flatten a run's result mapping into `(agent, key_path, value)`
//! rows and append them to an external destination. Different agents return
//! different JSON shapes; per-key-path rows union those shapes without any
//! schema coordination. Export failures are logged by the sink worker and
//! never fail a run.
//!
//! - `flatten`: nested JSON to flat rows
//! - `sheets`: Google Sheets v4 append adapter
//! - `file`: CSV file adapter

#![forbid(unsafe_code)]

pub mod error;
pub mod file;
pub mod flatten;
pub mod sheets;

pub use error::{Error, Result};
pub use file::CsvExporter;
pub use flatten::{flatten_results, Row, HEADER};
pub use sheets::{SheetsConfig, SheetsExporter};
