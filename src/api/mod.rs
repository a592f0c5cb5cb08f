//! Web API module for Metis
//!
//! Provides REST API endpoints for:
//! - Health checks
//! - Agent listing
//! - Planning runs (with optional persistence)
//! - Per-user run history
//! - Dataset uploads
//! - The static browser client

pub mod agents;
pub mod datasets;
pub mod health;
pub mod projects;
pub mod runs;
pub mod ui;

pub use agents::agents_routes;
pub use datasets::datasets_routes;
pub use health::health_routes;
pub use projects::projects_routes;
pub use runs::runs_routes;
pub use ui::ui_routes;
