pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod scenarios;
pub mod schema;
pub mod store;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{AppState, Decimal, Ymd};
pub use error::AppError;
pub use orchestration::{apply_financing_rounds, compute_dashboard_summary, DashboardSummary};
pub use scenarios::{Scenario, ScenarioLibrary};
pub use schema::{export_document, parse_app_state, parse_document};
pub use store::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
