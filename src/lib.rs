//! EdTech course enrollment backend.
//!
//! A GraphQL API over users, courses and enrollments stored in SQLite.

pub mod config;
pub mod connection;
pub mod error;
pub mod graphql;
pub mod initialization;
pub mod models;
pub mod queries;
pub mod routes;
pub mod schema;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` takes precedence over `log_level`.
pub fn init_tracing(log_level: &str) {
    let rust_log = dotenvy::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), log_level))
        .init();
}

// An unparsable RUST_LOG falls back to the configured level.
fn log_filter(rust_log: Option<&str>, log_level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(log_level))
}
