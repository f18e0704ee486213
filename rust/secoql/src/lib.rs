pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod server;
pub mod soda;
pub mod soql;
pub mod state;
pub mod telemetry;
pub mod view;

use crate::{config::AppConfig, server::Server};

/// Bootstraps the secoql service using environment configuration.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    Server::new(config)?.run().await
}
