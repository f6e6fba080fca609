mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod testing;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::infrastructure::container::AppContainer;
use crate::infrastructure::database::{create_connection_pool, run_migrations};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        error!("omnidesk failed to start: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let pool = create_connection_pool(&config.database_url)?;
    let migration_pool = pool.clone();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_pool)).await??;
    info!(applied, "Database migrations complete");

    let container = AppContainer::new(&config, pool)?;
    info!(address = %config.bind_address(), "Starting omnidesk");
    container.into_server().run().await?;

    Ok(())
}
