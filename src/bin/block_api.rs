use anyhow::Result;
use block_store::BlockStore;
use chainpulse::bin_common::{load_config_from_env, ConfigType};
use dashboard::api::{serve, AppState};
use dashboard::utils::init_tracing;
use dashboard::DashboardConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Dashboard);
    let config = DashboardConfig::load(&config_path)?;

    init_tracing(&config.log_level);
    config.log();

    let store = Arc::new(BlockStore::open(&config.database.url).await?);
    let addr = config.api.socket_addr()?;

    print_banner("Block API", &addr.to_string());

    serve(addr, AppState { store }).await?;

    print_shutdown("Block API");
    Ok(())
}

fn print_banner(name: &str, addr: &str) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    info!("Listening on {}", addr);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} stopped gracefully", name);
    info!("========================================");
}
