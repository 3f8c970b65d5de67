use anyhow::Result;
use tracing::info;

use walk_rewards_sync::{config::Config, logging::init_logging, sync_job::SyncJob};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;

    info!("Starting walk rewards sync v{}", env!("CARGO_PKG_VERSION"));

    let report = SyncJob::new(config)?.run().await?;

    info!(
        challenges_completed = report.challenges_completed,
        total_reward = report.total_reward,
        duration_secs = report.duration_secs,
        "Done"
    );

    Ok(())
}
