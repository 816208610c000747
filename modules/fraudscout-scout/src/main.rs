use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fraudscout_common::Config;
use fraudscout_scout::scout::Scout;
use fraudscout_store::SupabaseStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fraudscout_scout=info".parse()?),
        )
        .init();

    info!("FraudScout starting...");

    let config = Config::from_env();
    config.log_redacted();

    let store = Arc::new(SupabaseStore::new(&config.supabase_url, &config.supabase_key));

    let mut scout = Scout::new(&config, store);
    let stats = scout.run().await?;
    info!("Scout run complete. {stats}");

    Ok(())
}
