use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use streamwatch_core::platforms::discord::DiscordMessenger;
use streamwatch_core::platforms::twitch::{TwitchConfig, TwitchHelixClient};
use streamwatch_core::repositories::PostgresSubscriptionRepository;
use streamwatch_core::services::{EmbedRenderer, NotificationSynchronizer, ReconciliationEngine};
use streamwatch_core::tasks::presence_poll::{spawn_presence_poll_task, DEFAULT_POLL_INTERVAL};
use streamwatch_core::{Database, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "streamwatch")]
#[command(author, version, about = "Live-presence watcher posting Twitch status to Discord")]
struct Args {
    /// Postgres connection URL.
    #[arg(long, default_value = "postgres://streamwatch@localhost:5432/streamwatch")]
    db_url: String,

    /// Seconds between reconciliation cycles.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let db = Database::new(&args.db_url).await?;
    db.migrate().await?;

    let repo = Arc::new(PostgresSubscriptionRepository::new(db.pool().clone()));
    let fetcher = Arc::new(TwitchHelixClient::new(TwitchConfig::from_env()?)?);
    let messenger = Arc::new(DiscordMessenger::from_env()?);
    let renderer = Arc::new(EmbedRenderer::new());

    let synchronizer = NotificationSynchronizer::new(repo.clone(), messenger, renderer);
    let engine = Arc::new(ReconciliationEngine::new(fetcher, repo, synchronizer));

    let poll_interval = Duration::from_secs(args.poll_interval_secs.max(1));
    info!(
        "Starting presence poll task (interval = {}s)",
        poll_interval.as_secs()
    );
    let handle = spawn_presence_poll_task(engine, poll_interval);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested; stopping poll task.");
    handle.abort();

    Ok(())
}
