use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{debug, error};

use crate::services::engine::ReconciliationEngine;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Spawns the background scheduler: one immediate cycle, then one per tick.
/// The engine's own guard keeps a slow cycle from overlapping the next tick.
pub fn spawn_presence_poll_task(
    engine: Arc<ReconciliationEngine>,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;
            match engine.run_cycle().await {
                Ok(report) if report.skipped => {}
                Ok(report) => debug!(
                    "Cycle finished: {} transition(s) across {} broadcaster(s)",
                    report.transitions, report.broadcasters
                ),
                Err(e) => error!("Presence reconciliation cycle failed: {e:?}"),
            }
        }
    })
}
