// streamwatch-core/src/services/engine.rs
//
// One reconciliation cycle: load subscriptions, fetch presence in chunks,
// diff against the previous snapshot, synchronize notification messages,
// then swap the snapshot. The previous snapshot is replaced only after the
// whole cycle ran, so a failed or crashed cycle re-diffs against the last
// good baseline next time.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::{info, warn};

use streamwatch_common::models::stream::{BroadcasterId, PresenceSnapshot, ResolvedProfile};
use streamwatch_common::models::subscription::Subscription;
use streamwatch_common::traits::repository_traits::SubscriptionRepository;
use streamwatch_common::Error;

use crate::platforms::twitch::PresenceFetch;

use super::diff::diff;
use super::notifier::NotificationSynchronizer;

/// Summary of what one `run_cycle` call did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// True when the call was a no-op because a cycle was already running.
    pub skipped: bool,
    pub broadcasters: usize,
    pub transitions: usize,
    pub failed_chunks: usize,
    pub failed_subscriptions: usize,
    pub removed_subscriptions: usize,
}

impl CycleReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

struct EngineState {
    previous: PresenceSnapshot,
    /// Last resolved profile per tracked broadcaster, kept alongside the
    /// snapshot so offline renders have a display name and images even
    /// though `/streams` no longer returns the broadcaster.
    profiles: HashMap<BroadcasterId, ResolvedProfile>,
}

pub struct ReconciliationEngine {
    fetcher: Arc<dyn PresenceFetch>,
    repo: Arc<dyn SubscriptionRepository>,
    synchronizer: NotificationSynchronizer,
    state: Mutex<EngineState>,
}

impl ReconciliationEngine {
    pub fn new(
        fetcher: Arc<dyn PresenceFetch>,
        repo: Arc<dyn SubscriptionRepository>,
        synchronizer: NotificationSynchronizer,
    ) -> Self {
        Self {
            fetcher,
            repo,
            synchronizer,
            state: Mutex::new(EngineState {
                previous: PresenceSnapshot::new(),
                profiles: HashMap::new(),
            }),
        }
    }

    /// Runs one reconciliation cycle. If the previous cycle is still running
    /// (a slow platform API outlasting the scheduler interval), this call is
    /// a logged no-op; cycles never overlap.
    ///
    /// An `Error::Auth` aborts the cycle before any message or repository
    /// write; transient chunk failures are absorbed by carrying the previous
    /// snapshot entries forward for just that chunk's ids.
    pub async fn run_cycle(&self) -> Result<CycleReport, Error> {
        let Ok(mut state) = self.state.try_lock() else {
            warn!("Previous reconciliation cycle still running; skipping this tick");
            return Ok(CycleReport::skipped());
        };

        let subs = self.repo.list_all().await?;
        let mut subs_by_broadcaster: HashMap<BroadcasterId, Vec<Subscription>> = HashMap::new();
        for sub in subs {
            subs_by_broadcaster
                .entry(sub.broadcaster_id.clone())
                .or_default()
                .push(sub);
        }

        let mut ids: Vec<BroadcasterId> = subs_by_broadcaster.keys().cloned().collect();
        ids.sort();

        // Chunks are independent: fetched concurrently, and a failure in one
        // never blocks or falsifies another.
        let max_batch = self.fetcher.max_batch().max(1);
        let fetches = ids
            .chunks(max_batch)
            .map(|chunk| async move { (chunk, self.fetcher.fetch_chunk(chunk).await) });
        let results = join_all(fetches).await;

        let mut next = PresenceSnapshot::new();
        let mut profiles = state.profiles.clone();
        let mut unresolved: Vec<BroadcasterId> = Vec::new();
        let mut failed_chunks = 0usize;

        for (chunk, result) in results {
            match result {
                Ok(snap) => {
                    for (id, status) in snap.statuses {
                        next.insert(id, status);
                    }
                    for (id, profile) in snap.profiles {
                        profiles.insert(id, profile);
                    }
                    unresolved.extend(snap.unresolved);
                }
                Err(e @ Error::Auth(_)) => {
                    // Without a token nothing downstream can succeed; abort
                    // the whole cycle with `previous` untouched.
                    return Err(e);
                }
                Err(e) => {
                    failed_chunks += 1;
                    warn!(
                        "Presence fetch failed for a chunk of {} id(s); carrying previous entries forward: {e}",
                        chunk.len()
                    );
                    // "No data" is not "went offline": keep last-known state
                    // so this chunk produces no transitions this cycle.
                    for id in chunk {
                        if let Some(status) = state.previous.get(id) {
                            next.insert(id.clone(), status.clone());
                        }
                    }
                }
            }
        }

        // Ids the platform no longer knows get their subscriptions and
        // messages removed in this same cycle, and never reach the differ.
        let removed_subscriptions = if unresolved.is_empty() {
            0
        } else {
            let removed = self
                .synchronizer
                .remove_unresolved(&unresolved, &subs_by_broadcaster)
                .await;
            for id in &unresolved {
                next.remove(id);
                profiles.remove(id);
                subs_by_broadcaster.remove(id);
            }
            removed
        };

        profiles.retain(|id, _| next.contains(id));

        let transitions = diff(&state.previous, &next);
        let failed_subscriptions = self
            .synchronizer
            .apply(&transitions, &subs_by_broadcaster, &profiles)
            .await;

        let report = CycleReport {
            skipped: false,
            broadcasters: ids.len(),
            transitions: transitions.len(),
            failed_chunks,
            failed_subscriptions,
            removed_subscriptions,
        };
        info!(
            "Reconciliation cycle done: {} broadcaster(s), {} transition(s), {} failed chunk(s), {} failed subscription(s), {} removed",
            report.broadcasters,
            report.transitions,
            report.failed_chunks,
            report.failed_subscriptions,
            report.removed_subscriptions
        );

        // The cycle ran to completion (individual failures included), so the
        // new snapshot becomes the baseline for the next diff.
        state.previous = next;
        state.profiles = profiles;

        Ok(report)
    }
}
