// streamwatch-core/src/services/diff.rs
//
// Pure snapshot comparison. No I/O happens here; the engine feeds it two
// snapshots and gets back only the broadcasters whose visible state changed.

use std::collections::BTreeSet;

use streamwatch_common::models::stream::{
    BroadcasterId, PresenceSnapshot, StreamStatus, Transition,
};

/// Classifies the change between two observations of one broadcaster.
///
/// A raw viewer-count delta counts as `Updated`: the notification message
/// carries the count, so it is re-rendered whenever the count moves.
pub fn classify(prev: Option<&StreamStatus>, next: Option<&StreamStatus>) -> Transition {
    let prev_live = prev.and_then(StreamStatus::live_info);
    let next_live = next.and_then(StreamStatus::live_info);

    match (prev_live, next_live) {
        (None, Some(info)) => Transition::BecameLive(info.clone()),
        (Some(p), Some(n)) => {
            if p.game_name != n.game_name || p.title != n.title || p.viewer_count != n.viewer_count
            {
                Transition::Updated(n.clone())
            } else {
                Transition::Unchanged
            }
        }
        (Some(_), None) => Transition::BecameOffline,
        (None, None) => Transition::Unchanged,
    }
}

/// Diffs two snapshots over the union of their keys, dropping `Unchanged`
/// entries. Output is sorted by broadcaster id so a cycle's synchronizer work
/// is deterministic.
pub fn diff(prev: &PresenceSnapshot, next: &PresenceSnapshot) -> Vec<(BroadcasterId, Transition)> {
    let ids: BTreeSet<&BroadcasterId> = prev.ids().chain(next.ids()).collect();

    let mut out = Vec::new();
    for id in ids {
        let transition = classify(prev.get(id), next.get(id));
        if !transition.is_unchanged() {
            out.push((id.clone(), transition));
        }
    }
    out
}
