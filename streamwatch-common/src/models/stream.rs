use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable platform-side identifier for a tracked broadcaster. This is the
/// numeric user id, not the login or display name (both of which are mutable),
/// so it is the only safe key for diffing across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BroadcasterId(pub String);

impl BroadcasterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BroadcasterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BroadcasterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Everything we know about a live stream at the moment a snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveInfo {
    pub title: String,
    pub game_name: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Live(LiveInfo),
    Offline,
}

impl StreamStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, StreamStatus::Live(_))
    }

    pub fn live_info(&self) -> Option<&LiveInfo> {
        match self {
            StreamStatus::Live(info) => Some(info),
            StreamStatus::Offline => None,
        }
    }
}

/// Last-known statuses for every tracked broadcaster at one point in time.
/// Built fresh each reconciliation cycle and never mutated afterwards; the
/// engine swaps whole snapshots rather than editing entries in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSnapshot {
    entries: HashMap<BroadcasterId, StreamStatus>,
}

impl PresenceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: BroadcasterId, status: StreamStatus) {
        self.entries.insert(id, status);
    }

    pub fn remove(&mut self, id: &BroadcasterId) -> Option<StreamStatus> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &BroadcasterId) -> Option<&StreamStatus> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &BroadcasterId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &BroadcasterId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BroadcasterId, &StreamStatus)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(BroadcasterId, StreamStatus)> for PresenceSnapshot {
    fn from_iter<T: IntoIterator<Item = (BroadcasterId, StreamStatus)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Profile data resolved from the platform's bulk user lookup. A broadcaster
/// id that fails to resolve at all is treated as gone (account deleted or
/// banned), which triggers subscription cleanup rather than an "offline" edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub broadcaster_id: BroadcasterId,
    pub login: String,
    pub display_name: String,
    pub profile_image_url: String,
    pub offline_image_url: String,
}

/// Classified change between two consecutive snapshots for one broadcaster.
/// Recomputed every cycle; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    BecameLive(LiveInfo),
    Updated(LiveInfo),
    BecameOffline,
    Unchanged,
}

impl Transition {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Transition::Unchanged)
    }
}
