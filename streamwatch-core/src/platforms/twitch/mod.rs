// streamwatch-core/src/platforms/twitch/mod.rs
//
// Twitch-side platform integration: the app-token manager and the Helix
// client that turns a batch of broadcaster ids into a presence snapshot.

pub mod auth;
pub mod helix;

use std::collections::HashMap;

use async_trait::async_trait;

use streamwatch_common::models::stream::{BroadcasterId, ResolvedProfile, StreamStatus};
use streamwatch_common::Error;

pub use auth::TwitchAppTokenManager;
pub use helix::TwitchHelixClient;

#[derive(Debug, Clone)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Overridable so tests can point the client at a local stub server.
    pub helix_base_url: String,
    pub oauth_base_url: String,
}

impl TwitchConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            helix_base_url: "https://api.twitch.tv/helix".to_string(),
            oauth_base_url: "https://id.twitch.tv/oauth2".to_string(),
        }
    }

    /// Reads `TWITCH_CLIENT_ID` / `TWITCH_CLIENT_SECRET` (via dotenv if a
    /// `.env` file is present).
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let client_id = std::env::var("TWITCH_CLIENT_ID")
            .map_err(|_| Error::Auth("TWITCH_CLIENT_ID is not set".to_string()))?;
        let client_secret = std::env::var("TWITCH_CLIENT_SECRET")
            .map_err(|_| Error::Auth("TWITCH_CLIENT_SECRET is not set".to_string()))?;
        Ok(Self::new(client_id, client_secret))
    }
}

/// Result of fetching one id batch. `statuses` has an entry for every id that
/// resolved to a profile (absent from the live-streams call means Offline);
/// ids the platform no longer knows about land in `unresolved` so the caller
/// can run subscription cleanup instead of misreading them as offline.
#[derive(Debug, Clone, Default)]
pub struct ChunkSnapshot {
    pub statuses: HashMap<BroadcasterId, StreamStatus>,
    pub profiles: HashMap<BroadcasterId, ResolvedProfile>,
    pub unresolved: Vec<BroadcasterId>,
}

/// Boundary the reconciliation engine fetches through, so tests can script
/// per-chunk outcomes without a network.
#[async_trait]
pub trait PresenceFetch: Send + Sync {
    /// Largest id batch one `fetch_chunk` call may receive.
    fn max_batch(&self) -> usize;

    /// Fetch live status and profiles for one batch of ids. Must fail the
    /// whole batch atomically; a partial result is never returned.
    async fn fetch_chunk(&self, ids: &[BroadcasterId]) -> Result<ChunkSnapshot, Error>;
}
