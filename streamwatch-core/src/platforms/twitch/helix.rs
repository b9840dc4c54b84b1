use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use streamwatch_common::models::stream::{
    BroadcasterId, LiveInfo, ResolvedProfile, StreamStatus,
};
use streamwatch_common::Error;

use super::{ChunkSnapshot, PresenceFetch, TwitchAppTokenManager, TwitchConfig};

/// Helix bulk endpoints accept at most 100 ids per request.
const HELIX_MAX_BATCH: usize = 100;

/// Bound on every outbound request so a hung call cannot stall a cycle.
const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct HelixPage<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct HelixStream {
    user_id: String,
    title: String,
    game_name: String,
    viewer_count: u64,
    started_at: DateTime<Utc>,
    #[serde(rename = "type")]
    stream_type: String,
    thumbnail_url: String,
}

#[derive(Deserialize)]
struct HelixUser {
    id: String,
    login: String,
    display_name: String,
    profile_image_url: String,
    offline_image_url: String,
}

/// Bulk presence fetcher over the Helix `/streams` and `/users` endpoints.
pub struct TwitchHelixClient {
    config: TwitchConfig,
    http: ReqwestClient,
    tokens: Arc<TwitchAppTokenManager>,
}

impl TwitchHelixClient {
    pub fn new(config: TwitchConfig) -> Result<Self, Error> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        let tokens = Arc::new(TwitchAppTokenManager::new(config.clone(), http.clone()));
        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    pub fn token_manager(&self) -> Arc<TwitchAppTokenManager> {
        Arc::clone(&self.tokens)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let token = self.tokens.get_token().await?;
        let resp = self
            .http
            .get(url)
            .header("Client-Id", &self.config.client_id)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Platform(format!("Helix request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Platform(format!("Helix returned error status: {e}")))?;

        resp.json::<T>()
            .await
            .map_err(|e| Error::Platform(format!("Helix response parse error: {e}")))
    }
}

#[async_trait]
impl PresenceFetch for TwitchHelixClient {
    fn max_batch(&self) -> usize {
        HELIX_MAX_BATCH
    }

    async fn fetch_chunk(&self, ids: &[BroadcasterId]) -> Result<ChunkSnapshot, Error> {
        if ids.is_empty() {
            return Ok(ChunkSnapshot::default());
        }
        if ids.len() > HELIX_MAX_BATCH {
            return Err(Error::Platform(format!(
                "Batch of {} ids exceeds the Helix limit of {HELIX_MAX_BATCH}",
                ids.len()
            )));
        }

        let streams_url = format!("{}/streams", self.config.helix_base_url);
        let users_url = format!("{}/users", self.config.helix_base_url);
        let stream_query: Vec<(&str, &str)> =
            ids.iter().map(|id| ("user_id", id.as_str())).collect();
        let user_query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();

        // Both calls must succeed or the whole chunk fails: profiles without
        // stream data would misread "no data" as "everyone went offline".
        let streams: HelixPage<HelixStream> = self.get_json(&streams_url, &stream_query).await?;
        let users: HelixPage<HelixUser> = self.get_json(&users_url, &user_query).await?;

        let mut live: HashMap<BroadcasterId, LiveInfo> = HashMap::new();
        for s in streams.data {
            if s.stream_type != "live" {
                continue;
            }
            live.insert(
                BroadcasterId::new(s.user_id),
                LiveInfo {
                    title: s.title,
                    game_name: s.game_name,
                    viewer_count: s.viewer_count,
                    started_at: s.started_at,
                    thumbnail_url: s.thumbnail_url,
                },
            );
        }

        let mut chunk = ChunkSnapshot::default();
        for u in users.data {
            let id = BroadcasterId::new(u.id);
            let status = match live.remove(&id) {
                Some(info) => StreamStatus::Live(info),
                None => StreamStatus::Offline,
            };
            chunk.statuses.insert(id.clone(), status);
            chunk.profiles.insert(
                id.clone(),
                ResolvedProfile {
                    broadcaster_id: id,
                    login: u.login,
                    display_name: u.display_name,
                    profile_image_url: u.profile_image_url,
                    offline_image_url: u.offline_image_url,
                },
            );
        }

        // Requested but missing from /users: the account is gone, which is a
        // cleanup signal rather than an offline status.
        for id in ids {
            if !chunk.profiles.contains_key(id) {
                chunk.unresolved.push(id.clone());
            }
        }

        debug!(
            "Fetched chunk: {} id(s), {} live, {} unresolved",
            ids.len(),
            chunk.statuses.values().filter(|s| s.is_live()).count(),
            chunk.unresolved.len()
        );
        Ok(chunk)
    }
}
