use chrono::{DateTime, Duration, Utc};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use streamwatch_common::Error;

use super::TwitchConfig;

/// Refresh this long before the platform-reported expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Deserialize)]
struct AppTokenResponse {
    access_token: String,
    expires_in: u64,
    #[allow(dead_code)]
    token_type: String,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Owns the single client-credentials bearer token used for Helix calls.
///
/// The cache sits behind a `tokio::sync::Mutex` that stays held across the
/// refresh request, so concurrent callers that all see an expired token wait
/// on the same in-flight refresh instead of issuing duplicates.
pub struct TwitchAppTokenManager {
    config: TwitchConfig,
    http: ReqwestClient,
    cached: Mutex<Option<CachedToken>>,
}

impl TwitchAppTokenManager {
    pub fn new(config: TwitchConfig, http: ReqwestClient) -> Self {
        Self {
            config,
            http,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached token, refreshing it first when it is within the
    /// safety margin of expiry. A token-endpoint failure propagates as
    /// `Error::Auth`; callers must not fall back to a stale token.
    pub async fn get_token(&self) -> Result<String, Error> {
        let mut guard = self.cached.lock().await;

        if let Some(tok) = guard.as_ref() {
            if Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) < tok.expires_at {
                return Ok(tok.access_token.clone());
            }
        }

        let token_url = format!("{}/token", self.config.oauth_base_url);
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .http
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("HTTP error requesting app token: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Auth(format!("Twitch token endpoint error: {e}")))?
            .json::<AppTokenResponse>()
            .await
            .map_err(|e| Error::Auth(format!("Parse error on token JSON: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(resp.expires_in as i64);
        debug!("Obtained app access token; expires_at={expires_at}");

        *guard = Some(CachedToken {
            access_token: resp.access_token.clone(),
            expires_at,
        });
        Ok(resp.access_token)
    }
}
