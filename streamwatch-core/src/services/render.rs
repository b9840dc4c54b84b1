// streamwatch-core/src/services/render.rs

use streamwatch_common::models::notification::{EmbedField, NotificationBody, NotificationEmbed};
use streamwatch_common::models::stream::{LiveInfo, ResolvedProfile};

const LIVE_COLOR: u32 = 0x9146FF;
const OFFLINE_COLOR: u32 = 0x747F8D;

/// Turns a status into a rendered notification body. The engine treats the
/// result as opaque; richer presentation layers plug in here.
pub trait NotificationRenderer: Send + Sync {
    fn render_live(&self, profile: &ResolvedProfile, live: &LiveInfo) -> NotificationBody;
    fn render_offline(&self, profile: &ResolvedProfile) -> NotificationBody;
}

/// Default embed renderer: purple live card with game and viewer fields,
/// grey offline card.
pub struct EmbedRenderer;

impl EmbedRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmbedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Helix thumbnail URLs carry `{width}x{height}` placeholders.
fn sized_thumbnail(url: &str) -> String {
    url.replace("{width}", "1280").replace("{height}", "720")
}

impl NotificationRenderer for EmbedRenderer {
    fn render_live(&self, profile: &ResolvedProfile, live: &LiveInfo) -> NotificationBody {
        let mut embed = NotificationEmbed {
            title: format!("{} is live on Twitch!", profile.display_name),
            url: Some(format!("https://twitch.tv/{}", profile.login)),
            description: Some(live.title.clone()),
            color: LIVE_COLOR,
            thumbnail_url: None,
            image_url: None,
            fields: vec![
                EmbedField::inline("Game", &live.game_name),
                EmbedField::inline("Viewers", live.viewer_count.to_string()),
            ],
        };
        if !profile.profile_image_url.is_empty() {
            embed.thumbnail_url = Some(profile.profile_image_url.clone());
        }
        if !live.thumbnail_url.is_empty() {
            embed.image_url = Some(sized_thumbnail(&live.thumbnail_url));
        }

        NotificationBody {
            content: None,
            embed: Some(embed),
        }
    }

    fn render_offline(&self, profile: &ResolvedProfile) -> NotificationBody {
        let mut embed = NotificationEmbed {
            title: format!("{} is offline", profile.display_name),
            url: Some(format!("https://twitch.tv/{}", profile.login)),
            description: Some("The stream has ended.".to_string()),
            color: OFFLINE_COLOR,
            thumbnail_url: None,
            image_url: None,
            fields: Vec::new(),
        };
        if !profile.offline_image_url.is_empty() {
            embed.image_url = Some(profile.offline_image_url.clone());
        }

        NotificationBody {
            content: None,
            embed: Some(embed),
        }
    }
}
