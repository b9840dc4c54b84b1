// streamwatch-core/src/platforms/discord/mod.rs
//
// Discord delivery side of the notification engine: turns rendered
// notification bodies into channel messages, and surfaces "message is gone"
// distinctly from other delivery failures so the synchronizer can re-send.

use async_trait::async_trait;
use twilight_http::error::ErrorType;
use twilight_http::Client as HttpClient;
use twilight_model::channel::message::Embed;
use twilight_model::channel::Message;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_model::id::Id;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, ImageSource};

use streamwatch_common::models::notification::{NotificationBody, NotificationEmbed};
use streamwatch_common::models::subscription::{DeliveryTarget, MessageHandle};
use streamwatch_common::traits::messenger_traits::Messenger;
use streamwatch_common::Error;

pub struct DiscordMessenger {
    http: HttpClient,
}

impl DiscordMessenger {
    pub fn new(bot_token: String) -> Self {
        Self {
            http: HttpClient::new(bot_token),
        }
    }

    /// Reads `DISCORD_BOT_TOKEN` (via dotenv if a `.env` file is present).
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let token = std::env::var("DISCORD_BOT_TOKEN")
            .map_err(|_| Error::Auth("DISCORD_BOT_TOKEN is not set".to_string()))?;
        Ok(Self::new(token))
    }
}

fn parse_channel_id(channel: &str) -> Result<Id<ChannelMarker>, Error> {
    let raw: u64 = channel
        .parse()
        .map_err(|_| Error::Delivery(format!("Invalid channel ID: {channel}")))?;
    Ok(Id::new(raw))
}

fn parse_message_id(message: &str) -> Result<Id<MessageMarker>, Error> {
    let raw: u64 = message
        .parse()
        .map_err(|_| Error::Delivery(format!("Invalid message ID: {message}")))?;
    Ok(Id::new(raw))
}

/// Maps a twilight HTTP error, turning a 404 into `Error::MessageNotFound`.
fn map_api_error(e: twilight_http::Error) -> Error {
    if let ErrorType::Response { status, .. } = e.kind() {
        if status.get() == 404 {
            return Error::MessageNotFound;
        }
    }
    Error::Delivery(format!("Discord API error: {e}"))
}

fn build_embed(source: &NotificationEmbed) -> Embed {
    let mut builder = EmbedBuilder::new()
        .title(&source.title)
        .color(source.color);
    if let Some(url) = &source.url {
        builder = builder.url(url);
    }
    if let Some(description) = &source.description {
        builder = builder.description(description);
    }
    if let Some(thumbnail) = &source.thumbnail_url {
        if let Ok(source) = ImageSource::url(thumbnail) {
            builder = builder.thumbnail(source);
        }
    }
    if let Some(image) = &source.image_url {
        if let Ok(source) = ImageSource::url(image) {
            builder = builder.image(source);
        }
    }
    for field in &source.fields {
        let fb = EmbedFieldBuilder::new(&field.name, &field.value);
        let fb = if field.inline { fb.inline() } else { fb };
        builder = builder.field(fb);
    }
    builder.build()
}

fn build_content(body: &NotificationBody, mention: Option<&str>) -> Option<String> {
    let mention_str = mention.map(|role| format!("<@&{role}>"));
    match (&mention_str, &body.content) {
        (Some(m), Some(c)) => Some(format!("{m} {c}")),
        (Some(m), None) => Some(m.clone()),
        (None, Some(c)) => Some(c.clone()),
        (None, None) => None,
    }
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn send_message(
        &self,
        target: &DeliveryTarget,
        body: &NotificationBody,
        mention: Option<&str>,
    ) -> Result<MessageHandle, Error> {
        let channel_id = parse_channel_id(&target.channel_id)?;
        let embeds: Vec<Embed> = body.embed.iter().map(build_embed).collect();
        let content = build_content(body, mention);

        let mut req = self.http.create_message(channel_id).embeds(&embeds);
        if let Some(content) = &content {
            req = req.content(content);
        }

        let msg: Message = req
            .await
            .map_err(map_api_error)?
            .model()
            .await
            .map_err(|e| Error::Delivery(format!("Error parsing Discord message: {e}")))?;

        Ok(MessageHandle {
            channel_id: msg.channel_id.to_string(),
            message_id: msg.id.to_string(),
        })
    }

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        body: &NotificationBody,
    ) -> Result<(), Error> {
        let channel_id = parse_channel_id(&handle.channel_id)?;
        let message_id = parse_message_id(&handle.message_id)?;
        let embeds: Vec<Embed> = body.embed.iter().map(build_embed).collect();

        self.http
            .update_message(channel_id, message_id)
            .content(body.content.as_deref())
            .embeds(Some(&embeds))
            .await
            .map_err(map_api_error)?;
        Ok(())
    }

    async fn delete_message(&self, handle: &MessageHandle) -> Result<(), Error> {
        let channel_id = parse_channel_id(&handle.channel_id)?;
        let message_id = parse_message_id(&handle.message_id)?;

        self.http
            .delete_message(channel_id, message_id)
            .await
            .map_err(map_api_error)?;
        Ok(())
    }
}
