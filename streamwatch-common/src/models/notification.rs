/// Rendered notification payload, opaque to the engine. The presentation
/// layer builds one of these; the messenger turns it into whatever the
/// delivery platform wants (for Discord, content plus an embed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationBody {
    pub content: Option<String>,
    pub embed: Option<NotificationEmbed>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationEmbed {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: u32,
    pub thumbnail_url: Option<String>,
    pub image_url: Option<String>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }
}
