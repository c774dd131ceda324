//! Transport independent description of the embeds the bot replies with.

use poise::serenity_prelude as serenity;

pub const DEFAULT_COLOUR: u32 = 0x404040;
pub const ERROR_COLOUR: u32 = 0xFF0000;
pub const SUCCESS_COLOUR: u32 = 0x02F513;

/// Field name that renders as blank.
pub const BLANK: &str = "\u{1CBC}";

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedView {
    pub title: String,
    pub description: Option<String>,
    pub colour: u32,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            colour: DEFAULT_COLOUR,
            thumbnail: None,
            image: None,
            fields: Vec::new(),
        }
    }

    /// Untitled red embed.
    pub fn error(description: impl Into<String>) -> Self {
        Self::new("").description(description).colour(ERROR_COLOUR)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn colour(mut self, colour: u32) -> Self {
        self.colour = colour;
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field { name: name.into(), value: value.into(), inline });
        self
    }
}

impl From<EmbedView> for serenity::CreateEmbed {
    fn from(view: EmbedView) -> Self {
        let mut embed = serenity::CreateEmbed::new()
            .colour(view.colour)
            .fields(view.fields.into_iter().map(|f| (f.name, f.value, f.inline)));

        if !view.title.is_empty() {
            embed = embed.title(view.title);
        }
        if let Some(description) = view.description {
            embed = embed.description(description);
        }
        if let Some(thumbnail) = view.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }
        if let Some(image) = view.image {
            embed = embed.image(image);
        }

        embed
    }
}

impl From<EmbedView> for poise::CreateReply {
    fn from(view: EmbedView) -> Self {
        poise::CreateReply::default().embed(view.into())
    }
}
