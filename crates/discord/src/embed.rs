use {
    logrelay_channels::Embed,
    serenity::{
        builder::{CreateEmbed, CreateEmbedAuthor},
        model::Timestamp,
    },
};

/// Discord message and embed size limits, in characters.
pub mod limits {
    pub const MESSAGE: usize = 2000;
    pub const TITLE: usize = 256;
    pub const DESCRIPTION: usize = 4096;
    pub const AUTHOR: usize = 256;
    pub const FIELDS: usize = 25;
    pub const FIELD_NAME: usize = 256;
    pub const FIELD_VALUE: usize = 1024;
    /// Title, description, author, and every field name and value combined.
    pub const TOTAL: usize = 6000;
}

/// Discord rejects empty field names/values and empty messages.
const BLANK: &str = "\u{200b}";

/// Cut `text` to at most `max` characters, ending in an ellipsis when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some(_) if max == 0 => String::new(),
        Some(_) => {
            let mut out: String = text.chars().take(max - 1).collect();
            out.push('…');
            out
        },
    }
}

fn non_blank(text: &str, max: usize) -> String {
    if text.is_empty() {
        BLANK.to_string()
    } else {
        truncate(text, max)
    }
}

/// Characters left of the whole-embed allowance.
struct Budget(usize);

impl Budget {
    fn take(&mut self, text: String) -> String {
        self.0 = self.0.saturating_sub(text.chars().count());
        text
    }
}

pub(crate) fn message_text(text: &str) -> String {
    non_blank(text, limits::MESSAGE)
}

/// Build serenity's embed from a platform-neutral one, clipping to Discord's
/// limits.
///
/// Title, author, and description always fit the total allowance. Fields are
/// then added in order while allowance remains; the last one may be cut
/// short and the rest are dropped, as are fields past the 25th.
#[must_use]
pub fn to_create_embed(embed: &Embed) -> CreateEmbed {
    let mut budget = Budget(limits::TOTAL);
    let mut out = CreateEmbed::new()
        .title(budget.take(truncate(&embed.title, limits::TITLE)))
        .description(budget.take(truncate(&embed.description, limits::DESCRIPTION)));

    if let Some(author) = &embed.author {
        let name = budget.take(truncate(author, limits::AUTHOR));
        out = out.author(CreateEmbedAuthor::new(name));
    }
    if let Ok(timestamp) = Timestamp::from_unix_timestamp(embed.timestamp.timestamp()) {
        out = out.timestamp(timestamp);
    }

    let mut fields = Vec::new();
    for field in embed.fields.iter().take(limits::FIELDS) {
        // A field needs at least one character each for name and value.
        if budget.0 < 2 {
            break;
        }
        let name_max = limits::FIELD_NAME.min(budget.0 - 1);
        let name = budget.take(non_blank(&field.name, name_max));
        let value_max = limits::FIELD_VALUE.min(budget.0);
        let value = budget.take(non_blank(&field.value, value_max));
        fields.push((name, value, field.inline));
    }
    out.fields(fields)
}
