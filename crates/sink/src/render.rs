//! Structured message → embed.

use logrelay_channels::Embed;

use crate::{convert::StringConverter, message::StructuredMessage, template::TemplateProcessor};

/// Label prefix for fields that come from the message's context values.
pub const CONTEXT_LABEL_PREFIX: &str = "[CONTEXT] ";

/// Build the display object for `message`.
///
/// Pure and total: the same message always renders to the same embed.
/// Field values come first, then context values, each in message order and
/// each marked inline.
pub fn render_embed(
    message: &StructuredMessage,
    templates: &dyn TemplateProcessor,
    converter: &dyn StringConverter,
) -> Embed {
    let mut embed = Embed::new(
        message.template.clone(),
        templates.render(message),
        message.created_at,
    );

    if let Some(name) = message
        .entry_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
    {
        embed = embed.with_author(name);
    }

    for (key, value) in &message.values {
        embed.add_field(key.id.clone(), converter.convert(value), true);
    }
    for (key, value) in &message.context {
        embed.add_field(
            format!("{CONTEXT_LABEL_PREFIX}{key}"),
            converter.convert(value),
            true,
        );
    }

    embed
}
