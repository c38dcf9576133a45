//! Discord binding for the chat-client traits, over serenity's REST client.
//!
//! Only the HTTP half of serenity is used: resolving a channel and posting to
//! it needs no gateway connection.

pub mod client;
pub mod embed;

pub use {
    client::{DiscordChannel, DiscordClient},
    embed::{limits, to_create_embed, truncate},
};
