use std::sync::Arc;

use {async_trait::async_trait, logrelay_common::ChannelId};

use crate::{Embed, Result};

/// Handle to a chat platform from which channels are resolved.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Platform name (e.g. "discord"), used in logs.
    fn name(&self) -> &str;

    /// Resolve a channel by id. May hit the network.
    async fn get_channel(&self, id: ChannelId) -> Result<Arc<dyn ChatChannel>>;
}

/// A resolved destination channel.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    fn id(&self) -> ChannelId;

    /// Send a plain text message.
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send a rich embedded message.
    async fn send_embed(&self, embed: &Embed) -> Result<()>;
}
