use std::{num::NonZeroU64, sync::Arc};

use {
    async_trait::async_trait,
    logrelay_channels::{ChatChannel, ChatClient, Embed, Error, Result},
    logrelay_common::ChannelId,
    logrelay_config::DiscordConfig,
    secrecy::ExposeSecret,
    serenity::{builder::CreateMessage, http::Http, model::id::ChannelId as DiscordChannelId},
    tracing::debug,
};

use crate::embed::{message_text, to_create_embed};

/// REST-only Discord client.
#[derive(Clone)]
pub struct DiscordClient {
    http: Arc<Http>,
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient").finish_non_exhaustive()
    }
}

impl DiscordClient {
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
        }
    }

    /// Client from the `[discord]` section. Fails when no token is set.
    pub fn from_config(config: &DiscordConfig) -> Result<Self> {
        if !config.has_token() {
            return Err(Error::unavailable("discord bot token is not configured"));
        }
        Ok(Self::new(config.token.expose_secret()))
    }

    #[must_use]
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}

/// Discord snowflakes are never zero, so id 0 names no channel.
fn discord_id(id: ChannelId) -> Result<DiscordChannelId> {
    NonZeroU64::new(id.get())
        .map(DiscordChannelId::from)
        .ok_or_else(|| Error::unknown_channel(id))
}

#[async_trait]
impl ChatClient for DiscordClient {
    fn name(&self) -> &str {
        "discord"
    }

    async fn get_channel(&self, id: ChannelId) -> Result<Arc<dyn ChatChannel>> {
        let discord_id = discord_id(id)?;
        self.http
            .get_channel(discord_id)
            .await
            .map_err(|e| Error::external(format!("resolve discord channel {id}"), e))?;
        debug!(channel = %id, "discord channel resolved");
        Ok(Arc::new(DiscordChannel {
            id,
            discord_id,
            http: Arc::clone(&self.http),
        }))
    }
}

/// A channel the bot resolved and can post to.
pub struct DiscordChannel {
    id: ChannelId,
    discord_id: DiscordChannelId,
    http: Arc<Http>,
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.discord_id
            .say(&*self.http, message_text(text))
            .await
            .map_err(|e| Error::external(format!("send text to discord channel {}", self.id), e))?;
        Ok(())
    }

    async fn send_embed(&self, embed: &Embed) -> Result<()> {
        let message = CreateMessage::new().embed(to_create_embed(embed));
        self.discord_id
            .send_message(&*self.http, message)
            .await
            .map_err(|e| Error::external(format!("send embed to discord channel {}", self.id), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use {
        logrelay_channels::{Payload, deliver},
        secrecy::Secret,
    };

    use super::*;

    #[test]
    fn zero_id_is_unknown() {
        assert!(matches!(
            discord_id(ChannelId::new(0)),
            Err(Error::UnknownChannel { channel }) if channel.get() == 0
        ));
        assert_eq!(discord_id(ChannelId::new(5)).unwrap().get(), 5);
    }

    #[tokio::test]
    async fn zero_id_fails_alone_in_fan_out() {
        let client = DiscordClient::new("x.y.z");
        let report = deliver(
            &client,
            &[ChannelId::new(0), ChannelId::new(5)],
            Payload::Text("hi"),
            Duration::from_millis(500),
        )
        .await;

        assert_eq!(report.attempted, 2);
        let failed: Vec<u64> = report.failures.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(failed, vec![0, 5]);
        assert!(matches!(report.failures[0].1, Error::UnknownChannel { .. }));
        // The bogus token or missing network fails id 5, but it was still tried.
        assert!(!matches!(report.failures[1].1, Error::UnknownChannel { .. }));
    }

    #[test]
    fn missing_token_is_unavailable() {
        let err = DiscordClient::from_config(&DiscordConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Unavailable { .. }));
    }

    #[test]
    fn token_builds_client() {
        let config = DiscordConfig {
            token: Secret::new("abc.def.ghi".to_string()),
            ..DiscordConfig::default()
        };
        let client = DiscordClient::from_config(&config).unwrap();
        assert_eq!(client.name(), "discord");
        assert_eq!(format!("{client:?}"), "DiscordClient { .. }");
    }
}
