use std::{error::Error as StdError, time::Duration};

use logrelay_common::ChannelId;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared by every chat-platform binding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform does not know this channel, or the bot cannot see it.
    #[error("unknown channel: {channel}")]
    UnknownChannel { channel: ChannelId },

    /// Operation is currently unavailable (not configured/ready).
    #[error("channel operation unavailable: {message}")]
    Unavailable { message: String },

    /// Resolving the channel and sending did not finish in time.
    #[error("send to channel {channel} timed out after {timeout:?}")]
    Timeout {
        channel: ChannelId,
        timeout: Duration,
    },

    /// Wrapped source error from the platform client.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_channel(channel: ChannelId) -> Self {
        Self::UnknownChannel { channel }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
