//! Config schema: chat credentials, relay behavior, and the routing table.

use {
    logrelay_common::ChannelId,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub discord: DiscordConfig,
    pub relay: RelaySettings,
    /// Routing table in declaration order. A route with an empty tag is the
    /// wildcard and receives every entry.
    pub routes: Vec<RouteConfig>,
}

/// Credentials and limits for the Discord client.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Upper bound for resolving a channel and sending one message (ms).
    pub send_timeout_ms: u64,
}

impl DiscordConfig {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("send_timeout_ms", &self.send_timeout_ms)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            send_timeout_ms: 10_000,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Which adapter the tracing layer feeds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// One pre-rendered text line per entry.
    Plain,
    /// One rich embed per entry.
    #[default]
    Structured,
    /// Both a text line and an embed per entry.
    Both,
}

impl RelayMode {
    #[must_use]
    pub fn plain(self) -> bool {
        matches!(self, Self::Plain | Self::Both)
    }

    #[must_use]
    pub fn structured(self) -> bool {
        matches!(self, Self::Structured | Self::Both)
    }
}

/// How log events are captured and queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub mode: RelayMode,
    /// Least severe level forwarded (trace, debug, info, warn, error).
    pub min_level: String,
    /// Event field whose value becomes the routing tag.
    pub tag_field: String,
    /// Event field whose value becomes the embed author.
    pub entry_name_field: String,
    /// Entries buffered between the logging call site and the sender.
    pub queue_capacity: usize,
    /// Extra target prefixes never forwarded.
    pub ignore_targets: Vec<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            mode: RelayMode::default(),
            min_level: "warn".into(),
            tag_field: "tag".into(),
            entry_name_field: "entry_name".into(),
            queue_capacity: 1024,
            ignore_targets: Vec::new(),
        }
    }
}

/// One routing-table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Tag to match. Empty (or omitted) matches every tag.
    #[serde(default)]
    pub tag: String,
    pub channels: Vec<ChannelId>,
}
