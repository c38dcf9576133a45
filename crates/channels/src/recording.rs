//! In-memory [`ChatClient`] that records every send.
//!
//! Backs `--dry-run` in the CLI and the adapter tests. Individual channel ids
//! can be made unknown, failing, or stalled to exercise failure isolation.

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use {async_trait::async_trait, logrelay_common::ChannelId};

use crate::{ChatChannel, ChatClient, Embed, Error, Result};

/// One recorded send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { channel: ChannelId, text: String },
    Embed { channel: ChannelId, embed: Embed },
}

impl Sent {
    #[must_use]
    pub fn channel(&self) -> ChannelId {
        match self {
            Self::Text { channel, .. } | Self::Embed { channel, .. } => *channel,
        }
    }
}

#[derive(Default)]
struct Inner {
    sent: Mutex<Vec<Sent>>,
    unknown: Mutex<HashSet<ChannelId>>,
    failing: Mutex<HashSet<ChannelId>>,
    stalled: Mutex<HashSet<ChannelId>>,
    lookups: AtomicUsize,
}

impl Inner {
    fn contains(set: &Mutex<HashSet<ChannelId>>, id: ChannelId) -> bool {
        set.lock().unwrap_or_else(|e| e.into_inner()).contains(&id)
    }

    fn insert(set: &Mutex<HashSet<ChannelId>>, id: ChannelId) {
        set.lock().unwrap_or_else(|e| e.into_inner()).insert(id);
    }

    async fn record(&self, sent: Sent) -> Result<()> {
        let id = sent.channel();
        if Self::contains(&self.stalled, id) {
            std::future::pending::<()>().await;
        }
        if Self::contains(&self.failing, id) {
            return Err(Error::external(
                format!("send to {id}"),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "missing access"),
            ));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sent);
        Ok(())
    }
}

/// Cloneable handle; clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingClient {
    inner: Arc<Inner>,
}

impl RecordingClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make lookups of `id` fail as if the channel did not exist.
    pub fn forget_channel(&self, id: ChannelId) {
        Inner::insert(&self.inner.unknown, id);
    }

    /// Make sends to `id` fail after a successful lookup.
    pub fn fail_channel(&self, id: ChannelId) {
        Inner::insert(&self.inner.failing, id);
    }

    /// Make sends to `id` never complete.
    pub fn stall_channel(&self, id: ChannelId) {
        Inner::insert(&self.inner.stalled, id);
    }

    /// Snapshot of all successful sends, in completion order.
    #[must_use]
    pub fn sent(&self) -> Vec<Sent> {
        self.inner
            .sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    #[must_use]
    pub fn sent_to(&self, id: ChannelId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.channel() == id)
            .collect()
    }

    /// Number of `get_channel` calls made so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.inner.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    fn name(&self) -> &str {
        "recording"
    }

    async fn get_channel(&self, id: ChannelId) -> Result<Arc<dyn ChatChannel>> {
        self.inner.lookups.fetch_add(1, Ordering::Relaxed);
        if Inner::contains(&self.inner.unknown, id) {
            return Err(Error::unknown_channel(id));
        }
        Ok(Arc::new(RecordingChannel {
            id,
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct RecordingChannel {
    id: ChannelId,
    inner: Arc<Inner>,
}

#[async_trait]
impl ChatChannel for RecordingChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.inner
            .record(Sent::Text {
                channel: self.id,
                text: text.to_string(),
            })
            .await
    }

    async fn send_embed(&self, embed: &Embed) -> Result<()> {
        self.inner
            .record(Sent::Embed {
                channel: self.id,
                embed: embed.clone(),
            })
            .await
    }
}
