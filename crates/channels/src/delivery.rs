//! Fan-out of one payload to many channels.
//!
//! Every channel gets exactly one attempt. Attempts run concurrently and each
//! is bounded by a timeout, so one unreachable channel can neither abort nor
//! stall the others.

use std::time::Duration;

use {
    futures::future::join_all,
    logrelay_common::ChannelId,
    tracing::{debug, trace},
};

use crate::{ChatClient, Embed, Error, Result};

/// Default bound on resolving a channel and sending one message.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// What to send.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Embed(&'a Embed),
}

impl Payload<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Embed(_) => "embed",
        }
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Number of send attempts, one per resolved channel id.
    pub attempted: usize,
    /// Failed attempts in resolution order.
    pub failures: Vec<(ChannelId, Error)>,
}

impl DeliveryReport {
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.attempted - self.failures.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Surface the first failure, if any, after all attempts have been made.
    pub fn into_result(self) -> Result<usize> {
        let delivered = self.delivered();
        match self.failures.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(delivered),
        }
    }
}

/// Send `payload` once to every id in `channels`, in any order.
pub async fn deliver(
    client: &dyn ChatClient,
    channels: &[ChannelId],
    payload: Payload<'_>,
    timeout: Duration,
) -> DeliveryReport {
    let attempts = channels.iter().map(|&channel| async move {
        let outcome = tokio::time::timeout(timeout, send_one(client, channel, payload))
            .await
            .unwrap_or_else(|_| Err(Error::Timeout { channel, timeout }));
        (channel, outcome)
    });

    let mut report = DeliveryReport {
        attempted: channels.len(),
        failures: Vec::new(),
    };
    for (channel, outcome) in join_all(attempts).await {
        match outcome {
            Ok(()) => trace!(%channel, kind = payload.kind(), "delivered"),
            Err(e) => report.failures.push((channel, e)),
        }
    }

    debug!(
        client = client.name(),
        kind = payload.kind(),
        attempted = report.attempted,
        failed = report.failures.len(),
        "fan-out finished"
    );
    report
}

async fn send_one(client: &dyn ChatClient, id: ChannelId, payload: Payload<'_>) -> Result<()> {
    let channel = client.get_channel(id).await?;
    match payload {
        Payload::Text(text) => channel.send_text(text).await,
        Payload::Embed(embed) => channel.send_embed(embed).await,
    }
}
