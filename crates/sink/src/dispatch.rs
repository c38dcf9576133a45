//! Shared routing + client state behind both adapters.

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use {
    logrelay_channels::{ChatClient, DEFAULT_SEND_TIMEOUT, Payload, deliver},
    logrelay_common::ChannelId,
    logrelay_config::RelayConfig,
    logrelay_routing::RoutingTable,
    tracing::{debug, trace},
};

use crate::{Error, Result};

/// Routing table, chat client handle, and send timeout.
///
/// The table is configured through `&mut self` before the dispatcher is
/// shared. The client can be set once at any time; until then every dispatch
/// is a no-op.
#[derive(Clone)]
pub struct Dispatcher {
    routes: RoutingTable,
    client: OnceLock<Arc<dyn ChatClient>>,
    send_timeout: Duration,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes)
            .field("client", &self.client.get().map(|c| c.name()))
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: RoutingTable::new(),
            client: OnceLock::new(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Routes and timeout from config. The client still has to be set.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let routes = RoutingTable::try_from_routes(&config.routes)?;
        Ok(Self::new()
            .with_routes(routes)
            .with_send_timeout(Duration::from_millis(config.discord.send_timeout_ms)))
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RoutingTable) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Install `client`, replacing any client this dispatcher (or the one it
    /// was cloned from) already had.
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = OnceLock::from(client);
        self
    }

    /// Set the chat client. Fails if one is already set.
    pub fn set_client(&self, client: Arc<dyn ChatClient>) -> Result<()> {
        self.client.set(client).map_err(|_| Error::ClientAlreadySet)
    }

    #[must_use]
    pub fn client(&self) -> Option<&Arc<dyn ChatClient>> {
        self.client.get()
    }

    #[must_use]
    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RoutingTable {
        &mut self.routes
    }

    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Whether a dispatch would do any work at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.get().is_some() && !self.routes.is_empty()
    }

    /// Client and resolved channels for `tag`, or `None` when unconfigured.
    ///
    /// No resolution is attempted when unconfigured.
    #[must_use]
    pub fn targets(&self, tag: &str) -> Option<(&dyn ChatClient, Vec<ChannelId>)> {
        if self.routes.is_empty() {
            return None;
        }
        let client = self.client.get()?;
        Some((client.as_ref(), self.routes.resolve(tag)))
    }

    /// Send `payload` to every channel routed for `tag`.
    ///
    /// Each channel gets one attempt regardless of failures elsewhere; the
    /// first failure is returned once all attempts are done.
    pub async fn dispatch(&self, tag: &str, payload: Payload<'_>) -> Result<()> {
        let Some((client, channels)) = self.targets(tag) else {
            trace!(tag, "relay not configured, skipping");
            return Ok(());
        };
        if channels.is_empty() {
            trace!(tag, "no route for tag");
            return Ok(());
        }

        let report = deliver(client, &channels, payload, self.send_timeout).await;
        debug!(
            tag,
            attempted = report.attempted,
            delivered = report.delivered(),
            "dispatched log entry"
        );
        report.into_result()?;
        Ok(())
    }
}
