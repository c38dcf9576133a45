//! Log-to-chat adapters.
//!
//! Two capability traits plug into a logging pipeline:
//! - [`Listener`] receives a pre-rendered line and a tag, and
//!   [`ChatListener`] sends the raw text to every routed channel.
//! - [`MessageSink`] receives a [`StructuredMessage`] and a tag, and
//!   [`ChatSink`] renders it into an [`Embed`](logrelay_channels::Embed)
//!   before sending.
//!
//! [`RelayLayer`] is the `tracing` integration: it turns events into either
//! shape and queues them for a [`RelayWorker`], so the logging call site
//! never waits on the network.

pub mod convert;
pub mod dispatch;
pub mod error;
pub mod layer;
pub mod listener;
pub mod message;
pub mod render;
pub mod sink;
pub mod template;
pub mod worker;

use std::sync::Arc;

use {
    logrelay_channels::ChatClient,
    logrelay_config::RelayConfig,
};

pub use {
    convert::{DisplayConverter, StringConverter},
    dispatch::Dispatcher,
    error::{Error, Result},
    layer::{LayerConfig, RelayEvent, RelayLayer, RelayQueue},
    listener::{ChatListener, Listener},
    message::{FieldKey, StructuredMessage},
    render::{CONTEXT_LABEL_PREFIX, render_embed},
    sink::{ChatSink, MessageSink},
    template::{PlaceholderTemplate, TemplateProcessor},
    worker::{RelayHandle, RelayWorker},
};

/// Wire a tracing layer and its delivery worker from config.
///
/// Install the layer on a subscriber and spawn the worker on a Tokio runtime;
/// the adapters the worker drives follow `relay.mode`.
pub fn build_relay(
    config: &RelayConfig,
    client: Arc<dyn ChatClient>,
) -> Result<(RelayLayer, RelayWorker)> {
    let dispatcher = Dispatcher::from_config(config)?.with_client(client);
    let (layer, queue) = RelayLayer::new(LayerConfig::from_settings(&config.relay)?);

    let mut worker = RelayWorker::new(queue);
    if config.relay.mode.plain() {
        worker = worker.with_listener(Arc::new(ChatListener::new(dispatcher.clone())));
    }
    if config.relay.mode.structured() {
        worker = worker.with_sink(Arc::new(ChatSink::new(dispatcher)));
    }
    Ok((layer, worker))
}
