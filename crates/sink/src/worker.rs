//! Delivery side of the relay: drains the layer's queue and awaits the
//! adapters, one event at a time.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use {
    tokio::{sync::Notify, task::JoinHandle},
    tracing::{debug, warn},
};

use crate::{
    Result,
    layer::{RelayEvent, RelayQueue},
    listener::Listener,
    sink::MessageSink,
};

/// Owns a [`RelayQueue`] and the adapters its events go to.
///
/// Plain events go to the listener, structured events to the sink. An event
/// with no matching adapter is discarded.
pub struct RelayWorker {
    queue: RelayQueue,
    listener: Option<Arc<dyn Listener>>,
    sink: Option<Arc<dyn MessageSink>>,
    shutdown: Arc<Notify>,
}

impl RelayWorker {
    #[must_use]
    pub fn new(queue: RelayQueue) -> Self {
        Self {
            queue,
            listener: None,
            sink: None,
            shutdown: Arc::new(Notify::new()),
        }
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.listener = Some(listener);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Process events until every sender is gone or shutdown is requested.
    ///
    /// On shutdown the queue is closed and whatever was already queued is
    /// still delivered.
    pub async fn run(self) {
        let Self {
            mut queue,
            listener,
            sink,
            shutdown,
        } = self;
        let listener = listener.as_deref();
        let sink = sink.as_deref();

        loop {
            let stopping = tokio::select! {
                event = queue.rx.recv() => match event {
                    Some(event) => {
                        handle(listener, sink, event).await;
                        false
                    },
                    None => break,
                },
                () = shutdown.notified() => true,
            };
            if stopping {
                queue.rx.close();
                while let Some(event) = queue.rx.recv().await {
                    handle(listener, sink, event).await;
                }
                break;
            }
        }

        let dropped = queue.dropped.load(Ordering::Relaxed);
        debug!(dropped, "log relay worker stopped");
    }

    /// Spawn [`run`](Self::run) on the current Tokio runtime.
    #[must_use]
    pub fn spawn(self) -> RelayHandle {
        let shutdown = Arc::clone(&self.shutdown);
        let dropped = Arc::clone(&self.queue.dropped);
        let join = tokio::spawn(self.run());
        RelayHandle {
            shutdown,
            join,
            dropped,
        }
    }
}

async fn handle(
    listener: Option<&dyn Listener>,
    sink: Option<&dyn MessageSink>,
    event: RelayEvent,
) {
    let result = match (&event, listener, sink) {
        (RelayEvent::Plain { line, tag }, Some(listener), _) => listener.write(line, tag).await,
        (RelayEvent::Structured { message, tag }, _, Some(sink)) => {
            sink.process(message, tag).await
        },
        _ => return,
    };
    if let Err(error) = result {
        warn!(tag = event.tag(), %error, "log relay delivery failed");
    }
}

/// Handle to a spawned [`RelayWorker`].
#[derive(Debug)]
pub struct RelayHandle {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
    dropped: Arc<AtomicU64>,
}

impl RelayHandle {
    /// Events the layer discarded because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting events, flush the queue, and wait for the worker.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.notify_one();
        self.join.await?;
        Ok(())
    }
}
