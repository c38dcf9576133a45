use std::sync::Arc;

use {async_trait::async_trait, logrelay_channels::Payload};

use crate::{Result, dispatch::Dispatcher};

/// Accepts a pre-rendered log line and its tag.
#[async_trait]
pub trait Listener: Send + Sync {
    async fn write(&self, value: &str, tag: &str) -> Result<()>;
}

/// Sends each line as a plain chat message to every channel routed for its
/// tag.
#[derive(Debug, Clone, Default)]
pub struct ChatListener {
    dispatcher: Dispatcher,
}

impl ChatListener {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<dyn Listener> {
        Arc::new(self)
    }
}

#[async_trait]
impl Listener for ChatListener {
    async fn write(&self, value: &str, tag: &str) -> Result<()> {
        self.dispatcher.dispatch(tag, Payload::Text(value)).await
    }
}

#[cfg(test)]
mod tests {
    use {
        logrelay_channels::{RecordingClient, Sent},
        logrelay_common::ChannelId,
    };

    use super::*;

    fn ids(raw: &[u64]) -> Vec<ChannelId> {
        raw.iter().copied().map(ChannelId::new).collect()
    }

    fn listener(client: &RecordingClient, routes: &[(&str, &[u64])]) -> ChatListener {
        let mut dispatcher = Dispatcher::new().with_client(Arc::new(client.clone()));
        for (tag, raw) in routes {
            dispatcher.routes_mut().insert(*tag, ids(raw));
        }
        ChatListener::new(dispatcher)
    }

    fn texts(client: &RecordingClient) -> Vec<(u64, String)> {
        let mut sent: Vec<(u64, String)> = client
            .sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { channel, text } => Some((channel.get(), text)),
                Sent::Embed { .. } => None,
            })
            .collect();
        sent.sort();
        sent
    }

    #[tokio::test]
    async fn no_client_means_no_sends() {
        let client = RecordingClient::new();
        let mut listener = ChatListener::default();
        listener.dispatcher_mut().routes_mut().insert("", ids(&[1]));

        listener.write("early", "err").await.unwrap();
        assert_eq!(client.lookups(), 0);
        assert!(client.sent().is_empty());

        listener
            .dispatcher()
            .set_client(Arc::new(client.clone()))
            .unwrap();
        listener.write("late", "err").await.unwrap();
        assert_eq!(texts(&client), vec![(1, "late".to_string())]);
    }

    #[tokio::test]
    async fn empty_table_skips_resolution() {
        let client = RecordingClient::new();
        let listener = listener(&client, &[]);
        listener.write("hello", "err").await.unwrap();
        assert_eq!(client.lookups(), 0);
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn exact_and_wildcard_both_receive() {
        let client = RecordingClient::new();
        let listener = listener(&client, &[("err", &[1]), ("", &[2])]);
        listener.write("boom", "err").await.unwrap();
        listener.write("fyi", "info").await.unwrap();
        assert_eq!(texts(&client), vec![
            (1, "boom".to_string()),
            (2, "boom".to_string()),
            (2, "fyi".to_string()),
        ]);
    }

    #[tokio::test]
    async fn duplicate_ids_send_twice() {
        let client = RecordingClient::new();
        let listener = listener(&client, &[("err", &[7]), ("", &[7])]);
        listener.write("dup", "err").await.unwrap();
        assert_eq!(client.sent_to(ChannelId::new(7)).len(), 2);
    }

    #[tokio::test]
    async fn bad_channel_does_not_stop_the_rest() {
        let client = RecordingClient::new();
        client.forget_channel(ChannelId::new(1));
        let listener = listener(&client, &[("err", &[1, 2]), ("", &[3])]);

        let err = listener.write("boom", "err").await.unwrap_err();
        assert!(err.to_string().contains("unknown channel: 1"));
        assert_eq!(texts(&client), vec![
            (2, "boom".to_string()),
            (3, "boom".to_string())
        ]);
    }
}
