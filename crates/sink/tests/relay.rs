//! End-to-end: tracing events through the relay layer and worker to a
//! recording chat client.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use {
    logrelay_channels::{EmbedField, RecordingClient, Sent},
    logrelay_common::ChannelId,
    logrelay_config::{RelayConfig, RelayMode, RelaySettings, RouteConfig},
    logrelay_sink::{Error, build_relay},
    tracing_subscriber::{layer::SubscriberExt, registry},
};

fn config(mode: RelayMode, routes: &[(&str, &[u64])]) -> RelayConfig {
    RelayConfig {
        relay: RelaySettings {
            mode,
            ..RelaySettings::default()
        },
        routes: routes
            .iter()
            .map(|(tag, raw)| RouteConfig {
                tag: (*tag).into(),
                channels: raw.iter().copied().map(ChannelId::new).collect(),
            })
            .collect(),
        ..RelayConfig::default()
    }
}

/// Run `emit` with the relay installed as the thread's subscriber, then flush.
async fn relay(config: &RelayConfig, client: &RecordingClient, emit: impl FnOnce()) {
    let (layer, worker) = build_relay(config, Arc::new(client.clone())).unwrap();
    let handle = worker.spawn();
    {
        let _guard = tracing::subscriber::set_default(registry().with(layer));
        emit();
    }
    handle.shutdown().await.unwrap();
}

fn field(name: &str, value: &str) -> EmbedField {
    EmbedField {
        name: name.into(),
        value: value.into(),
        inline: true,
    }
}

#[tokio::test]
async fn structured_event_becomes_embed_on_every_route() {
    let client = RecordingClient::new();
    let config = config(RelayMode::Structured, &[("db", &[1]), ("", &[2])]);
    relay(&config, &client, || {
        let span = tracing::info_span!("checkout", env = "prod");
        let _entered = span.enter();
        tracing::error!(tag = "db", x = 5, "x={{x}}");
    })
    .await;

    for id in [1, 2] {
        let sent = client.sent_to(ChannelId::new(id));
        let [Sent::Embed { embed, .. }] = sent.as_slice() else {
            panic!("channel {id}: {sent:?}");
        };
        assert_eq!(embed.title, "x={x}");
        assert_eq!(embed.description, "x=5");
        assert_eq!(embed.author.as_deref(), Some("checkout"));
        assert_eq!(embed.fields, vec![
            field("x", "5"),
            field("[CONTEXT] env", "prod")
        ]);
    }
}

#[tokio::test]
async fn plain_mode_uses_level_as_tag_when_untagged() {
    let client = RecordingClient::new();
    let config = config(RelayMode::Plain, &[("warn", &[3]), ("error", &[4])]);
    relay(&config, &client, || {
        tracing::warn!(free_gb = 2, "disk low");
        tracing::info!("below threshold");
    })
    .await;

    assert_eq!(client.sent(), vec![Sent::Text {
        channel: ChannelId::new(3),
        text: "WARN relay: disk low free_gb=2".into(),
    }]);
}

#[tokio::test]
async fn both_mode_sends_text_and_embed() {
    let client = RecordingClient::new();
    let config = config(RelayMode::Both, &[("", &[9])]);
    relay(&config, &client, || tracing::error!("boom")).await;

    let sent = client.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|s| matches!(s, Sent::Text { .. })));
    assert!(sent.iter().any(|s| matches!(s, Sent::Embed { .. })));
}

#[tokio::test]
async fn duplicate_channel_ids_are_not_deduplicated() {
    let client = RecordingClient::new();
    let config = config(RelayMode::Plain, &[("error", &[5]), ("", &[5])]);
    relay(&config, &client, || tracing::error!("twice")).await;
    assert_eq!(client.sent_to(ChannelId::new(5)).len(), 2);
}

#[tokio::test]
async fn empty_table_sends_and_resolves_nothing() {
    let client = RecordingClient::new();
    let config = config(RelayMode::Both, &[]);
    relay(&config, &client, || tracing::error!("nobody listens")).await;
    assert!(client.sent().is_empty());
    assert_eq!(client.lookups(), 0);
}

#[tokio::test]
async fn one_failing_channel_does_not_block_the_others() {
    let client = RecordingClient::new();
    client.fail_channel(ChannelId::new(1));
    client.forget_channel(ChannelId::new(2));
    let config = config(RelayMode::Plain, &[("", &[1, 2, 3])]);
    relay(&config, &client, || tracing::error!("partial")).await;

    assert_eq!(client.lookups(), 3);
    assert_eq!(client.sent_to(ChannelId::new(3)).len(), 1);
    assert_eq!(client.sent().len(), 1);
}

#[test]
fn duplicate_route_tags_are_rejected() {
    let config = config(RelayMode::Plain, &[("db", &[1]), ("db", &[2])]);
    let result = build_relay(&config, Arc::new(RecordingClient::new()));
    assert!(matches!(result, Err(Error::Routing(_))));
}

#[test]
fn unknown_min_level_is_rejected() {
    let mut config = config(RelayMode::Plain, &[("", &[1])]);
    config.relay.min_level = "chatty".into();
    let result = build_relay(&config, Arc::new(RecordingClient::new()));
    assert!(matches!(result, Err(Error::InvalidLevel(_))));
}
