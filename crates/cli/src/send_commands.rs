//! `logrelay send`, `logrelay pipe`, and `logrelay routes`.

use std::sync::Arc;

use {
    anyhow::Result,
    clap::Args,
    logrelay_channels::{ChatClient, RecordingClient, Sent},
    logrelay_common::ChannelId,
    logrelay_config::RelayConfig,
    logrelay_sink::{
        ChatListener, ChatSink, Dispatcher, Listener, MessageSink, StructuredMessage,
    },
    serde_json::Value,
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::warn,
};

#[derive(Args)]
pub struct SendArgs {
    /// Routing tag. Empty hits only the wildcard route.
    #[arg(long, default_value = "")]
    pub tag: String,

    /// Send as an embed instead of plain text.
    #[arg(long)]
    pub structured: bool,

    /// Embed author (structured only).
    #[arg(long)]
    pub entry_name: Option<String>,

    /// Template value as `key=value`; repeatable. JSON literals keep their
    /// type, anything else is a string.
    #[arg(long = "field", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,

    /// Context value as `key=value`; repeatable.
    #[arg(long = "context", value_parser = parse_key_value)]
    pub context: Vec<(String, String)>,

    /// Message text, or the template in structured mode.
    pub message: String,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn build_message(args: &SendArgs) -> StructuredMessage {
    let mut message = StructuredMessage::new(args.message.clone());
    if let Some(name) = &args.entry_name {
        message = message.with_entry_name(name.clone());
    }
    for (key, value) in &args.fields {
        message = message.with_value(key.clone(), parse_value(value));
    }
    for (key, value) in &args.context {
        message = message.with_context(key.clone(), parse_value(value));
    }
    message
}

fn dispatcher(config: &RelayConfig, client: Arc<dyn ChatClient>, tag: &str) -> Result<Dispatcher> {
    let dispatcher = Dispatcher::from_config(config)?.with_client(client);
    if dispatcher.routes().resolve(tag).is_empty() {
        warn!(tag, "no route matches this tag; nothing will be sent");
    }
    Ok(dispatcher)
}

pub async fn handle_send(
    config: &RelayConfig,
    client: Arc<dyn ChatClient>,
    args: &SendArgs,
) -> Result<()> {
    let dispatcher = dispatcher(config, client, &args.tag)?;
    if args.structured {
        let sink = ChatSink::new(dispatcher);
        sink.process(&build_message(args), &args.tag).await?;
    } else {
        let listener = ChatListener::new(dispatcher);
        listener.write(&args.message, &args.tag).await?;
    }
    Ok(())
}

/// Forward stdin line by line. A failed line is logged and skipped.
pub async fn handle_pipe(config: &RelayConfig, client: Arc<dyn ChatClient>, tag: &str) -> Result<()> {
    let listener = ChatListener::new(dispatcher(config, client, tag)?);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut failed = 0usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Err(error) = listener.write(&line, tag).await {
            failed += 1;
            warn!(%error, "failed to forward line");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} line(s) could not be delivered");
    }
    Ok(())
}

pub fn handle_routes(config: &RelayConfig, tag: &str) -> Result<()> {
    let dispatcher = Dispatcher::from_config(config)?;
    let routes = dispatcher.routes();

    for route in routes.matching(tag) {
        let label = if route.is_wildcard() {
            "* (wildcard)"
        } else {
            route.tag.as_str()
        };
        println!("{label}: {}", join_ids(&route.channels));
    }
    println!("resolved: {}", join_ids(&routes.resolve(tag)));
    Ok(())
}

fn join_ids(ids: &[ChannelId]) -> String {
    if ids.is_empty() {
        return "(none)".into();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_recorded(recorder: &RecordingClient) -> Result<()> {
    for sent in recorder.sent() {
        match sent {
            Sent::Text { channel, text } => println!("[dry-run] {channel} text: {text}"),
            Sent::Embed { channel, embed } => {
                println!("[dry-run] {channel} embed: {}", serde_json::to_string_pretty(&embed)?);
            },
        }
    }
    Ok(())
}
