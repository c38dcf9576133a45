//! `tracing` integration.
//!
//! [`RelayLayer`] is a `tracing_subscriber::Layer` that turns qualifying
//! events into [`RelayEvent`]s and pushes them onto a bounded queue without
//! waiting. The [`RelayQueue`] end is drained by a
//! [`RelayWorker`](crate::RelayWorker), which owns the actual chat delivery.

use std::{
    fmt::Write as _,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use {
    logrelay_config::{RelayMode, RelaySettings},
    serde_json::Value,
    tokio::sync::mpsc,
    tracing::{
        Level,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    },
    tracing_subscriber::{Layer, layer::Context, registry::LookupSpan},
};

use crate::{
    Error, Result,
    convert::{DisplayConverter, StringConverter},
    message::StructuredMessage,
};

/// Target prefixes never relayed. Sending a chat message logs through these
/// crates, so relaying them would feed back into the queue.
pub const ALWAYS_IGNORED: &[&str] = &[
    "logrelay",
    "serenity",
    "reqwest",
    "hyper",
    "h2",
    "rustls",
    "tokio_tungstenite",
    "tungstenite",
];

// ── LayerConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LayerConfig {
    pub mode: RelayMode,
    /// Least severe level that is relayed.
    pub min_level: Level,
    /// Event field whose value becomes the tag. Empty disables the lookup.
    pub tag_field: String,
    /// Event field whose value becomes the structured entry name.
    pub entry_name_field: String,
    /// Extra target prefixes to skip, on top of [`ALWAYS_IGNORED`].
    pub ignore_targets: Vec<String>,
    pub queue_capacity: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            mode: RelayMode::default(),
            min_level: Level::WARN,
            tag_field: "tag".into(),
            entry_name_field: "entry_name".into(),
            ignore_targets: Vec::new(),
            queue_capacity: 1024,
        }
    }
}

impl LayerConfig {
    pub fn from_settings(settings: &RelaySettings) -> Result<Self> {
        let min_level = settings
            .min_level
            .trim()
            .parse::<Level>()
            .map_err(|_| Error::InvalidLevel(settings.min_level.clone()))?;
        Ok(Self {
            mode: settings.mode,
            min_level,
            tag_field: settings.tag_field.clone(),
            entry_name_field: settings.entry_name_field.clone(),
            ignore_targets: settings.ignore_targets.clone(),
            queue_capacity: settings.queue_capacity.max(1),
        })
    }

    fn is_ignored(&self, target: &str) -> bool {
        ALWAYS_IGNORED
            .iter()
            .copied()
            .chain(self.ignore_targets.iter().map(String::as_str))
            .filter(|prefix| !prefix.is_empty())
            .any(|prefix| {
                target.strip_prefix(prefix).is_some_and(|rest| {
                    rest.is_empty() || rest.starts_with("::") || rest.starts_with('_')
                })
            })
    }
}

// ── RelayEvent ──────────────────────────────────────────────────────────────

/// One queued unit of delivery work.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Plain { line: String, tag: String },
    Structured {
        message: StructuredMessage,
        tag: String,
    },
}

impl RelayEvent {
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Plain { tag, .. } | Self::Structured { tag, .. } => tag,
        }
    }
}

// ── Field capture ───────────────────────────────────────────────────────────

/// Collects the `message` field and every other field in recording order.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, Value)>,
}

impl FieldVisitor {
    fn put(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    fn take(&mut self, name: &str) -> Option<Value> {
        if name.is_empty() {
            return None;
        }
        let index = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(index).1)
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.put(field.name(), Value::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.into();
        } else {
            self.put(field.name(), Value::String(value.into()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field.name(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field.name(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field.name(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field.name(), Value::Bool(value));
    }
}

/// Span fields stashed in the span's extensions.
struct SpanFields(Vec<(String, Value)>);

// ── RelayLayer ──────────────────────────────────────────────────────────────

/// Receiving end of a [`RelayLayer`]'s queue.
#[derive(Debug)]
pub struct RelayQueue {
    pub(crate) rx: mpsc::Receiver<RelayEvent>,
    pub(crate) dropped: Arc<AtomicU64>,
}

impl RelayQueue {
    /// Next queued event, if one is ready.
    pub fn try_recv(&mut self) -> Option<RelayEvent> {
        self.rx.try_recv().ok()
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct RelayLayer {
    tx: mpsc::Sender<RelayEvent>,
    config: Arc<LayerConfig>,
    dropped: Arc<AtomicU64>,
}

impl RelayLayer {
    #[must_use]
    pub fn new(config: LayerConfig) -> (Self, RelayQueue) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        let layer = Self {
            tx,
            config: Arc::new(config),
            dropped: Arc::clone(&dropped),
        };
        (layer, RelayQueue { rx, dropped })
    }

    /// Events discarded because the queue was full or closed.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn enqueue(&self, event: RelayEvent) {
        if self.tx.try_send(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn tag_for(&self, fields: &mut FieldVisitor, level: Level) -> String {
        fields
            .take(&self.config.tag_field)
            .map(|v| DisplayConverter.convert(&v))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| level.as_str().to_ascii_lowercase())
    }
}

/// `"LEVEL target: message k=v ..."`
fn plain_line(level: Level, target: &str, visitor: &FieldVisitor) -> String {
    let mut line = format!("{level} {target}: {}", visitor.message);
    for (key, value) in &visitor.fields {
        let _ = write!(line, " {key}={}", DisplayConverter.convert(value));
    }
    line
}

impl<S> Layer<S> for RelayLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            let mut visitor = FieldVisitor {
                message: String::new(),
                fields: std::mem::take(fields),
            };
            values.record(&mut visitor);
            *fields = visitor.fields;
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = *meta.level();
        if level > self.config.min_level || self.config.is_ignored(meta.target()) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let tag = self.tag_for(&mut visitor, level);
        let entry_name = visitor
            .take(&self.config.entry_name_field)
            .map(|v| DisplayConverter.convert(&v));

        if self.config.mode.plain() {
            self.enqueue(RelayEvent::Plain {
                line: plain_line(level, meta.target(), &visitor),
                tag: tag.clone(),
            });
        }

        if self.config.mode.structured() {
            let spans: Vec<_> = ctx
                .event_scope(event)
                .map(|scope| scope.from_root().collect())
                .unwrap_or_default();

            let mut message = StructuredMessage::new(visitor.message);
            message.entry_name =
                entry_name.or_else(|| spans.last().map(|span| span.name().to_string()));
            message.values = visitor
                .fields
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect();
            for span in &spans {
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    message.context.extend(fields.iter().cloned());
                }
            }

            self.enqueue(RelayEvent::Structured { message, tag });
        }
    }
}
