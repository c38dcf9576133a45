use std::sync::Arc;

use {
    async_trait::async_trait,
    logrelay_channels::{Embed, Payload},
};

use crate::{
    Result,
    convert::{DisplayConverter, StringConverter},
    dispatch::Dispatcher,
    message::StructuredMessage,
    render::render_embed,
    template::{PlaceholderTemplate, TemplateProcessor},
};

/// Accepts a structured log entry and its tag.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn process(&self, message: &StructuredMessage, tag: &str) -> Result<()>;
}

/// Renders each entry into an embed and sends it to every channel routed for
/// its tag.
#[derive(Clone)]
pub struct ChatSink {
    dispatcher: Dispatcher,
    templates: Arc<dyn TemplateProcessor>,
    converter: Arc<dyn StringConverter>,
}

impl Default for ChatSink {
    fn default() -> Self {
        Self::new(Dispatcher::new())
    }
}

impl ChatSink {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            templates: Arc::new(PlaceholderTemplate::new()),
            converter: Arc::new(DisplayConverter),
        }
    }

    #[must_use]
    pub fn with_templates(mut self, templates: Arc<dyn TemplateProcessor>) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn StringConverter>) -> Self {
        self.converter = converter;
        self
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// The embed [`process`](MessageSink::process) would send.
    #[must_use]
    pub fn render(&self, message: &StructuredMessage) -> Embed {
        render_embed(message, self.templates.as_ref(), self.converter.as_ref())
    }
}

#[async_trait]
impl MessageSink for ChatSink {
    async fn process(&self, message: &StructuredMessage, tag: &str) -> Result<()> {
        if !self.dispatcher.is_configured() {
            return Ok(());
        }
        let embed = self.render(message);
        self.dispatcher.dispatch(tag, Payload::Embed(&embed)).await
    }
}
