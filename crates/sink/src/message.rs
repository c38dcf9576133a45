use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    serde_json::Value,
};

/// Identifying key of a template field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldKey {
    pub id: String,
}

impl FieldKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<String> for FieldKey {
    fn from(id: String) -> Self {
        Self { id }
    }
}

impl From<&str> for FieldKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// A log record carrying a template, its field values, and ambient context.
///
/// Values and context are ordered; rendering preserves that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub template: String,
    pub values: Vec<(FieldKey, Value)>,
    pub context: Vec<(String, Value)>,
}

impl StructuredMessage {
    /// New message stamped with the current time.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            entry_name: None,
            created_at: Utc::now(),
            template: template.into(),
            values: Vec::new(),
            context: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((FieldKey::new(key), value.into()));
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// First field value whose key id is `id`.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| key.id == id)
            .map(|(_, value)| value)
    }
}
