use {
    chrono::{DateTime, Utc},
    serde::Serialize,
};

/// Platform-neutral rich message: the display object a structured log entry
/// renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub fields: Vec<EmbedField>,
}

/// Labelled value shown under the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    /// Compact layout: rendered side by side with neighbouring inline fields.
    pub inline: bool,
}

impl Embed {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            author: None,
            timestamp,
            title: title.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> &mut Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order() {
        let mut embed = Embed::new("t", "d", DateTime::<Utc>::UNIX_EPOCH);
        embed.add_field("b", "2", true).add_field("a", "1", false);
        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(embed.fields[0].inline);
        assert!(!embed.fields[1].inline);
    }

    #[test]
    fn serializes_without_missing_author() {
        let embed = Embed::new("t", "d", DateTime::<Utc>::UNIX_EPOCH);
        let json = serde_json::to_value(&embed).unwrap();
        assert!(json.get("author").is_none());
        let json = serde_json::to_value(embed.with_author("svc")).unwrap();
        assert_eq!(json["author"], "svc");
    }
}
