use crate::{
    convert::{DisplayConverter, StringConverter},
    message::StructuredMessage,
};

/// Renders a message's template with its field values substituted.
pub trait TemplateProcessor: Send + Sync {
    fn render(&self, message: &StructuredMessage) -> String;
}

/// `{name}` placeholders replaced by the converted value of field `name`.
///
/// `{{` and `}}` produce literal braces. A placeholder naming no field, and
/// an unterminated `{`, are kept verbatim.
#[derive(Debug, Clone)]
pub struct PlaceholderTemplate<C = DisplayConverter> {
    converter: C,
}

impl PlaceholderTemplate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            converter: DisplayConverter,
        }
    }
}

impl Default for PlaceholderTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: StringConverter> PlaceholderTemplate<C> {
    pub fn with_converter(converter: C) -> Self {
        Self { converter }
    }
}

impl<C: StringConverter> TemplateProcessor for PlaceholderTemplate<C> {
    fn render(&self, message: &StructuredMessage) -> String {
        let mut out = String::with_capacity(message.template.len());
        let mut rest = message.template.as_str();

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if let Some(after) = tail.strip_prefix("{{") {
                out.push('{');
                rest = after;
            } else if let Some(after) = tail.strip_prefix("}}") {
                out.push('}');
                rest = after;
            } else if let Some(after) = tail.strip_prefix('}') {
                out.push('}');
                rest = after;
            } else {
                let body = &tail[1..];
                match body.find(['{', '}']) {
                    Some(end) if body[end..].starts_with('}') => {
                        let name = &body[..end];
                        match message.value(name) {
                            Some(value) => out.push_str(&self.converter.convert(value)),
                            None => out.push_str(&tail[..end + 2]),
                        }
                        rest = &body[end + 1..];
                    },
                    _ => {
                        out.push('{');
                        rest = body;
                    },
                }
            }
        }

        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn message(template: &str) -> StructuredMessage {
        StructuredMessage::new(template)
            .with_value("user", "ada")
            .with_value("count", 3)
            .with_value("ok", false)
    }

    #[rstest]
    #[case("login by {user}", "login by ada")]
    #[case("{count} retries, ok={ok}", "3 retries, ok=false")]
    #[case("{user}{user}", "adaada")]
    #[case("no placeholders", "no placeholders")]
    #[case("{missing} stays", "{missing} stays")]
    #[case("{{user}} is literal", "{user} is literal")]
    #[case("open { brace", "open { brace")]
    #[case("unterminated {user", "unterminated {user")]
    #[case("nested {{{user}}}", "nested {ada}")]
    #[case("stray } brace", "stray } brace")]
    #[case("{}", "{}")]
    #[case("{a{user}", "{aada")]
    fn renders(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(PlaceholderTemplate::new().render(&message(template)), expected);
    }

    #[test]
    fn first_value_wins_for_repeated_keys() {
        let msg = StructuredMessage::new("{k}")
            .with_value("k", "first")
            .with_value("k", "second");
        assert_eq!(PlaceholderTemplate::new().render(&msg), "first");
    }

    #[test]
    fn custom_converter() {
        struct Upper;
        impl StringConverter for Upper {
            fn convert(&self, value: &serde_json::Value) -> String {
                DisplayConverter.convert(value).to_uppercase()
            }
        }
        let rendered = PlaceholderTemplate::with_converter(Upper).render(&message("hi {user}"));
        assert_eq!(rendered, "hi ADA");
    }
}
