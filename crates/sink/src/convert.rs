use serde_json::Value;

/// Turns a field or context value into display text.
pub trait StringConverter: Send + Sync {
    fn convert(&self, value: &Value) -> String;
}

/// Strings verbatim, scalars via `Display`, composites as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayConverter;

impl StringConverter for DisplayConverter {
    fn convert(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => value.to_string(),
        }
    }
}
