use serde_json::Value;

use crate::config::ResolutionMode;
use crate::error::{FillError, Result};
use crate::store::Suggestion;

/// Extract suggestions from a response body.
///
/// Label-only fields read `data[].name`; label/value fields read
/// `data.values[]`, taking `name` as the label and the configured
/// identifier property as the value. A missing `data` member yields no
/// suggestions and entries without a string `name` are skipped.
pub fn decode_suggestions(mode: &ResolutionMode, body: &Value) -> Result<Vec<Suggestion>> {
    let Some(root) = body.as_object() else {
        return Err(FillError::Parse(format!(
            "expected a JSON object, got {}",
            kind_of(body)
        )));
    };
    let data = match root.get("data") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(data) => data,
    };

    match mode {
        ResolutionMode::List => {
            let items = as_items(data, "data")?;
            Ok(items
                .iter()
                .filter_map(|item| item["name"].as_str())
                .map(Suggestion::label)
                .collect())
        }
        ResolutionMode::Map {
            value_identifier, ..
        } => {
            let values = match data.get("values") {
                None | Some(Value::Null) => return Ok(Vec::new()),
                Some(values) => as_items(values, "data.values")?,
            };
            let mut suggestions: Vec<Suggestion> = Vec::with_capacity(values.len());
            for item in values {
                let Some(label) = item["name"].as_str() else {
                    continue;
                };
                let value = scalar_to_string(&item[value_identifier.as_str()]);
                // Later entries win for a repeated label, the first position is kept.
                match suggestions.iter_mut().find(|s| s.label == label) {
                    Some(existing) => existing.value = value,
                    None => suggestions.push(Suggestion {
                        label: label.to_string(),
                        value,
                    }),
                }
            }
            Ok(suggestions)
        }
    }
}

fn as_items<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| FillError::Parse(format!("`{path}` is {}, not an array", kind_of(value))))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
