//! Lenient field decoders for backend documents.
//!
//! The analysis document is written by a language model and the DART figures
//! arrive as display strings ("1,234.5"), so numbers show up as numbers,
//! numeric strings, empty strings or null depending on the day.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Interpret a JSON value as a number, accepting comma-grouped strings.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// `deserialize_with` target for `Option<f64>` fields.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Interpret a JSON value as display text. Lists are joined with ", ".
pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_from_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

/// `deserialize_with` target for `Option<String>` fields that may carry numbers
/// or lists.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value))
}

/// `deserialize_with` target for nested sections: `null` or a value of the
/// wrong shape decodes as the default.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_default())
}

/// `deserialize_with` target for `Option<Vec<String>>`; non-text items are dropped.
pub fn text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(items.iter().filter_map(text_from_value).collect()),
        _ => None,
    })
}

/// `deserialize_with` target for `Option<BTreeMap<String, String>>` whose values
/// may be text, numbers or lists of either.
pub fn text_map<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(entries)) => Some(
            entries
                .iter()
                .filter_map(|(k, v)| text_from_value(v).map(|t| (k.clone(), t)))
                .collect(),
        ),
        _ => None,
    })
}
