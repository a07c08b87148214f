//! Rendering of DynamoDB AttributeValues to text and JSON.
//!
//! Matching runs against [`attribute_value_to_text`]; output uses the JSON forms.

use aws_sdk_dynamodb::types::AttributeValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// A scanned DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

/// Convert a DynamoDB AttributeValue to a JSON value.
///
/// Numbers stay JSON numbers when they parse, otherwise they are kept as strings.
/// Binary values become base64 strings.
pub fn attribute_value_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(b) => Value::String(STANDARD.encode(b.as_ref())),
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_value_to_json).collect()),
        AttributeValue::M(map) => {
            // Sorted so the same item always renders the same way.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for k in keys {
                out.insert(k.clone(), attribute_value_to_json(&map[k]));
            }
            Value::Object(out)
        }
        AttributeValue::Ss(ss) => Value::Array(ss.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(ns) => Value::Array(ns.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::Bs(bs) => Value::Array(
            bs.iter()
                .map(|b| Value::String(STANDARD.encode(b.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn number_to_json(n: &str) -> Value {
    if n.contains('.') || n.contains('e') || n.contains('E') {
        n.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    } else {
        n.parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .unwrap_or_else(|_| Value::String(n.to_string()))
    }
}

/// String representation of an attribute value, the form patterns match against.
///
/// Scalars render raw (`S`, `N`, `true`, `null`, base64 for `B`);
/// sets, lists and maps render as compact JSON.
pub fn attribute_value_to_text(value: &AttributeValue) -> String {
    match value {
        AttributeValue::S(s) => s.clone(),
        AttributeValue::N(n) => n.clone(),
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Null(_) => "null".to_string(),
        AttributeValue::B(b) => STANDARD.encode(b.as_ref()),
        other => attribute_value_to_json(other).to_string(),
    }
}

/// Render the key attributes of `item` as compact JSON.
pub fn item_key_to_json(item: &Item, key_attributes: &[String]) -> String {
    let mut out = Map::new();
    for name in key_attributes {
        if let Some(value) = item.get(name) {
            out.insert(name.clone(), attribute_value_to_json(value));
        }
    }
    Value::Object(out).to_string()
}

/// Render a whole item as compact JSON with sorted attribute names.
pub fn item_to_json(item: &Item) -> String {
    let mut names: Vec<&String> = item.keys().collect();
    names.sort();
    let mut out = Map::new();
    for name in names {
        out.insert(name.clone(), attribute_value_to_json(&item[name]));
    }
    Value::Object(out).to_string()
}

/// Truncate `value` to at most `max_chars` characters, marking the cut with `...`.
///
/// `max_chars == 0` disables truncation.
pub fn truncate_value(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return value.to_string();
    }
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
