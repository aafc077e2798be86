//! JSON serialization of stack contents.
//!
//! The success path serializes the whole stack; the diagnostic path limits
//! how many levels are rendered according to the debug depth. Stack order
//! in the output is fixed: index 0 is the top (last-pushed) value.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Number, Value as Json, json};
use tideway_foundation::Value;
use tideway_script::StackMachine;

/// Converts one stack value to its JSON representation.
///
/// `Long` and `Double` stay distinct JSON numbers (a non-finite `Double`
/// renders as null), `Bytes` render as base64 text, macros and opaque
/// values render through their canonical text form.
#[must_use]
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Long(n) => Json::Number(Number::from(*n)),
        Value::Double(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.to_string()),
        Value::Bytes(b) => Json::String(BASE64.encode(b)),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, val) in entries.iter() {
                object.insert(key_to_string(key), value_to_json(val));
            }
            Json::Object(object)
        }
        Value::Macro(m) => Json::String(m.to_string()),
        Value::Handle(h) => json!({ "handle": h.kind() }),
        Value::Context(_) => Json::String("CONTEXT".to_string()),
    }
}

/// Serializes the stack as a JSON array, top value first.
///
/// `limit` caps the number of levels rendered (diagnostic path); `None`
/// renders the whole stack.
#[must_use]
pub fn stack_to_json(machine: &StackMachine, limit: Option<usize>) -> Json {
    let stack = machine.stack();
    let take = limit.unwrap_or(stack.len()).min(stack.len());
    Json::Array(stack.iter().rev().take(take).map(value_to_json).collect())
}

// JSON object keys must be strings; string keys render bare, everything
// else through its canonical text form.
fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}
