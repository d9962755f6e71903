//! Result normalization.

use serde_json::{Map, Value};

/// Convert a raw operation result into its canonical JSON value.
///
/// - A string holding JSON is replaced by the decoded value, which is then
///   normalized again.
/// - Any other string is wrapped as `{"result": <string>}`.
/// - Structured values and non-string scalars pass through unchanged.
///
/// Normalizing twice yields the same value as normalizing once.
///
/// # Example
///
/// ```
/// use odoo_resource::normalize;
/// use serde_json::json;
///
/// assert_eq!(normalize(json!("[1, 2]")), json!([1, 2]));
/// assert_eq!(normalize(json!("plain text")), json!({ "result": "plain text" }));
/// assert_eq!(normalize(json!({ "id": 1 })), json!({ "id": 1 }));
/// ```
pub fn normalize(raw: Value) -> Value {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(decoded) => normalize(decoded),
            Err(_) => {
                let mut wrapped = Map::new();
                wrapped.insert("result".to_string(), Value::String(text));
                Value::Object(wrapped)
            }
        },
        other => other,
    }
}
