//! JSON payload codec for secret strings

use crate::domain::{EnvMap, SecretId};
use crate::error::StoreError;
use serde_json::Value;

/// Encode a mapping as a compact JSON object with sorted keys.
pub fn encode_payload(id: &SecretId, vars: &EnvMap) -> Result<String, StoreError> {
    serde_json::to_string(vars)
        .map_err(|e| StoreError::Encode { id: id.clone(), reason: e.to_string() })
}

/// Decode a secret string into a mapping.
///
/// The payload must be a JSON object whose values are all strings.
pub fn decode_payload(id: &SecretId, payload: &str) -> Result<EnvMap, StoreError> {
    let malformed = |reason: String| StoreError::MalformedPayload { id: id.clone(), reason };

    let value: Value = serde_json::from_str(payload).map_err(|e| malformed(e.to_string()))?;
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(malformed(format!("expected a JSON object, found {}", kind_of(&other))));
        }
    };

    let mut vars = EnvMap::new();
    for (key, value) in object {
        match value {
            Value::String(s) => {
                vars.insert(key, s);
            }
            other => {
                return Err(malformed(format!(
                    "value for key '{}' is {}, expected a string",
                    key,
                    kind_of(&other)
                )));
            }
        }
    }
    Ok(vars)
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
