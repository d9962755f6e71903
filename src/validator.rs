//! Search domain decoding and validation.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::{json, Value};

use crate::error::DispatchError;

/// JSON Schema for a backend filter list.
///
/// Items are either logical operators in prefix notation or
/// `[field, operator, value]` triples.
fn domain_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "array",
        "items": {
            "anyOf": [
                { "enum": ["&", "|", "!"] },
                {
                    "type": "array",
                    "minItems": 3,
                    "maxItems": 3,
                    "prefixItems": [
                        { "type": "string", "minLength": 1 },
                        { "type": "string", "minLength": 1 }
                    ]
                }
            ]
        }
    })
}

/// Decode and validate the raw domain segment of a `search/` URI.
///
/// # Errors
///
/// Returns `DispatchError::BadRequest` if the text is not JSON or is not a
/// filter list.
pub fn decode_domain(domain_json: &str) -> Result<Value, DispatchError> {
    let domain: Value = serde_json::from_str(domain_json)
        .map_err(|e| DispatchError::bad_request(format!("invalid search domain: {e}")))?;
    validate_domain(&domain)?;
    Ok(domain)
}

/// Compiled once per process.
fn domain_validator() -> Result<&'static Validator, DispatchError> {
    static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

    VALIDATOR
        .get_or_init(|| jsonschema::validator_for(&domain_schema()).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| DispatchError::BackendFailure {
            message: format!("invalid domain schema: {e}"),
        })
}

/// Validate an already-decoded domain against the filter list schema.
pub fn validate_domain(domain: &Value) -> Result<(), DispatchError> {
    let validator = domain_validator()?;

    let errors: Vec<String> = validator
        .iter_errors(domain)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DispatchError::bad_request(format!(
            "invalid search domain: {}",
            errors.join("; ")
        )))
    }
}
