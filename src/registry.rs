//! Operation registry.
//!
//! A closed table with one entry per [`ResourceKind`]. Each entry carries the
//! handler that runs it. Adding a resource kind means adding a `Resolution`
//! variant, a handler and a descriptor here; the compiler rejects a missing
//! arm in [`lookup`].

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::backend::Backend;
use crate::error::DispatchError;
use crate::types::{DispatchOptions, Resolution, ResourceKind};
use crate::validator::decode_domain;

/// Runs one operation against a backend.
pub type Handler =
    fn(&Resolution, &dyn Backend, &DispatchOptions) -> Result<Value, DispatchError>;

/// Descriptor for one resource kind.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    #[serde(skip)]
    pub kind: ResourceKind,
    pub name: &'static str,
    pub uri_template: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub run: Handler,
}

const JSON_MIME: &str = "application/json";

static REGISTRY: [OperationSpec; 4] = [
    OperationSpec {
        kind: ResourceKind::ListTypes,
        name: "models",
        uri_template: "odoo://models",
        description: "List all available models",
        mime_type: JSON_MIME,
        run: list_types,
    },
    OperationSpec {
        kind: ResourceKind::DescribeType,
        name: "model",
        uri_template: "odoo://model/{model_name}",
        description: "Model information including its fields",
        mime_type: JSON_MIME,
        run: describe_type,
    },
    OperationSpec {
        kind: ResourceKind::FetchRecord,
        name: "record",
        uri_template: "odoo://record/{model_name}/{record_id}",
        description: "A single record by ID",
        mime_type: JSON_MIME,
        run: fetch_record,
    },
    OperationSpec {
        kind: ResourceKind::SearchRecords,
        name: "search",
        uri_template: "odoo://search/{model_name}/{domain}",
        description: "Records matching a JSON-encoded search domain",
        mime_type: JSON_MIME,
        run: search_records,
    },
];

/// All registered operations, in `ResourceKind::ALL` order.
pub fn operations() -> &'static [OperationSpec] {
    &REGISTRY
}

/// Look up the descriptor for a resource kind.
pub fn lookup(kind: ResourceKind) -> &'static OperationSpec {
    match kind {
        ResourceKind::ListTypes => &REGISTRY[0],
        ResourceKind::DescribeType => &REGISTRY[1],
        ResourceKind::FetchRecord => &REGISTRY[2],
        ResourceKind::SearchRecords => &REGISTRY[3],
    }
}

/// Run the operation for `resolution` against `backend`.
///
/// Parameter coercion happens in the handlers: record IDs become integers and
/// search domains are decoded and validated before the backend is called.
///
/// # Errors
///
/// Returns `DispatchError::BadRequest` for bad parameters and the classified
/// backend error otherwise.
pub fn execute(
    resolution: &Resolution,
    backend: &dyn Backend,
    options: &DispatchOptions,
) -> Result<Value, DispatchError> {
    let op = lookup(resolution.kind());
    debug!(operation = op.name, "executing");
    (op.run)(resolution, backend, options)
}

fn list_types(
    resolution: &Resolution,
    backend: &dyn Backend,
    _: &DispatchOptions,
) -> Result<Value, DispatchError> {
    match resolution {
        Resolution::ListTypes => Ok(backend.list_types()?),
        other => Err(mismatch("models", other)),
    }
}

fn describe_type(
    resolution: &Resolution,
    backend: &dyn Backend,
    _: &DispatchOptions,
) -> Result<Value, DispatchError> {
    match resolution {
        Resolution::DescribeType { type_name } => Ok(backend.describe_type(type_name)?),
        other => Err(mismatch("model", other)),
    }
}

fn fetch_record(
    resolution: &Resolution,
    backend: &dyn Backend,
    _: &DispatchOptions,
) -> Result<Value, DispatchError> {
    match resolution {
        Resolution::FetchRecord {
            type_name,
            record_id,
        } => {
            let id = parse_record_id(record_id)?;
            Ok(backend.fetch_record(type_name, id)?)
        }
        other => Err(mismatch("record", other)),
    }
}

fn search_records(
    resolution: &Resolution,
    backend: &dyn Backend,
    options: &DispatchOptions,
) -> Result<Value, DispatchError> {
    match resolution {
        Resolution::SearchRecords {
            type_name,
            domain_json,
        } => {
            let domain = decode_domain(domain_json)?;
            Ok(backend.search_records(type_name, &domain, options.search_limit)?)
        }
        other => Err(mismatch("search", other)),
    }
}

/// A handler was given another kind's resolution.
fn mismatch(operation: &str, resolution: &Resolution) -> DispatchError {
    DispatchError::BackendFailure {
        message: format!(
            "operation '{operation}' cannot run {}",
            resolution.to_uri()
        ),
    }
}

fn parse_record_id(raw: &str) -> Result<i64, DispatchError> {
    raw.parse::<i64>().map_err(|_| {
        DispatchError::bad_request(format!("invalid record ID '{raw}': expected an integer"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_matches_kind() {
        for kind in ResourceKind::ALL {
            assert_eq!(lookup(kind).kind, kind);
        }
    }

    #[test]
    fn operations_in_kind_order() {
        let kinds: Vec<_> = operations().iter().map(|op| op.kind).collect();
        assert_eq!(kinds, ResourceKind::ALL.to_vec());
    }

    #[test]
    fn templates_share_scheme() {
        for op in operations() {
            assert!(op.uri_template.starts_with(crate::types::SCHEME));
        }
    }

    struct Models;

    impl Backend for Models {
        fn list_types(&self) -> Result<Value, crate::error::BackendError> {
            Ok(json!(["res.partner"]))
        }

        fn describe_type(&self, type_name: &str) -> Result<Value, crate::error::BackendError> {
            Ok(json!({ "model": type_name }))
        }

        fn fetch_record(&self, _: &str, id: i64) -> Result<Value, crate::error::BackendError> {
            Ok(json!({ "id": id }))
        }

        fn search_records(
            &self,
            _: &str,
            _: &Value,
            limit: u32,
        ) -> Result<Value, crate::error::BackendError> {
            Ok(json!({ "limit": limit }))
        }
    }

    #[test]
    fn execute_runs_the_looked_up_handler() {
        let options = DispatchOptions::new().search_limit(3);
        let cases = [
            (Resolution::ListTypes, json!(["res.partner"])),
            (
                Resolution::DescribeType {
                    type_name: "res.users".into(),
                },
                json!({ "model": "res.users" }),
            ),
            (
                Resolution::FetchRecord {
                    type_name: "res.users".into(),
                    record_id: "7".into(),
                },
                json!({ "id": 7 }),
            ),
            (
                Resolution::SearchRecords {
                    type_name: "res.users".into(),
                    domain_json: "[]".into(),
                },
                json!({ "limit": 3 }),
            ),
        ];
        for (resolution, expected) in cases {
            let op = lookup(resolution.kind());
            assert_eq!((op.run)(&resolution, &Models, &options).unwrap(), expected);
            assert_eq!(execute(&resolution, &Models, &options).unwrap(), expected);
        }
    }

    #[test]
    fn handler_rejects_other_kind() {
        let op = lookup(ResourceKind::FetchRecord);
        let err = (op.run)(&Resolution::ListTypes, &Models, &DispatchOptions::new()).unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "operation 'record' cannot run odoo://models");
    }

    #[test]
    fn record_id_coercion() {
        assert_eq!(parse_record_id("42").unwrap(), 42);
        assert_eq!(parse_record_id("-1").unwrap(), -1);
        let err = parse_record_id("abc").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "invalid record ID 'abc': expected an integer");
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let value = serde_json::to_value(lookup(ResourceKind::FetchRecord)).unwrap();
        assert_eq!(value["uriTemplate"], "odoo://record/{model_name}/{record_id}");
        assert_eq!(value["mimeType"], "application/json");
        assert!(value.get("kind").is_none());
    }
}
