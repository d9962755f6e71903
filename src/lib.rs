//! Odoo Resource Resolver
//!
//! Resolution and dispatch of `odoo://` resource URIs.
//!
//! A client submits `{"resource": "<uri>"}`; the URI is parsed into a typed
//! [`Resolution`], mapped to one backend operation, executed against a
//! [`Backend`] handle supplied by the caller, and the result is normalized to
//! a single JSON value with an HTTP-style status code.
//!
//! # Example
//!
//! ```
//! use odoo_resource::{Backend, BackendError, Dispatcher};
//! use serde_json::{json, Value};
//!
//! struct Fixed;
//!
//! impl Backend for Fixed {
//!     fn list_types(&self) -> Result<Value, BackendError> {
//!         Ok(json!(["res.partner", "res.users"]))
//!     }
//!     fn describe_type(&self, t: &str) -> Result<Value, BackendError> {
//!         Err(BackendError::TypeNotFound { type_name: t.into() })
//!     }
//!     fn fetch_record(&self, t: &str, id: i64) -> Result<Value, BackendError> {
//!         Err(BackendError::RecordNotFound { type_name: t.into(), record_id: id })
//!     }
//!     fn search_records(&self, _: &str, _: &Value, _: u32) -> Result<Value, BackendError> {
//!         Ok(json!([]))
//!     }
//! }
//!
//! let dispatcher = Dispatcher::default();
//! let response = dispatcher.handle(br#"{"resource":"odoo://models"}"#, &Fixed);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, json!(["res.partner", "res.users"]));
//! ```
//!
//! # Resources
//!
//! | URI | Operation | Errors |
//! |-----|-----------|--------|
//! | `odoo://models` | list model names | 500 |
//! | `odoo://model/<model>` | describe a model | 404, 500 |
//! | `odoo://record/<model>/<id>` | read one record | 400, 404, 500 |
//! | `odoo://search/<model>/<domain>` | search records | 400, 500 |
//!
//! Any other URI is rejected with 400.

mod backend;
mod config;
mod dispatch;
mod error;
pub mod logging;
mod normalize;
mod protocol;
mod registry;
mod resolver;
pub mod stdio;
mod types;
mod validator;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "remote")]
mod odoo;

pub use backend::Backend;
pub use config::{
    default_config_paths, load_config, load_config_file, load_config_str, ConfigSource,
    OdooConfig, DEFAULT_TIMEOUT_SECS,
};
pub use dispatch::{Dispatcher, Response, RESOURCE_FIELD};
pub use error::{
    BackendError, ConfigError, DispatchError, ParseError, STATUS_BAD_REQUEST, STATUS_INTERNAL,
    STATUS_NOT_FOUND, STATUS_OK,
};
pub use normalize::normalize;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use registry::{execute, lookup, operations, Handler, OperationSpec};
pub use resolver::parse;
pub use types::{
    json_type_name, DispatchOptions, Resolution, ResourceKind, DEFAULT_SEARCH_LIMIT, SCHEME,
};
pub use validator::{decode_domain, validate_domain};

#[cfg(feature = "remote")]
pub use odoo::OdooClient;
