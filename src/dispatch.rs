//! Request dispatch.
//!
//! Turns a raw request body into a status code and a JSON body. Every
//! failure is classified here; nothing raised by the backend leaves this
//! module unclassified.

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::backend::Backend;
use crate::error::{DispatchError, STATUS_OK};
use crate::normalize::normalize;
use crate::registry::execute;
use crate::resolver::parse;
use crate::types::DispatchOptions;

/// Name of the request body field holding the resource URI.
pub const RESOURCE_FIELD: &str = "resource";

/// Status code and JSON body for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    fn from_error(err: &DispatchError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "error": err.to_string() }),
        }
    }

    /// Whether the request succeeded.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Stateless request dispatcher.
///
/// Holds only immutable options, so one instance can serve concurrent
/// requests. The backend is supplied per call.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Handle a raw request body.
    pub fn handle(&self, raw: &[u8], backend: &dyn Backend) -> Response {
        match serde_json::from_slice::<Value>(raw) {
            Ok(body) => self.submit(&body, backend),
            Err(e) => {
                let err = DispatchError::bad_request(format!("invalid JSON body: {e}"));
                log_failure(None, &err);
                Response::from_error(&err)
            }
        }
    }

    /// Handle a decoded request body of the form `{"resource": "<uri>"}`.
    pub fn submit(&self, body: &Value, backend: &dyn Backend) -> Response {
        let uri = match resource_uri(body) {
            Ok(uri) => uri,
            Err(err) => {
                log_failure(None, &err);
                return Response::from_error(&err);
            }
        };

        match self.resolve(uri, backend) {
            Ok(value) => Response::ok(value),
            Err(err) => Response::from_error(&err),
        }
    }

    /// Resolve a resource URI and return its normalized result.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; it has already been logged.
    pub fn resolve(&self, uri: &str, backend: &dyn Backend) -> Result<Value, DispatchError> {
        info!(resource = %uri, "resource request");

        let result = parse(uri)
            .map_err(DispatchError::from)
            .and_then(|resolution| execute(&resolution, backend, &self.options));

        match result {
            Ok(raw) => Ok(normalize(raw)),
            Err(err) => {
                log_failure(Some(uri), &err);
                Err(err)
            }
        }
    }
}

/// Extract the resource URI from a request body.
fn resource_uri(body: &Value) -> Result<&str, DispatchError> {
    let Value::Object(fields) = body else {
        return Err(DispatchError::bad_request(
            "request body must be a JSON object",
        ));
    };

    match fields.get(RESOURCE_FIELD) {
        None | Some(Value::Null) => Err(missing_resource()),
        Some(Value::String(uri)) if uri.is_empty() => Err(missing_resource()),
        Some(Value::String(uri)) => Ok(uri),
        Some(other) => Err(DispatchError::bad_request(format!(
            "'resource' parameter must be a string, got {}",
            crate::types::json_type_name(other)
        ))),
    }
}

fn missing_resource() -> DispatchError {
    DispatchError::bad_request("Missing 'resource' parameter")
}

fn log_failure(uri: Option<&str>, err: &DispatchError) {
    let status = err.status_code();
    let uri = uri.unwrap_or("-");
    if status >= 500 {
        error!(resource = %uri, status, error = %err, "resource request failed");
    } else {
        warn!(resource = %uri, status, error = %err, "resource request rejected");
    }
}
