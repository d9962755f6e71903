//! Line-oriented stdio transport.
//!
//! Reads one JSON-RPC 2.0 message per line and writes one response per line.
//! Only resource methods are served; each `resources/read` goes through the
//! same [`Dispatcher`] as the HTTP transport.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::dispatch::Dispatcher;
use crate::protocol::{
    error_code_for_status, JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR,
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::registry::{lookup, operations};
use crate::types::ResourceKind;

/// Protocol revision announced in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serve requests from `reader` until EOF.
///
/// # Errors
///
/// Returns an error only if reading or writing the streams fails.
pub fn serve<R, W>(
    mut reader: R,
    mut writer: W,
    dispatcher: &Dispatcher,
    backend: &dyn Backend,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    info!("stdio transport ready");

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(text) => {
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(line, "received");
                handle_line(line, dispatcher, backend)
            }
            Err(e) => {
                warn!(error = %e, "message is not valid UTF-8");
                Some(parse_error())
            }
        };

        if let Some(response) = response {
            let encoded = serde_json::to_string(&response).map_err(io::Error::other)?;
            writer.write_all(encoded.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }

    info!("stdin closed, stdio transport stopped");
    Ok(())
}

/// Handle one line. Returns `None` for notifications.
pub fn handle_line(
    line: &str,
    dispatcher: &Dispatcher,
    backend: &dyn Backend,
) -> Option<JsonRpcResponse> {
    let message: Value = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "unparsable message");
            return Some(parse_error());
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(message) {
        Ok(request) => request,
        Err(e) => {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
            ));
        }
    };

    if request.is_notification() {
        debug!(method = %request.method, "notification");
        return None;
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let outcome = match request.method.as_str() {
        "initialize" => Ok(initialize_result()),
        "ping" => Ok(json!({})),
        "resources/list" => Ok(resources_list()),
        "resources/templates/list" => Ok(json!({ "resourceTemplates": operations() })),
        "resources/read" => read_resource(request.params.as_ref(), dispatcher, backend),
        other => Err(JsonRpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        )),
    };

    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    })
}

fn parse_error() -> JsonRpcResponse {
    JsonRpcResponse::failure(Value::Null, JsonRpcError::new(PARSE_ERROR, "Parse error"))
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "resources": {} },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

/// Only `odoo://models` is a concrete resource; the rest are templates.
fn resources_list() -> Value {
    let spec = lookup(ResourceKind::ListTypes);
    json!({
        "resources": [{
            "uri": spec.uri_template,
            "name": spec.name,
            "description": spec.description,
            "mimeType": spec.mime_type,
        }]
    })
}

fn read_resource(
    params: Option<&Value>,
    dispatcher: &Dispatcher,
    backend: &dyn Backend,
) -> Result<Value, JsonRpcError> {
    let uri = params
        .and_then(|p| p.get("uri"))
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing 'uri' parameter"))?;

    match dispatcher.resolve(uri, backend) {
        Ok(value) => {
            let text = serde_json::to_string(&value)
                .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?;
            Ok(json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": text,
                }]
            }))
        }
        Err(err) => {
            let status = err.status_code();
            Err(JsonRpcError::new(error_code_for_status(status), err.to_string())
                .with_data(json!({ "status": status, "uri": uri })))
        }
    }
}
