//! JSON-RPC 2.0 message types for the stdio transport.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters, also used for malformed resource URIs.
pub const INVALID_PARAMS: i32 = -32602;
/// Backend or internal failure.
pub const INTERNAL_ERROR: i32 = -32603;
/// The referenced resource does not exist.
pub const RESOURCE_NOT_FOUND: i32 = -32002;

/// Incoming request or notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications. An explicit `null` is still a request.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Outgoing message: either a result or an error for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcResponse {
    Success {
        jsonrpc: &'static str,
        id: Value,
        result: Value,
    },
    Failure {
        jsonrpc: &'static str,
        id: Value,
        error: JsonRpcError,
    },
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        JsonRpcResponse::Success {
            jsonrpc: "2.0",
            id,
            result,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        JsonRpcResponse::Failure {
            jsonrpc: "2.0",
            id,
            error,
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Map an HTTP-style status code to a JSON-RPC error code.
pub fn error_code_for_status(status: u16) -> i32 {
    match status {
        400 => INVALID_PARAMS,
        404 => RESOURCE_NOT_FOUND,
        _ => INTERNAL_ERROR,
    }
}
