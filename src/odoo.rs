//! Odoo JSON-RPC backend.
//!
//! Implements [`Backend`] over `POST <url>/jsonrpc` using a blocking HTTP
//! client. Requires the `remote` feature (enabled by default).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::backend::Backend;
use crate::config::OdooConfig;
use crate::error::BackendError;

/// Field attributes requested when describing a model.
const FIELD_ATTRIBUTES: &[&str] = &["string", "help", "type", "required", "readonly"];

/// Blocking JSON-RPC client for one Odoo database.
///
/// Authenticates lazily on first use and keeps the user ID for the lifetime
/// of the client.
pub struct OdooClient {
    config: OdooConfig,
    endpoint: String,
    http: reqwest::blocking::Client,
    uid: Mutex<Option<i64>>,
    next_id: AtomicU64,
}

impl OdooClient {
    /// Build a client from connection settings. No request is sent yet.
    pub fn new(config: OdooConfig) -> Result<Self, BackendError> {
        let endpoint = format!("{}/jsonrpc", config.url.trim_end_matches('/'));
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| BackendError::Transport {
                url: endpoint.clone(),
                source,
            })?;

        Ok(Self {
            config,
            endpoint,
            http,
            uid: Mutex::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &OdooConfig {
        &self.config
    }

    /// Send one JSON-RPC `call` and return its `result` member.
    fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": { "service": service, "method": method, "args": args },
            "id": id,
        });
        debug!(service, method, id, "json-rpc call");

        let transport = |source| BackendError::Transport {
            url: self.endpoint.clone(),
            source,
        };
        let reply: Value = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json()
            .map_err(transport)?;

        rpc_result(reply)
    }

    /// Log in once and return the cached user ID.
    fn uid(&self) -> Result<i64, BackendError> {
        let mut guard = self.uid.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(uid) = *guard {
            return Ok(uid);
        }

        let result = self.call(
            "common",
            "login",
            json!([self.config.db, self.config.username, self.config.password]),
        )?;
        let uid = result.as_i64().ok_or_else(|| BackendError::Authentication {
            message: format!(
                "login rejected for user '{}' on database '{}'",
                self.config.username, self.config.db
            ),
        })?;

        *guard = Some(uid);
        Ok(uid)
    }

    /// Call `execute_kw` on a model.
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, BackendError> {
        let uid = self.uid()?;
        self.call(
            "object",
            "execute_kw",
            json!([
                self.config.db,
                uid,
                self.config.password,
                model,
                method,
                args,
                kwargs
            ]),
        )
    }
}

impl Backend for OdooClient {
    fn list_types(&self) -> Result<Value, BackendError> {
        let rows = self.execute_kw(
            "ir.model",
            "search_read",
            json!([[]]),
            json!({ "fields": ["model"] }),
        )?;
        let mut names: Vec<String> = expect_array(rows, "ir.model search_read")?
            .iter()
            .filter_map(|row| row.get("model").and_then(Value::as_str).map(String::from))
            .collect();
        names.sort();
        Ok(Value::from(names))
    }

    fn describe_type(&self, type_name: &str) -> Result<Value, BackendError> {
        let ids = self.execute_kw(
            "ir.model",
            "search",
            json!([[["model", "=", type_name]]]),
            json!({}),
        )?;
        if expect_array(ids.clone(), "ir.model search")?.is_empty() {
            return Err(BackendError::TypeNotFound {
                type_name: type_name.to_string(),
            });
        }

        let rows = self.execute_kw("ir.model", "read", json!([ids, ["name", "model"]]), json!({}))?;
        let mut info = first_object(rows, "ir.model read")?;

        // A model whose fields cannot be read is still described.
        match self.execute_kw(
            type_name,
            "fields_get",
            json!([]),
            json!({ "attributes": FIELD_ATTRIBUTES }),
        ) {
            Ok(fields @ Value::Object(_)) => {
                info.insert("fields".to_string(), fields);
            }
            Ok(other) => {
                info.insert(
                    "fields_error".to_string(),
                    Value::String(format!(
                        "unexpected fields_get result: {}",
                        crate::types::json_type_name(&other)
                    )),
                );
            }
            Err(e) => {
                info.insert("fields_error".to_string(), Value::String(e.to_string()));
            }
        }

        Ok(Value::Object(info))
    }

    fn fetch_record(&self, type_name: &str, record_id: i64) -> Result<Value, BackendError> {
        let rows = self.execute_kw(type_name, "read", json!([[record_id]]), json!({}))?;
        let rows = expect_array(rows, "read")?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::RecordNotFound {
                type_name: type_name.to_string(),
                record_id,
            })
    }

    fn search_records(
        &self,
        type_name: &str,
        domain: &Value,
        limit: u32,
    ) -> Result<Value, BackendError> {
        self.execute_kw(
            type_name,
            "search_read",
            json!([domain]),
            json!({ "limit": limit }),
        )
    }
}

/// Extract `result` from a JSON-RPC reply, turning `error` into a fault.
fn rpc_result(reply: Value) -> Result<Value, BackendError> {
    let Value::Object(mut reply) = reply else {
        return Err(BackendError::InvalidResponse {
            message: "JSON-RPC reply is not an object".to_string(),
        });
    };

    if let Some(error) = reply.remove("error") {
        let message = error
            .pointer("/data/message")
            .or_else(|| error.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown JSON-RPC error")
            .to_string();
        return Err(BackendError::Fault { message });
    }

    reply
        .remove("result")
        .ok_or_else(|| BackendError::InvalidResponse {
            message: "JSON-RPC reply has neither result nor error".to_string(),
        })
}

fn expect_array(value: Value, what: &str) -> Result<Vec<Value>, BackendError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(BackendError::InvalidResponse {
            message: format!(
                "{what} returned {}, expected array",
                crate::types::json_type_name(&other)
            ),
        }),
    }
}

fn first_object(value: Value, what: &str) -> Result<Map<String, Value>, BackendError> {
    match expect_array(value, what)?.into_iter().next() {
        Some(Value::Object(obj)) => Ok(obj),
        _ => Err(BackendError::InvalidResponse {
            message: format!("{what} returned no record"),
        }),
    }
}
