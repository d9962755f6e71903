//! Backend collaborator contract.
//!
//! The dispatcher only ever talks to the business-object store through this
//! trait. A handle is passed into every call; nothing here is global.

use serde_json::Value;

use crate::error::BackendError;

/// Capabilities the dispatcher needs from the remote store.
///
/// Implementations own connection and session state. The dispatcher never
/// retries or caches.
pub trait Backend {
    /// List the names of all object types.
    fn list_types(&self) -> Result<Value, BackendError>;

    /// Describe one object type.
    ///
    /// Fails with `BackendError::TypeNotFound` if the type does not exist.
    fn describe_type(&self, type_name: &str) -> Result<Value, BackendError>;

    /// Fetch a single record.
    ///
    /// Fails with `BackendError::RecordNotFound` if no record matches.
    fn fetch_record(&self, type_name: &str, record_id: i64) -> Result<Value, BackendError>;

    /// Search records matching a filter list.
    fn search_records(
        &self,
        type_name: &str,
        domain: &Value,
        limit: u32,
    ) -> Result<Value, BackendError>;
}
