//! Error types for resource parsing, dispatch and backend access.

use std::path::PathBuf;
use thiserror::Error;

/// HTTP-style status for a successful request.
pub const STATUS_OK: u16 = 200;
/// HTTP-style status for malformed requests and URIs.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// HTTP-style status for unknown types and records.
pub const STATUS_NOT_FOUND: u16 = 404;
/// HTTP-style status for backend and internal failures.
pub const STATUS_INTERNAL: u16 = 500;

/// Errors while parsing a resource URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown resource: {uri}")]
    UnknownResource { uri: String },

    #[error("Invalid {selector} resource format")]
    InvalidShape { selector: &'static str },
}

/// Errors raised by the backend collaborator.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Model {type_name} not found")]
    TypeNotFound { type_name: String },

    #[error("Record not found: {type_name} ID {record_id}")]
    RecordNotFound { type_name: String, record_id: i64 },

    #[error("{message}")]
    Fault { message: String },

    #[error("authentication failed: {message}")]
    Authentication { message: String },

    #[error("unexpected backend response: {message}")]
    InvalidResponse { message: String },

    #[cfg(feature = "remote")]
    #[error("failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl BackendError {
    /// Whether the failure means the referenced type or record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::TypeNotFound { .. } | BackendError::RecordNotFound { .. }
        )
    }
}

/// Classified request failure.
///
/// Every failure leaving the dispatcher is one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    BackendFailure { message: String },

    #[error("Unknown resource: {uri}")]
    UnknownResource { uri: String },
}

impl DispatchError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        DispatchError::BadRequest {
            message: message.into(),
        }
    }

    /// Returns the HTTP-style status code for this error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::BadRequest { .. } | DispatchError::UnknownResource { .. } => {
                STATUS_BAD_REQUEST
            }
            DispatchError::NotFound { .. } => STATUS_NOT_FOUND,
            DispatchError::BackendFailure { .. } => STATUS_INTERNAL,
        }
    }
}

impl From<ParseError> for DispatchError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownResource { uri } => DispatchError::UnknownResource { uri },
            other @ ParseError::InvalidShape { .. } => DispatchError::bad_request(other.to_string()),
        }
    }
}

impl From<BackendError> for DispatchError {
    fn from(err: BackendError) -> Self {
        if err.is_not_found() {
            DispatchError::NotFound {
                message: err.to_string(),
            }
        } else {
            DispatchError::BackendFailure {
                message: err.to_string(),
            }
        }
    }
}

/// Errors while loading connection settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("missing setting '{field}' (set it in the config file or {env})")]
    Missing {
        field: &'static str,
        env: &'static str,
    },

    #[error("invalid value for {env}: {value}")]
    InvalidValue { env: &'static str, value: String },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::FileNotFound { .. } | ConfigError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
