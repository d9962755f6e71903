//! Core types for resource resolution.

use serde::Serialize;
use serde_json::Value;

/// Scheme prefix every resource URI must start with.
pub const SCHEME: &str = "odoo://";

/// Number of records returned by a search when not configured otherwise.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A parsed resource URI.
///
/// Only [`crate::parse`] constructs these from user input, so every value is
/// structurally valid: type names and segments are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// `odoo://models`
    ListTypes,
    /// `odoo://model/<type_name>`
    DescribeType { type_name: String },
    /// `odoo://record/<type_name>/<record_id>`
    FetchRecord {
        type_name: String,
        record_id: String,
    },
    /// `odoo://search/<type_name>/<domain_json>`
    SearchRecords {
        type_name: String,
        domain_json: String,
    },
}

impl Resolution {
    /// Returns the registry key for this resolution.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resolution::ListTypes => ResourceKind::ListTypes,
            Resolution::DescribeType { .. } => ResourceKind::DescribeType,
            Resolution::FetchRecord { .. } => ResourceKind::FetchRecord,
            Resolution::SearchRecords { .. } => ResourceKind::SearchRecords,
        }
    }

    /// Rebuild the resource URI this resolution was parsed from.
    pub fn to_uri(&self) -> String {
        match self {
            Resolution::ListTypes => format!("{SCHEME}models"),
            Resolution::DescribeType { type_name } => format!("{SCHEME}model/{type_name}"),
            Resolution::FetchRecord {
                type_name,
                record_id,
            } => format!("{SCHEME}record/{type_name}/{record_id}"),
            Resolution::SearchRecords {
                type_name,
                domain_json,
            } => format!("{SCHEME}search/{type_name}/{domain_json}"),
        }
    }
}

/// Field-less tag of a [`Resolution`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ListTypes,
    DescribeType,
    FetchRecord,
    SearchRecords,
}

impl ResourceKind {
    /// All kinds, in registry order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::ListTypes,
        ResourceKind::DescribeType,
        ResourceKind::FetchRecord,
        ResourceKind::SearchRecords,
    ];
}

/// Options for request dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Maximum number of records returned by `search/` resources.
    pub search_limit: u32,
}

impl DispatchOptions {
    /// Create options with the default search limit.
    pub fn new() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Set the search limit.
    pub fn search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::new()
    }
}
