//! Resource URI resolution.
//!
//! Grammar:
//!
//! ```text
//! resource-uri := "odoo://" selector
//! selector     := "models"
//!               | "model/" type-name
//!               | "record/" type-name "/" record-id
//!               | "search/" type-name "/" domain-json
//! ```
//!
//! Selectors are tried in the order above and the first match wins.

use crate::error::ParseError;
use crate::types::{Resolution, SCHEME};

/// Parse a resource URI into a [`Resolution`].
///
/// # Errors
///
/// Returns `ParseError::UnknownResource` when the scheme or selector is not
/// recognized, and `ParseError::InvalidShape` when a known selector has the
/// wrong number of segments or an empty one.
///
/// # Example
///
/// ```
/// use odoo_resource::{parse, Resolution};
///
/// let r = parse("odoo://record/res.partner/42").unwrap();
/// assert_eq!(
///     r,
///     Resolution::FetchRecord {
///         type_name: "res.partner".into(),
///         record_id: "42".into(),
///     }
/// );
/// ```
pub fn parse(uri: &str) -> Result<Resolution, ParseError> {
    let unknown = || ParseError::UnknownResource {
        uri: uri.to_string(),
    };
    let selector = uri.strip_prefix(SCHEME).ok_or_else(unknown)?;

    if selector == "models" {
        return Ok(Resolution::ListTypes);
    }

    // The type name is taken verbatim, slashes included.
    if let Some(type_name) = selector.strip_prefix("model/") {
        if type_name.is_empty() {
            return Err(ParseError::InvalidShape { selector: "model" });
        }
        return Ok(Resolution::DescribeType {
            type_name: type_name.to_string(),
        });
    }

    if let Some(rest) = selector.strip_prefix("record/") {
        let (type_name, record_id) = two_segments(rest, "record")?;
        return Ok(Resolution::FetchRecord {
            type_name,
            record_id,
        });
    }

    if let Some(rest) = selector.strip_prefix("search/") {
        let (type_name, domain_json) = two_segments(rest, "search")?;
        return Ok(Resolution::SearchRecords {
            type_name,
            domain_json,
        });
    }

    Err(unknown())
}

/// Split `rest` into exactly two non-empty `/`-separated segments.
fn two_segments(rest: &str, selector: &'static str) -> Result<(String, String), ParseError> {
    let mut parts = rest.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) if !first.is_empty() && !second.is_empty() => {
            Ok((first.to_string(), second.to_string()))
        }
        _ => Err(ParseError::InvalidShape { selector }),
    }
}
