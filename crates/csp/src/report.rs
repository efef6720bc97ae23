//! Violation report ingestion types.

use serde::{Deserialize, Serialize};

/// The disposition of the policy a report was generated under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Report,
    Enforce,
}

/// A CSP violation report body, as delivered by a reporting endpoint.
///
/// Every field is optional: reporting transports are loosely versioned,
/// and [`crate::Policy::adjust`] only requires `effective_directive` and
/// `blocked_url`. The remaining fields ride along for consumers that want
/// the full picture.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViolationReport {
    pub source_file: Option<String>,
    pub line_number: Option<u64>,
    pub column_number: Option<u64>,
    pub disposition: Option<Disposition>,
    /// The resource that violated the policy: a URL, or an opaque token
    /// such as `inline` or `eval`.
    #[serde(rename = "blockedURL")]
    pub blocked_url: Option<String>,
    #[serde(rename = "documentURL")]
    pub document_url: Option<String>,
    /// The directive whose enforcement caused the violation.
    pub effective_directive: Option<String>,
    pub original_policy: Option<String>,
    pub referrer: Option<String>,
    /// The first characters of the inline payload that caused the
    /// violation, if any.
    pub sample: Option<String>,
    pub status_code: Option<u64>,
}
