//! Source token classification and ordering.

use std::cmp::Ordering;

/// Keyword source expressions that must be single-quoted when serialized.
pub const KEYWORD_EXPRESSIONS: [&str; 9] = [
    "self",
    "unsafe-eval",
    "wasm-unsafe-eval",
    "unsafe-inline",
    "unsafe-hashes",
    "inline-speculation-rules",
    "strict-dynamic",
    "report-sample",
    "none",
];

/// Keyword sources, including scheme sources and the bare `*`. These sort
/// ahead of host sources in the rules view.
pub const SOURCE_KEYWORDS: [&str; 14] = [
    "*",
    "data:",
    "blob:",
    "mediastream:",
    "filesystem:",
    "self",
    "unsafe-eval",
    "wasm-unsafe-eval",
    "unsafe-inline",
    "unsafe-hashes",
    "inline-speculation-rules",
    "strict-dynamic",
    "report-sample",
    "none",
];

/// Whether a stored source token belongs to the keyword group.
pub fn is_source_keyword(token: &str) -> bool {
    SOURCE_KEYWORDS.contains(&token)
}

/// The three shapes a serialized source token can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A quoted keyword expression, nonce, or hash.
    Keyword,
    /// A `*.`-prefixed subdomain pattern.
    Wildcard,
    /// A hostname, optionally protocol-qualified.
    Host,
}

impl SourceKind {
    /// Classify a serialized source token.
    pub fn classify(token: &str) -> Self {
        if token.starts_with('\'') {
            SourceKind::Keyword
        } else if token.starts_with("*.") {
            SourceKind::Wildcard
        } else {
            SourceKind::Host
        }
    }
}

/// Order sources with keywords ahead of hosts, case-sensitive lexicographic
/// within each group.
pub fn sort_sources(a: &str, b: &str) -> Ordering {
    match (is_source_keyword(a), is_source_keyword(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.cmp(b),
    }
}
