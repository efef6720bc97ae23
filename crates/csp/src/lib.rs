//! Content-Security-Policy modelling, mutation, and serialization.
//!
//! This crate implements the CSP policy store and its source-redundancy
//! compaction engine:
//! - A closed catalog of directives and policy-wide flags
//! - Mutation (add/remove/set/erase/clear) and bulk loading from header text
//! - Violation-report ingestion
//! - Canonical serialization with per-directive source compaction

pub mod compact;
pub mod directive;
pub mod error;
pub mod flag;
pub mod policy;
pub mod quotes;
pub mod report;
pub mod source;
pub mod validate;

pub use compact::compact_sources;
pub use directive::Directive;
pub use error::{PolicyError, PolicyResult};
pub use flag::Flag;
pub use policy::Policy;
pub use quotes::{quote, quote_source, unquote};
pub use report::{Disposition, ViolationReport};
pub use source::{sort_sources, SourceKind, KEYWORD_EXPRESSIONS, SOURCE_KEYWORDS};
pub use validate::TRUSTED_TYPES_SINK_GROUPS;
