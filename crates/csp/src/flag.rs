//! Policy-wide flags.

use std::cmp::Ordering;
use std::fmt;

/// A policy-wide CSP flag, as opposed to a per-directive source rule.
///
/// Declaration order is load-bearing: the contract table in
/// [`crate::validate`] is indexed by discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Treat insecure URLs as though they had been requested over HTTPS.
    UpgradeInsecureRequests,
    /// Reporting endpoint name for CSP violations.
    ReportTo,
    /// MIME types loadable via `<object>` and `<embed>`.
    PluginTypes,
    /// Trusted Types policy names for DOM XSS sinks.
    TrustedTypes,
    /// Which sink groups require Trusted Types.
    RequireTrustedTypesFor,
}

impl Flag {
    /// Every flag in the catalog, in declaration order.
    pub const ALL: [Flag; 5] = [
        Flag::UpgradeInsecureRequests,
        Flag::ReportTo,
        Flag::PluginTypes,
        Flag::TrustedTypes,
        Flag::RequireTrustedTypesFor,
    ];

    /// Parse a flag tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "upgrade-insecure-requests" => Some(Flag::UpgradeInsecureRequests),
            "report-to" => Some(Flag::ReportTo),
            "plugin-types" => Some(Flag::PluginTypes),
            "trusted-types" => Some(Flag::TrustedTypes),
            "require-trusted-types-for" => Some(Flag::RequireTrustedTypesFor),
            _ => None,
        }
    }

    /// The serialized tag for this flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::UpgradeInsecureRequests => "upgrade-insecure-requests",
            Flag::ReportTo => "report-to",
            Flag::PluginTypes => "plugin-types",
            Flag::TrustedTypes => "trusted-types",
            Flag::RequireTrustedTypesFor => "require-trusted-types-for",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Flags order by their serialized tag for stable view and header output.
impl Ord for Flag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Flag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
