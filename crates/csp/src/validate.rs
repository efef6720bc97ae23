//! Per-flag value contracts.
//!
//! Each flag owns a contract pairing a value-arity rule with a per-value
//! predicate; adding a flag means adding one enum variant and one table
//! entry here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::PolicyError;
use crate::flag::Flag;

/// Sink groups that may be named by require-trusted-types-for.
pub const TRUSTED_TYPES_SINK_GROUPS: [&str; 2] = ["script", "style"];

static ENDPOINT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w-]+$").unwrap());
static POLICY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\-#=_/@.%]+$").unwrap());

/// How many values a flag accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Arity {
    /// Presence-only: any value is rejected.
    None,
    /// At least one value is required.
    AtLeastOne,
    /// Any number of values, including none.
    Any,
}

/// The acceptance contract for one flag.
pub(crate) struct FlagContract {
    pub arity: Arity,
    /// Whether accepted values carry quotes in serialized output.
    pub quoted: bool,
    /// Per-value predicate, applied to unquoted values.
    pub accepts: fn(&str) -> bool,
}

fn accept_any(_value: &str) -> bool {
    true
}

fn accept_endpoint_name(value: &str) -> bool {
    ENDPOINT_NAME.is_match(value)
}

fn accept_trusted_type(value: &str) -> bool {
    value == "none" || value == "allow-duplicates" || POLICY_NAME.is_match(value)
}

fn accept_sink_group(value: &str) -> bool {
    TRUSTED_TYPES_SINK_GROUPS.contains(&value)
}

/// One contract per flag, indexed by discriminant in `Flag` declaration
/// order.
const CONTRACTS: [FlagContract; 5] = [
    // upgrade-insecure-requests
    FlagContract {
        arity: Arity::None,
        quoted: false,
        accepts: accept_any,
    },
    // report-to
    FlagContract {
        arity: Arity::AtLeastOne,
        quoted: false,
        accepts: accept_endpoint_name,
    },
    // plugin-types: values accepted verbatim, charset validation is a
    // known gap
    FlagContract {
        arity: Arity::Any,
        quoted: false,
        accepts: accept_any,
    },
    // trusted-types
    FlagContract {
        arity: Arity::AtLeastOne,
        quoted: true,
        accepts: accept_trusted_type,
    },
    // require-trusted-types-for
    FlagContract {
        arity: Arity::AtLeastOne,
        quoted: true,
        accepts: accept_sink_group,
    },
];

pub(crate) fn contract(flag: Flag) -> &'static FlagContract {
    &CONTRACTS[flag as usize]
}

/// Whether a flag's stored values carry quotes in serialized output.
pub(crate) fn quoted_output(flag: Flag) -> bool {
    contract(flag).quoted
}

/// Check a flag's unquoted values against its contract. Returns the first
/// violation; callers commit nothing on error.
pub(crate) fn validate_values(flag: Flag, values: &[String]) -> Result<(), PolicyError> {
    let contract = contract(flag);
    match contract.arity {
        Arity::None if !values.is_empty() => {
            return Err(PolicyError::UnexpectedValues {
                flag,
                values: values.join(", "),
            });
        }
        Arity::AtLeastOne if values.is_empty() => {
            return Err(PolicyError::MissingValues { flag });
        }
        _ => {}
    }
    for value in values {
        if !(contract.accepts)(value) {
            return Err(PolicyError::InvalidValue {
                flag,
                value: value.clone(),
            });
        }
    }
    Ok(())
}
