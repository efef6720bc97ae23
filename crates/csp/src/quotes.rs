//! Single-quote handling for serialized source tokens.

use crate::source::KEYWORD_EXPRESSIONS;

/// Strip surrounding whitespace and at most one leading and one trailing
/// single quote.
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix('\'').unwrap_or(value);
    let value = value.strip_suffix('\'').unwrap_or(value);
    value.to_string()
}

/// Wrap a value in single quotes, normalizing any existing quotes first.
pub fn quote(value: &str) -> String {
    format!("'{}'", unquote(value))
}

fn is_hash_source(token: &str) -> bool {
    ["sha256-", "sha384-", "sha512-"]
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// Quote a source token if its form requires quoting: keyword expressions,
/// nonces, and hash sources. Anything else, including tokens that already
/// carry quotes, passes through unchanged.
pub fn quote_source(token: &str) -> String {
    if KEYWORD_EXPRESSIONS.contains(&token) || token.starts_with("nonce-") || is_hash_source(token)
    {
        quote(token)
    } else {
        token.to_string()
    }
}
