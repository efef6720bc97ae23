//! Source-redundancy compaction.
//!
//! Collapses one directive's source list to a minimal equivalent form:
//! hosts covered by a wildcard are dropped, and protocol-qualified
//! duplicates of a bare host collapse onto one canonical token.
//! Equivalence is judged on normalization keys (protocol-stripped,
//! lower-cased), never on raw tokens, so input casing and ordering cannot
//! change what the output allows.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::source::SourceKind;

/// Strip a leading `http://` or `https://`.
fn strip_protocol(token: &str) -> &str {
    token
        .strip_prefix("https://")
        .or_else(|| token.strip_prefix("http://"))
        .unwrap_or(token)
}

/// `key` names a strict subdomain of `base`: `a.example.com` is one for
/// `example.com`, `example.com` itself is not. Suffix matching on the full
/// label boundary keeps `other.co.uk` from counting as a subdomain of
/// `example.co.uk`, and `notexample.com` from matching `example.com`.
fn is_strict_subdomain(key: &str, base: &str) -> bool {
    key.len() > base.len() && key.ends_with(base) && key[..key.len() - base.len()].ends_with('.')
}

/// Every form one host was seen under, keyed by its normalization key.
#[derive(Default)]
struct HostGroup {
    first_token: Option<String>,
    first_bare: Option<String>,
    saw_http: bool,
    saw_https: bool,
}

impl HostGroup {
    fn note(&mut self, token: &str) {
        if self.first_token.is_none() {
            self.first_token = Some(token.to_string());
        }
        if token.starts_with("https://") {
            self.saw_https = true;
        } else if token.starts_with("http://") {
            self.saw_http = true;
        } else if self.first_bare.is_none() {
            self.first_bare = Some(token.to_string());
        }
    }

    /// The single token that stands in for every recorded form of this
    /// host. A bare form wins outright; seeing both protocols implies the
    /// bare origin was intended; a lone qualified form is preserved
    /// verbatim.
    fn canonical(&self) -> String {
        if let Some(bare) = &self.first_bare {
            return bare.clone();
        }
        let first = self.first_token.as_deref().unwrap_or_default();
        if self.saw_http && self.saw_https {
            strip_protocol(first).to_string()
        } else {
            first.to_string()
        }
    }
}

/// Compact a space-separated source list to its minimal equivalent form,
/// alphabetically sorted.
///
/// Keyword tokens (leading quote) pass through untouched and dedup by
/// exact string. Hosts dedup per normalization key onto a canonical token
/// and are dropped when any wildcard in the input covers them. A wildcard
/// covers only strict subdomains of its base, never the base itself.
pub fn compact_sources(sources: &str) -> String {
    let tokens: Vec<&str> = sources.split_whitespace().collect();

    // First pass: group hosts by normalization key and collect every
    // wildcard base, so host emission can look ahead past input order.
    let mut groups: IndexMap<String, HostGroup> = IndexMap::new();
    let mut wildcard_bases: Vec<String> = Vec::new();
    for &token in &tokens {
        match SourceKind::classify(token) {
            SourceKind::Keyword => {}
            SourceKind::Wildcard => wildcard_bases.push(token[2..].to_ascii_lowercase()),
            SourceKind::Host => {
                let key = strip_protocol(token).to_ascii_lowercase();
                groups.entry(key).or_default().note(token);
            }
        }
    }

    let covered =
        |key: &str| wildcard_bases.iter().any(|base| is_strict_subdomain(key, base));

    // Second pass: emit in first-occurrence order, once per keyword,
    // wildcard, and host key.
    let mut emitted: Vec<String> = Vec::new();
    let mut seen_keywords: HashSet<&str> = HashSet::new();
    let mut seen_wildcards: HashSet<&str> = HashSet::new();
    let mut seen_hosts: HashSet<String> = HashSet::new();
    for &token in &tokens {
        match SourceKind::classify(token) {
            SourceKind::Keyword => {
                if seen_keywords.insert(token) {
                    emitted.push(token.to_string());
                }
            }
            SourceKind::Wildcard => {
                if seen_wildcards.insert(token) {
                    // A new wildcard retires any already-emitted host that
                    // names one of its strict subdomains.
                    let base = token[2..].to_ascii_lowercase();
                    emitted.retain(|entry| {
                        SourceKind::classify(entry) != SourceKind::Host
                            || !is_strict_subdomain(
                                &strip_protocol(entry).to_ascii_lowercase(),
                                &base,
                            )
                    });
                    emitted.push(token.to_string());
                }
            }
            SourceKind::Host => {
                let key = strip_protocol(token).to_ascii_lowercase();
                if !seen_hosts.insert(key.clone()) || covered(&key) {
                    continue;
                }
                if let Some(group) = groups.get(&key) {
                    emitted.push(group.canonical());
                }
            }
        }
    }

    emitted.sort_unstable();
    emitted.join(" ")
}
