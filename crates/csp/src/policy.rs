//! The policy store.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value};
use url::Url;

use crate::compact::compact_sources;
use crate::directive::Directive;
use crate::error::{PolicyError, PolicyResult};
use crate::flag::Flag;
use crate::quotes::{quote, quote_source, unquote};
use crate::report::ViolationReport;
use crate::source::sort_sources;
use crate::validate;

/// A mutable Content-Security-Policy: source → directive rules plus
/// policy-wide flags.
///
/// Mutators return `&mut Self` so calls chain; serialization goes through
/// [`fmt::Display`]. A `Policy` is a plain in-memory value with no
/// internal locking; keep one per logical request or session.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    rules: IndexMap<String, IndexSet<Directive>>,
    flags: IndexMap<Flag, IndexSet<String>>,
}

impl Policy {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directives under a source. Creates the source entry lazily; a
    /// call with no directives is a no-op and creates nothing.
    pub fn add(&mut self, source: impl Into<String>, directives: &[Directive]) -> &mut Self {
        if directives.is_empty() {
            return self;
        }
        self.rules
            .entry(source.into())
            .or_default()
            .extend(directives.iter().copied());
        self
    }

    /// Remove an entire source (empty `directives`) or specific directives
    /// from it. Removing every directive one by one leaves the source
    /// present with an empty directive set; read views tolerate that.
    pub fn remove(&mut self, source: &str, directives: &[Directive]) -> &mut Self {
        if directives.is_empty() {
            self.rules.shift_remove(source);
        } else if let Some(entry) = self.rules.get_mut(source) {
            for directive in directives {
                entry.shift_remove(directive);
            }
        }
        self
    }

    /// Set a flag. Values are unquoted, checked against the flag's
    /// contract, re-quoted where the contract demands it, and unioned into
    /// the flag's value set. Nothing is committed when any value is
    /// rejected.
    pub fn set(&mut self, flag: Flag, values: &[&str]) -> PolicyResult<&mut Self> {
        let unquoted: Vec<String> = values.iter().map(|value| unquote(value)).collect();
        validate::validate_values(flag, &unquoted)?;
        let quoted_output = validate::quoted_output(flag);
        let entry = self.flags.entry(flag).or_default();
        for value in unquoted {
            entry.insert(if quoted_output { quote(&value) } else { value });
        }
        Ok(self)
    }

    /// Remove a flag and all of its values.
    pub fn erase(&mut self, flag: Flag) -> &mut Self {
        self.flags.shift_remove(&flag);
        self
    }

    /// Remove every rule and flag.
    pub fn clear(&mut self) -> &mut Self {
        self.rules.clear();
        self.flags.clear();
        self
    }

    /// Load a serialized CSP header into this policy.
    ///
    /// Each `;`-separated rule is `<tag> <token> <token> ...`. A tag that
    /// names a flag is dispatched to [`Policy::set`]; any other tag must
    /// name a directive, and each remaining token is added as a source
    /// under it. Empty rule segments are skipped.
    pub fn load(&mut self, header: &str) -> PolicyResult<&mut Self> {
        for rule in header.split(';') {
            let mut parts = rule.trim().split_whitespace();
            let Some(head) = parts.next() else {
                continue;
            };
            if let Some(flag) = Flag::parse(head) {
                let values: Vec<&str> = parts.collect();
                self.set(flag, &values)?;
            } else if let Some(directive) = Directive::parse(head) {
                for token in parts {
                    self.add(token, &[directive]);
                }
            } else {
                return Err(PolicyError::UnknownDirective(head.to_string()));
            }
        }
        Ok(self)
    }

    /// Fold violation reports back into the policy: each report adds its
    /// blocked origin under the directive it violated. Reports missing
    /// either field, naming an unknown directive, or carrying an
    /// unparseable URL are skipped.
    pub fn adjust(&mut self, reports: &[ViolationReport]) -> &mut Self {
        for report in reports {
            let (Some(tag), Some(blocked)) = (&report.effective_directive, &report.blocked_url)
            else {
                tracing::debug!("skipping violation report with missing fields");
                continue;
            };
            let Some(directive) = Directive::parse(tag) else {
                tracing::debug!(directive = %tag, "skipping report for unknown directive");
                continue;
            };
            let source = if blocked.starts_with("http") {
                match Url::parse(blocked)
                    .ok()
                    .and_then(|url| url.host_str().map(str::to_string))
                {
                    Some(host) => host,
                    None => {
                        tracing::debug!(blocked = %blocked, "skipping report with unparseable URL");
                        continue;
                    }
                }
            } else {
                blocked.clone()
            };
            self.add(source, &[directive]);
        }
        self
    }

    /// The rules as sorted `(source, directives)` pairs: keyword sources
    /// first, then hosts, directives alphabetical within each source.
    pub fn rules(&self) -> Vec<(String, Vec<Directive>)> {
        let mut rules: Vec<(String, Vec<Directive>)> = self
            .rules
            .iter()
            .map(|(source, directives)| {
                let mut directives: Vec<Directive> = directives.iter().copied().collect();
                directives.sort();
                (source.clone(), directives)
            })
            .collect();
        rules.sort_by(|(a, _), (b, _)| sort_sources(a, b));
        rules
    }

    /// The flags as sorted `(flag, values)` pairs. A presence-only flag
    /// carries an empty value list.
    pub fn flags(&self) -> Vec<(Flag, Vec<String>)> {
        let mut flags: Vec<(Flag, Vec<String>)> = self
            .flags
            .iter()
            .map(|(flag, values)| {
                let mut values: Vec<String> = values.iter().cloned().collect();
                values.sort();
                (*flag, values)
            })
            .collect();
        flags.sort_by_key(|(flag, _)| *flag);
        flags
    }

    /// The raw store shape: source-keyed rules and flag-keyed values.
    pub fn to_json(&self) -> Value {
        let rules: BTreeMap<String, Vec<&str>> = self
            .rules
            .iter()
            .map(|(source, directives)| {
                (
                    source.clone(),
                    directives.iter().map(|d| d.as_str()).collect(),
                )
            })
            .collect();
        let flags: BTreeMap<&str, Vec<String>> = self
            .flags
            .iter()
            .map(|(flag, values)| (flag.as_str(), values.iter().cloned().collect()))
            .collect();
        json!({ "rules": rules, "flags": flags })
    }

    /// The sorted views as a tuple table, the shape the visual editor
    /// consumes.
    pub fn to_table(&self) -> Value {
        let rules: Vec<Value> = self
            .rules()
            .into_iter()
            .map(|(source, directives)| {
                json!([source, directives.iter().map(|d| d.as_str()).collect::<Vec<_>>()])
            })
            .collect();
        let flags: Vec<Value> = self
            .flags()
            .into_iter()
            .map(|(flag, values)| json!([flag.as_str(), values]))
            .collect();
        json!([["rules", rules], ["flags", flags]])
    }
}

impl fmt::Display for Policy {
    /// Serialize the canonical header: directive rules first (alphabetical
    /// by tag, each source list quoted and compacted), then flag rules,
    /// all joined by `"; "`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pivot the source-keyed rules into directive-keyed groups. The
        // sorted rules view makes the compaction engine's first-seen
        // tie-breaks deterministic.
        let mut grouped: BTreeMap<Directive, Vec<String>> = BTreeMap::new();
        for (source, directives) in self.rules() {
            for directive in directives {
                grouped
                    .entry(directive)
                    .or_default()
                    .push(quote_source(&source));
            }
        }

        let mut parts: Vec<String> = grouped
            .into_iter()
            .map(|(directive, mut sources)| {
                sources.sort();
                format!("{} {}", directive, compact_sources(&sources.join(" ")))
            })
            .collect();

        for (flag, values) in self.flags() {
            if values.is_empty() {
                parts.push(flag.as_str().to_string());
            } else {
                parts.push(format!("{} {}", flag, values.join(" ")));
            }
        }

        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::directive::Directive::{FontSrc, ImgSrc, ScriptSrc, StyleSrc};

    #[test]
    fn add_then_serialize_single_rule() {
        let mut policy = Policy::new();
        policy.add("self", &[ScriptSrc]);
        assert_eq!(policy.to_string(), "script-src 'self'");
    }

    #[test]
    fn add_with_no_directives_is_a_no_op() {
        let mut policy = Policy::new();
        policy.add("self", &[]);
        assert!(policy.rules().is_empty());
        assert_eq!(policy.to_string(), "");
    }

    #[test]
    fn add_deduplicates_directives() {
        let mut policy = Policy::new();
        policy
            .add("*.example.com", &[ScriptSrc])
            .add("*.example.com", &[StyleSrc])
            .add("*.example.com", &[StyleSrc]);
        assert_eq!(
            policy.rules(),
            vec![("*.example.com".to_string(), vec![ScriptSrc, StyleSrc])]
        );
    }

    #[test]
    fn remove_named_directives_keeps_the_source() {
        let mut policy = Policy::new();
        policy.add("a.example.com", &[ScriptSrc, StyleSrc]);
        policy.remove("a.example.com", &[ScriptSrc]);
        assert_eq!(
            policy.rules(),
            vec![("a.example.com".to_string(), vec![StyleSrc])]
        );
        policy.remove("a.example.com", &[StyleSrc]);
        // The entry survives with no directives and serializes to nothing.
        assert_eq!(policy.rules(), vec![("a.example.com".to_string(), vec![])]);
        assert_eq!(policy.to_string(), "");
    }

    #[test]
    fn remove_without_directives_deletes_the_source() {
        let mut policy = Policy::new();
        policy.add("a.example.com", &[ScriptSrc, StyleSrc]);
        policy.remove("a.example.com", &[]);
        assert!(policy.rules().is_empty());
    }

    #[test]
    fn remove_of_an_absent_source_is_a_no_op() {
        let mut policy = Policy::new();
        policy.remove("missing.example.com", &[]);
        policy.remove("missing.example.com", &[ScriptSrc]);
        assert!(policy.rules().is_empty());
    }

    #[test]
    fn set_rejects_missing_values() {
        let mut policy = Policy::new();
        let err = policy.set(Flag::ReportTo, &[]).unwrap_err();
        assert_eq!(
            err,
            PolicyError::MissingValues {
                flag: Flag::ReportTo
            }
        );
        assert!(policy.flags().is_empty());
    }

    #[test]
    fn set_rejects_values_for_upgrade_insecure_requests() {
        let mut policy = Policy::new();
        let err = policy
            .set(Flag::UpgradeInsecureRequests, &["x"])
            .unwrap_err();
        assert!(matches!(err, PolicyError::UnexpectedValues { .. }));
        assert!(policy.flags().is_empty());
    }

    #[test]
    fn set_commits_nothing_on_a_rejected_value() {
        let mut policy = Policy::new();
        let err = policy
            .set(Flag::ReportTo, &["ok-endpoint", "not ok"])
            .unwrap_err();
        assert_eq!(
            err,
            PolicyError::InvalidValue {
                flag: Flag::ReportTo,
                value: "not ok".to_string()
            }
        );
        assert!(policy.flags().is_empty());
    }

    #[test]
    fn set_unions_and_deduplicates_values() {
        let mut policy = Policy::new();
        policy
            .set(Flag::PluginTypes, &["application/pdf", "application/x-shockwave-flash"])
            .unwrap();
        policy
            .set(Flag::PluginTypes, &["application/x-java-applet", "application/x-shockwave-flash"])
            .unwrap();
        assert_eq!(
            policy.flags(),
            vec![(
                Flag::PluginTypes,
                vec![
                    "application/pdf".to_string(),
                    "application/x-java-applet".to_string(),
                    "application/x-shockwave-flash".to_string(),
                ]
            )]
        );
    }

    #[test]
    fn set_quotes_trusted_types_values() {
        let mut policy = Policy::new();
        policy.set(Flag::TrustedTypes, &["allow-duplicates"]).unwrap();
        policy
            .set(Flag::RequireTrustedTypesFor, &["'script'"])
            .unwrap();
        assert_eq!(
            policy.flags(),
            vec![
                (
                    Flag::RequireTrustedTypesFor,
                    vec!["'script'".to_string()]
                ),
                (Flag::TrustedTypes, vec!["'allow-duplicates'".to_string()]),
            ]
        );
    }

    #[test]
    fn plugin_types_values_are_accepted_verbatim() {
        // Charset validation for plugin-types is a known gap, carried
        // deliberately: any token is stored as given.
        let mut policy = Policy::new();
        policy.set(Flag::PluginTypes, &["not/even@a#mime"]).unwrap();
        assert_eq!(
            policy.flags(),
            vec![(Flag::PluginTypes, vec!["not/even@a#mime".to_string()])]
        );
    }

    #[test]
    fn erase_removes_the_flag() {
        let mut policy = Policy::new();
        policy.set(Flag::ReportTo, &["endpoint"]).unwrap();
        policy.erase(Flag::ReportTo);
        assert!(policy.flags().is_empty());
    }

    #[test]
    fn clear_empties_both_maps() {
        let mut policy = Policy::new();
        policy.add("self", &[ScriptSrc]);
        policy.set(Flag::UpgradeInsecureRequests, &[]).unwrap();
        policy.clear();
        assert!(policy.rules().is_empty());
        assert!(policy.flags().is_empty());
        assert_eq!(policy.to_string(), "");
    }

    #[test]
    fn full_policy_serialization() {
        let mut policy = Policy::new();
        policy
            .add("self", &[ScriptSrc, StyleSrc])
            .add("unsafe-inline", &[ScriptSrc])
            .add("unsafe-eval", &[ScriptSrc])
            .add("*.example.com", &[ScriptSrc])
            .add("*.example.com", &[StyleSrc])
            .add("https://example.com", &[ScriptSrc, StyleSrc]);
        policy.set(Flag::UpgradeInsecureRequests, &[]).unwrap();
        policy.set(Flag::RequireTrustedTypesFor, &["script"]).unwrap();
        policy.set(Flag::TrustedTypes, &["allow-duplicates"]).unwrap();
        policy
            .set(Flag::PluginTypes, &["application/pdf", "application/x-shockwave-flash"])
            .unwrap();
        policy.set(Flag::ReportTo, &["csp-endpoint"]).unwrap();

        assert_eq!(
            policy.to_string(),
            "script-src 'self' 'unsafe-eval' 'unsafe-inline' *.example.com https://example.com; \
             style-src 'self' *.example.com https://example.com; \
             plugin-types application/pdf application/x-shockwave-flash; \
             report-to csp-endpoint; \
             require-trusted-types-for 'script'; \
             trusted-types 'allow-duplicates'; \
             upgrade-insecure-requests"
        );
    }

    #[test]
    fn serialization_compacts_each_directive_group() {
        let mut policy = Policy::new();
        policy
            .add("*.example.com", &[ImgSrc])
            .add("cdn.example.com", &[ImgSrc])
            .add("https://static.example.net", &[ImgSrc])
            .add("static.example.net", &[ImgSrc]);
        assert_eq!(policy.to_string(), "img-src *.example.com static.example.net");
    }

    #[test]
    fn load_round_trips_through_display() {
        let header = "img-src * data:; \
                      script-src 'self' 'unsafe-eval' 'unsafe-inline' *.example.com https://example.com; \
                      style-src 'self' *.example.com https://example.com; \
                      plugin-types application/pdf; \
                      report-to csp-endpoint; \
                      require-trusted-types-for 'script'; \
                      trusted-types 'allow-duplicates'; \
                      upgrade-insecure-requests";
        let mut policy = Policy::new();
        policy.load(header).unwrap();
        assert_eq!(policy.to_string(), header);

        // Serialization is a fixpoint under reload.
        let mut reloaded = Policy::new();
        reloaded.load(&policy.to_string()).unwrap();
        assert_eq!(reloaded.to_string(), policy.to_string());
    }

    #[test]
    fn load_rejects_unknown_tags() {
        let mut policy = Policy::new();
        let err = policy.load("made-up-src foo.example.com").unwrap_err();
        assert_eq!(err, PolicyError::UnknownDirective("made-up-src".to_string()));
    }

    #[test]
    fn load_tolerates_empty_segments() {
        let mut policy = Policy::new();
        policy.load("script-src 'self';; style-src 'self';").unwrap();
        assert_eq!(policy.to_string(), "script-src 'self'; style-src 'self'");
    }

    #[test]
    fn load_propagates_flag_validation_errors() {
        let mut policy = Policy::new();
        assert!(policy.load("report-to bad endpoint!").is_err());
    }

    #[test]
    fn adjust_adds_blocked_origins() {
        let reports: Vec<ViolationReport> = serde_json::from_value(json!([
            {
                "effectiveDirective": "img-src",
                "blockedURL": "https://cdn.tracker.example/pixel.gif",
                "disposition": "enforce",
                "statusCode": 200
            },
            {
                "effectiveDirective": "script-src",
                "blockedURL": "eval"
            },
            { "blockedURL": "https://no-directive.example" },
            { "effectiveDirective": "font-src" },
            {
                "effectiveDirective": "not-a-directive",
                "blockedURL": "https://ignored.example"
            }
        ]))
        .unwrap();
        let mut policy = Policy::new();
        policy.adjust(&reports);
        assert_eq!(
            policy.rules(),
            vec![
                ("cdn.tracker.example".to_string(), vec![ImgSrc]),
                ("eval".to_string(), vec![ScriptSrc]),
            ]
        );
    }

    #[test]
    fn adjust_skips_unparseable_urls() {
        let reports = vec![ViolationReport {
            effective_directive: Some("font-src".to_string()),
            // Starts with an HTTP scheme but has no host to extract.
            blocked_url: Some("http://".to_string()),
            ..Default::default()
        }];
        let mut policy = Policy::new();
        policy.adjust(&reports);
        assert!(policy.rules().is_empty());
    }

    #[test]
    fn adjust_keeps_opaque_tokens_verbatim() {
        let reports = vec![ViolationReport {
            effective_directive: Some("font-src".to_string()),
            blocked_url: Some("data:".to_string()),
            ..Default::default()
        }];
        let mut policy = Policy::new();
        policy.adjust(&reports);
        assert_eq!(policy.rules(), vec![("data:".to_string(), vec![FontSrc])]);
    }

    #[test]
    fn to_json_mirrors_the_store() {
        let mut policy = Policy::new();
        policy.add("self", &[ScriptSrc]).add("img.example.com", &[ImgSrc]);
        policy.set(Flag::ReportTo, &["endpoint"]).unwrap();
        assert_eq!(
            policy.to_json(),
            json!({
                "rules": { "img.example.com": ["img-src"], "self": ["script-src"] },
                "flags": { "report-to": ["endpoint"] }
            })
        );
    }

    #[test]
    fn to_table_uses_the_sorted_views() {
        let mut policy = Policy::new();
        policy.add("img.example.com", &[ImgSrc]).add("self", &[ScriptSrc]);
        policy.set(Flag::UpgradeInsecureRequests, &[]).unwrap();
        assert_eq!(
            policy.to_table(),
            json!([
                ["rules", [["self", ["script-src"]], ["img.example.com", ["img-src"]]]],
                ["flags", [["upgrade-insecure-requests", []]]]
            ])
        );
    }

    #[test]
    fn rules_view_sorts_keywords_first() {
        let mut policy = Policy::new();
        policy
            .add("z.example.com", &[ScriptSrc])
            .add("self", &[ScriptSrc])
            .add("a.example.com", &[ScriptSrc])
            .add("unsafe-inline", &[ScriptSrc]);
        let sources: Vec<String> = policy.rules().into_iter().map(|(s, _)| s).collect();
        assert_eq!(sources, vec!["self", "unsafe-inline", "a.example.com", "z.example.com"]);
    }
}
