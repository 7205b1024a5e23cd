//! Ability inventory backed by the `abilities` probe.
//!
//! Abilities come from two places at runtime: closures registered through
//! `Gate::define` and policy methods discovered per model class. The probe
//! flattens both into one list, so a single ability name can carry several
//! records. Correlation against the model argument of a call site happens
//! here, in [`AbilitySnapshot::accepts`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::parser::{Node, NodeKind};
use crate::probe::{Probe, ProbeRunner};
use crate::repository::{LoadError, Repository};

pub const ABILITY_PROBE: &str = "abilities";

/// Files whose changes can register or retire abilities.
pub static ABILITY_GLOBS: &[&str] = &[
    "app/Providers/*.php",
    "app/Providers/**/*.php",
    "app/Policies/*.php",
    "app/Policies/**/*.php",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbilityRecord {
    /// Ability name as passed to `Gate::define` or derived from a policy method
    pub key: String,
    /// Fully qualified model class the ability is scoped to, absent for
    /// closure-based abilities
    #[serde(default)]
    pub model_class: Option<String>,
    /// Policy class the ability lives on, absent for closure-based abilities
    #[serde(default)]
    pub policy_class: Option<String>,
    /// File the definition lives in
    pub uri: String,
    /// 1-based line of the definition
    #[serde(rename = "lineNumber", default = "default_line")]
    pub line_number: u32,
}

fn default_line() -> u32 {
    1
}

/// Ability name to its definitions, replaced wholesale per reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AbilitySnapshot {
    abilities: HashMap<String, Vec<AbilityRecord>>,
}

impl AbilitySnapshot {
    /// All records registered under `key`, empty when the ability is unknown.
    pub fn get(&self, key: &str) -> &[AbilityRecord] {
        self.abilities.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn defines(&self, key: &str) -> bool {
        self.abilities.contains_key(key)
    }

    /// Whether some definition of `key` accepts the given model argument.
    ///
    /// Without a model the call can only satisfy a closure-based ability, so
    /// a record with no policy class must exist. With a model the class must
    /// match one record exactly or by trailing short name, which lets call
    /// sites that name `Post` line up with a registration under
    /// `App\Models\Post`.
    pub fn accepts(&self, key: &str, model_class: Option<&str>) -> bool {
        let records = self.get(key);
        match model_class {
            None => records.iter().any(|record| record.policy_class.is_none()),
            Some(class) => records.iter().any(|record| {
                record
                    .model_class
                    .as_deref()
                    .is_some_and(|registered| class_matches(registered, class))
            }),
        }
    }

    /// All ability names, for completion feeds. Unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(|key| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

/// Case-sensitive class comparison that tolerates one side being written
/// without its namespace.
fn class_matches(registered: &str, given: &str) -> bool {
    if registered == given {
        return true;
    }
    registered
        .strip_suffix(given)
        .is_some_and(|prefix| prefix.ends_with('\\'))
        || given
            .strip_suffix(registered)
            .is_some_and(|prefix| prefix.ends_with('\\'))
}

/// Reads the model class named by an authorization call's companion
/// argument. Handles `Post::class`, a plain class-name string, and arrays
/// of the `[$post, 'extra']` shape where the class reference can sit
/// anywhere; the last recognizable entry wins. Variables and other opaque
/// expressions yield `None`.
pub fn model_class_argument(node: &Node) -> Option<String> {
    fn class_of(node: &Node) -> Option<String> {
        match &node.kind {
            NodeKind::StaticCall { class, method, .. } if method == "class" => Some(class.clone()),
            NodeKind::String(value) if !value.is_empty() => Some(value.clone()),
            _ => None,
        }
    }

    match &node.kind {
        NodeKind::Array(entries) => entries.iter().rev().find_map(|entry| class_of(&entry.value)),
        _ => class_of(node),
    }
}

fn parse_abilities(raw: &str) -> Result<AbilitySnapshot, LoadError> {
    let snapshot: AbilitySnapshot = serde_json::from_str(raw)?;
    debug!("abilities repository: parsed {} abilities", snapshot.len());
    Ok(snapshot)
}

/// Builds the abilities repository around the given probe runner.
pub fn ability_repository(
    project_root: impl Into<PathBuf>,
    runner: Arc<dyn ProbeRunner>,
    probe_body: impl Into<String>,
) -> Repository<AbilitySnapshot> {
    let body: Arc<str> = Arc::from(probe_body.into());
    Repository::new(ABILITY_PROBE, project_root, ABILITY_GLOBS, move || {
        let runner = Arc::clone(&runner);
        let body = Arc::clone(&body);
        async move {
            let raw = runner
                .run(Probe::new(ABILITY_PROBE, body.as_ref()))
                .await
                .map_err(LoadError::Probe)?;
            parse_abilities(&raw)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::detect;
    use crate::signatures::ABILITY_SIGNATURES;

    const SAMPLE: &str = r#"{
        "edit-post": [{
            "key": "edit-post",
            "model_class": "App\\Post",
            "policy_class": "App\\Policies\\PostPolicy",
            "uri": "app/Policies/PostPolicy.php",
            "lineNumber": 24
        }],
        "view-dashboard": [{
            "key": "view-dashboard",
            "uri": "app/Providers/AuthServiceProvider.php",
            "lineNumber": 31
        }],
        "update": [
            {
                "key": "update",
                "model_class": "App\\Models\\Post",
                "policy_class": "App\\Policies\\PostPolicy",
                "uri": "app/Policies/PostPolicy.php",
                "lineNumber": 40
            },
            {
                "key": "update",
                "model_class": "App\\Models\\Comment",
                "policy_class": "App\\Policies\\CommentPolicy",
                "uri": "app/Policies/CommentPolicy.php",
                "lineNumber": 18
            }
        ]
    }"#;

    fn sample() -> AbilitySnapshot {
        parse_abilities(SAMPLE).expect("sample should parse")
    }

    #[test]
    fn test_parse_abilities() {
        let snapshot = sample();
        assert_eq!(snapshot.len(), 3);

        let records = snapshot.get("edit-post");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model_class.as_deref(), Some("App\\Post"));
        assert_eq!(
            records[0].policy_class.as_deref(),
            Some("App\\Policies\\PostPolicy")
        );
        assert_eq!(records[0].line_number, 24);

        let closure = snapshot.get("view-dashboard");
        assert_eq!(closure[0].model_class, None);
        assert_eq!(closure[0].policy_class, None);
    }

    #[test]
    fn test_unknown_ability_has_no_records() {
        let snapshot = sample();
        assert!(snapshot.get("delete-post").is_empty());
        assert!(!snapshot.defines("delete-post"));
    }

    #[test]
    fn test_accepts_without_model_requires_a_closure_ability() {
        let snapshot = sample();
        assert!(snapshot.accepts("view-dashboard", None));
        // edit-post only exists on a policy, so a bare check cannot reach it
        assert!(!snapshot.accepts("edit-post", None));
        assert!(!snapshot.accepts("delete-post", None));
    }

    #[test]
    fn test_accepts_matches_model_class_exactly_or_by_short_name() {
        let snapshot = sample();
        assert!(snapshot.accepts("edit-post", Some("App\\Post")));
        assert!(snapshot.accepts("edit-post", Some("Post")));
        assert!(!snapshot.accepts("edit-post", Some("App\\Comment")));
        assert!(!snapshot.accepts("edit-post", Some("ost")));

        assert!(snapshot.accepts("update", Some("App\\Models\\Comment")));
        assert!(snapshot.accepts("update", Some("Comment")));
        assert!(!snapshot.accepts("update", Some("User")));
    }

    #[test]
    fn test_accepts_without_model_on_ambiguous_ability() {
        let snapshot = sample();
        // both update records are policy-backed
        assert!(!snapshot.accepts("update", None));
    }

    #[test]
    fn test_model_class_argument_from_detected_call() {
        let text = "<?php Gate::allows('edit-post', Post::class);";
        let matches = detect(text, &ABILITY_SIGNATURES);
        assert_eq!(matches.len(), 1);

        let sibling = matches[0].sibling(1).expect("model argument");
        assert_eq!(model_class_argument(&sibling.value).as_deref(), Some("Post"));
    }

    #[test]
    fn test_model_class_argument_shapes() {
        let document = crate::parser::parse(
            "<?php align('a', Post::class, 'App\\Post', [$post, 'title'], [Comment::class], $post);",
        );
        let calls = document.calls();
        let arguments = calls[0].arguments();

        assert_eq!(model_class_argument(&arguments[1].value).as_deref(), Some("Post"));
        assert_eq!(
            model_class_argument(&arguments[2].value).as_deref(),
            Some("App\\Post")
        );
        // arrays scan from the back for the class-bearing entry
        assert_eq!(model_class_argument(&arguments[3].value).as_deref(), Some("title"));
        assert_eq!(
            model_class_argument(&arguments[4].value).as_deref(),
            Some("Comment")
        );
        assert_eq!(model_class_argument(&arguments[5].value), None);
    }

    #[test]
    fn test_malformed_payload_is_a_load_error() {
        let error = parse_abilities("\"nope\"").unwrap_err();
        assert!(matches!(error, LoadError::Malformed(_)));
    }
}
