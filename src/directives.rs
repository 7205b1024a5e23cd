//! Custom template directive inventory backed by the `blade-directives`
//! probe.
//!
//! Unlike the other probes this one reports a list, not a map; directive
//! registration order matters at runtime but not here, so the list folds
//! into a name-keyed snapshot with the last registration winning.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::matcher::{ArgumentSelector, Signature};
use crate::probe::{Probe, ProbeRunner};
use crate::repository::{LoadError, Repository};

pub const DIRECTIVE_PROBE: &str = "blade-directives";

/// Files whose changes can register or retire custom directives.
pub static DIRECTIVE_GLOBS: &[&str] = &["app/*.php", "app/**/*.php"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectiveRecord {
    /// Directive name without the leading `@`
    pub name: String,
    #[serde(rename = "hasParams", default)]
    pub has_params: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSnapshot {
    directives: HashMap<String, DirectiveRecord>,
}

impl DirectiveSnapshot {
    pub fn get(&self, name: &str) -> Option<&DirectiveRecord> {
        self.directives.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// All directive names, for completion feeds. Unordered, no `@` prefix.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directives.keys().map(|name| name.as_str())
    }

    /// Signatures for the parameterized directives, shaped for [`detect`].
    /// Parameterless directives never form a call so they have no signature.
    ///
    /// [`detect`]: crate::matcher::detect
    pub fn signatures(&self) -> Vec<Signature> {
        self.directives
            .values()
            .filter(|record| record.has_params)
            .map(|record| {
                Signature::bare_call(
                    &[format!("@{}", record.name).as_str()],
                    ArgumentSelector::Index(0),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

fn parse_directives(raw: &str) -> Result<DirectiveSnapshot, LoadError> {
    let records: Vec<DirectiveRecord> = serde_json::from_str(raw)?;
    debug!("directives repository: parsed {} directives", records.len());
    let mut directives = HashMap::with_capacity(records.len());
    for record in records {
        directives.insert(record.name.clone(), record);
    }
    Ok(DirectiveSnapshot { directives })
}

/// Builds the custom directives repository around the given probe runner.
pub fn directive_repository(
    project_root: impl Into<PathBuf>,
    runner: Arc<dyn ProbeRunner>,
    probe_body: impl Into<String>,
) -> Repository<DirectiveSnapshot> {
    let body: Arc<str> = Arc::from(probe_body.into());
    Repository::new(DIRECTIVE_PROBE, project_root, DIRECTIVE_GLOBS, move || {
        let runner = Arc::clone(&runner);
        let body = Arc::clone(&body);
        async move {
            let raw = runner
                .run(Probe::new(DIRECTIVE_PROBE, body.as_ref()))
                .await
                .map_err(LoadError::Probe)?;
            parse_directives(&raw)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::detect;

    const SAMPLE: &str = r#"[
        {"name": "datetime", "hasParams": true},
        {"name": "money", "hasParams": true},
        {"name": "admin"}
    ]"#;

    fn sample() -> DirectiveSnapshot {
        parse_directives(SAMPLE).expect("sample should parse")
    }

    #[test]
    fn test_parse_directives() {
        let snapshot = sample();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.get("datetime").is_some_and(|d| d.has_params));
        assert!(snapshot.get("admin").is_some_and(|d| !d.has_params));
        assert!(!snapshot.contains("endadmin"));
    }

    #[test]
    fn test_duplicate_names_keep_the_last_record() {
        let snapshot = parse_directives(
            r#"[{"name": "badge"}, {"name": "badge", "hasParams": true}]"#,
        )
        .expect("sample should parse");
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("badge").is_some_and(|d| d.has_params));
    }

    #[test]
    fn test_signatures_cover_only_parameterized_directives() {
        let snapshot = sample();
        let signatures = snapshot.signatures();
        assert_eq!(signatures.len(), 2);

        let matches = detect("@datetime($user->created_at)\n@admin", &signatures);
        assert_eq!(matches.len(), 1);

        let literal = detect("@money('12.50')", &signatures);
        assert_eq!(literal.len(), 1);
        assert_eq!(literal[0].literal(), Some("12.50"));
    }

    #[test]
    fn test_malformed_payload_is_a_load_error() {
        let error = parse_directives(r#"{"datetime": true}"#).unwrap_err();
        assert!(matches!(error, LoadError::Malformed(_)));
    }
}
