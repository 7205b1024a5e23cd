//! Model attribute inventory backed by the `models` probe.
//!
//! The probe walks the project's model classes through the framework's own
//! schema introspection, so attribute names and types reflect the live
//! database columns plus casts, not a static guess. After every successful
//! load the snapshot is handed to an optional [`DocblockWriter`] so the
//! embedder can mirror it into IDE-readable annotations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::probe::{Probe, ProbeRunner};
use crate::repository::{LoadError, Repository};

pub const MODEL_PROBE: &str = "models";

/// Files whose changes can alter model attributes or relations.
pub static MODEL_GLOBS: &[&str] = &[
    "app/*.php",
    "app/Models/*.php",
    "app/Models/**/*.php",
    "database/migrations/*.php",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelAttribute {
    /// Column or cast name
    pub name: String,
    /// Reported type, absent when the schema driver gives none
    #[serde(rename = "type", default)]
    pub attribute_type: Option<String>,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelRecord {
    /// File the model class lives in
    pub uri: String,
    /// 1-based line of the class declaration
    #[serde(rename = "lineNumber", default = "default_line")]
    pub line_number: u32,
    #[serde(default)]
    pub attributes: Vec<ModelAttribute>,
    /// Relation method names declared on the model
    #[serde(default)]
    pub relations: Vec<String>,
}

fn default_line() -> u32 {
    1
}

/// Fully qualified model class to its record, replaced wholesale per reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ModelSnapshot {
    models: HashMap<String, ModelRecord>,
}

impl ModelSnapshot {
    pub fn get(&self, class: &str) -> Option<&ModelRecord> {
        self.models.get(class)
    }

    /// Lookup by fully qualified name or by bare short name. A short name
    /// that several namespaces declare resolves to whichever record the map
    /// yields first.
    pub fn find(&self, name: &str) -> Option<&ModelRecord> {
        if let Some(record) = self.models.get(name) {
            return Some(record);
        }
        self.models.iter().find_map(|(class, record)| {
            class
                .strip_suffix(name)
                .is_some_and(|prefix| prefix.ends_with('\\'))
                .then_some(record)
        })
    }

    pub fn attributes_of(&self, class: &str) -> &[ModelAttribute] {
        self.find(class)
            .map(|record| record.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// All model class names, for completion feeds. Unordered.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(|class| class.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Side channel for mirroring model metadata into annotation files. Runs on
/// the reload task after every successful parse, never on the caller.
pub trait DocblockWriter: Send + Sync {
    fn write_docblocks(&self, snapshot: &ModelSnapshot);
}

fn parse_models(raw: &str) -> Result<ModelSnapshot, LoadError> {
    let snapshot: ModelSnapshot = serde_json::from_str(raw)?;
    debug!("models repository: parsed {} models", snapshot.len());
    Ok(snapshot)
}

/// Builds the models repository around the given probe runner. A
/// [`DocblockWriter`] given here observes every snapshot the repository
/// installs; failed loads never reach it.
pub fn model_repository(
    project_root: impl Into<PathBuf>,
    runner: Arc<dyn ProbeRunner>,
    probe_body: impl Into<String>,
    docblocks: Option<Arc<dyn DocblockWriter>>,
) -> Repository<ModelSnapshot> {
    let body: Arc<str> = Arc::from(probe_body.into());
    Repository::new(MODEL_PROBE, project_root, MODEL_GLOBS, move || {
        let runner = Arc::clone(&runner);
        let body = Arc::clone(&body);
        let docblocks = docblocks.clone();
        async move {
            let raw = runner
                .run(Probe::new(MODEL_PROBE, body.as_ref()))
                .await
                .map_err(LoadError::Probe)?;
            let snapshot = parse_models(&raw)?;
            if let Some(writer) = docblocks {
                writer.write_docblocks(&snapshot);
            }
            Ok(snapshot)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "App\\Models\\Post": {
            "uri": "app/Models/Post.php",
            "lineNumber": 11,
            "attributes": [
                {"name": "id", "type": "bigint"},
                {"name": "title", "type": "string"},
                {"name": "published_at", "type": "datetime", "nullable": true}
            ],
            "relations": ["author", "comments"]
        },
        "App\\Models\\User": {
            "uri": "app/Models/User.php",
            "lineNumber": 14
        }
    }"#;

    fn sample() -> ModelSnapshot {
        parse_models(SAMPLE).expect("sample should parse")
    }

    #[test]
    fn test_parse_models() {
        let snapshot = sample();
        assert_eq!(snapshot.len(), 2);

        let post = snapshot.get("App\\Models\\Post").expect("post model");
        assert_eq!(post.uri, "app/Models/Post.php");
        assert_eq!(post.line_number, 11);
        assert_eq!(post.attributes.len(), 3);
        assert_eq!(post.attributes[0].name, "id");
        assert_eq!(post.attributes[0].attribute_type.as_deref(), Some("bigint"));
        assert!(!post.attributes[0].nullable);
        assert!(post.attributes[2].nullable);
        assert_eq!(post.relations, vec!["author", "comments"]);

        let user = snapshot.get("App\\Models\\User").expect("user model");
        assert!(user.attributes.is_empty());
        assert!(user.relations.is_empty());
    }

    #[test]
    fn test_find_by_short_name() {
        let snapshot = sample();
        assert!(snapshot.find("App\\Models\\Post").is_some());
        assert_eq!(
            snapshot.find("Post").map(|record| record.uri.as_str()),
            Some("app/Models/Post.php")
        );
        // a bare suffix that crosses a namespace boundary is not a short name
        assert!(snapshot.find("ost").is_none());
        assert!(snapshot.find("Comment").is_none());
    }

    #[test]
    fn test_attributes_of_unknown_model_is_empty() {
        let snapshot = sample();
        assert!(snapshot.attributes_of("App\\Models\\Missing").is_empty());
        assert_eq!(snapshot.attributes_of("Post").len(), 3);
    }

    #[test]
    fn test_malformed_payload_is_a_load_error() {
        let error = parse_models("[]").unwrap_err();
        assert!(matches!(error, LoadError::Malformed(_)));
    }
}
