//! View inventory backed by the `views` probe.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::probe::{Probe, ProbeRunner};
use crate::repository::{LoadError, Repository};

pub const VIEW_PROBE: &str = "views";

/// Files whose changes can add, remove or rename views.
pub static VIEW_GLOBS: &[&str] = &[
    "resources/views/*.blade.php",
    "resources/views/**/*.blade.php",
    "config/view.php",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewRecord {
    /// Project-relative path of the template file
    pub path: String,
    /// 1-based line to open the template at
    #[serde(default = "default_line")]
    pub line: u32,
}

fn default_line() -> u32 {
    1
}

/// Dotted view name to template record, replaced wholesale per reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ViewSnapshot {
    views: HashMap<String, ViewRecord>,
}

impl ViewSnapshot {
    pub fn get(&self, name: &str) -> Option<&ViewRecord> {
        self.views.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// All view names, for completion feeds. Unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

fn parse_views(raw: &str) -> Result<ViewSnapshot, LoadError> {
    let snapshot: ViewSnapshot = serde_json::from_str(raw)?;
    debug!("views repository: parsed {} views", snapshot.len());
    Ok(snapshot)
}

/// Builds the views repository around the given probe runner. `probe_body`
/// is the embedder-generated introspection script.
pub fn view_repository(
    project_root: impl Into<PathBuf>,
    runner: Arc<dyn ProbeRunner>,
    probe_body: impl Into<String>,
) -> Repository<ViewSnapshot> {
    let body: Arc<str> = Arc::from(probe_body.into());
    Repository::new(VIEW_PROBE, project_root, VIEW_GLOBS, move || {
        let runner = Arc::clone(&runner);
        let body = Arc::clone(&body);
        async move {
            let raw = runner
                .run(Probe::new(VIEW_PROBE, body.as_ref()))
                .await
                .map_err(LoadError::Probe)?;
            parse_views(&raw)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "welcome": {"path": "resources/views/welcome.blade.php"},
        "admin.dashboard": {"path": "resources/views/admin/dashboard.blade.php", "line": 3}
    }"#;

    #[test]
    fn test_parse_views() {
        let snapshot = parse_views(SAMPLE).expect("sample should parse");
        assert_eq!(snapshot.len(), 2);

        let welcome = snapshot.get("welcome").expect("welcome view");
        assert_eq!(welcome.path, "resources/views/welcome.blade.php");
        assert_eq!(welcome.line, 1);

        let dashboard = snapshot.get("admin.dashboard").expect("dashboard view");
        assert_eq!(dashboard.line, 3);

        assert!(snapshot.contains("welcome"));
        assert!(!snapshot.contains("missing.view"));
    }

    #[test]
    fn test_names_cover_every_view() {
        let snapshot = parse_views(SAMPLE).expect("sample should parse");
        let mut names: Vec<_> = snapshot.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["admin.dashboard", "welcome"]);
    }

    #[test]
    fn test_malformed_payload_is_a_load_error() {
        let error = parse_views("[1, 2, 3]").unwrap_err();
        assert!(matches!(error, LoadError::Malformed(_)));
    }

    #[test]
    fn test_empty_object_parses_to_empty_snapshot() {
        let snapshot = parse_views("{}").expect("empty object should parse");
        assert!(snapshot.is_empty());
    }
}
