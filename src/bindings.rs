//! Container binding inventory backed by the `bindings` probe.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::probe::{Probe, ProbeRunner};
use crate::repository::{LoadError, Repository};

pub const BINDING_PROBE: &str = "bindings";

/// Files whose changes can register or rebind container entries.
pub static BINDING_GLOBS: &[&str] = &[
    "app/Providers/*.php",
    "app/Providers/**/*.php",
    "bootstrap/providers.php",
    "bootstrap/app.php",
    "config/app.php",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingRecord {
    /// Concrete class the abstract resolves to, absent for closure bindings
    #[serde(rename = "class", default)]
    pub concrete: Option<String>,
    /// Whether the binding was registered as a singleton
    #[serde(default)]
    pub singleton: bool,
    /// File the registration lives in
    pub uri: String,
    /// 1-based line of the registration
    #[serde(rename = "lineNumber", default = "default_line")]
    pub line_number: u32,
}

fn default_line() -> u32 {
    1
}

/// Abstract binding key to its registration. The probe reports the
/// registration the container would actually use, so rebinding collapses
/// to one record per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BindingSnapshot {
    bindings: HashMap<String, BindingRecord>,
}

impl BindingSnapshot {
    pub fn get(&self, key: &str) -> Option<&BindingRecord> {
        self.bindings.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// All binding keys, for completion feeds. Unordered.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(|key| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn parse_bindings(raw: &str) -> Result<BindingSnapshot, LoadError> {
    let snapshot: BindingSnapshot = serde_json::from_str(raw)?;
    debug!("bindings repository: parsed {} bindings", snapshot.len());
    Ok(snapshot)
}

/// Builds the bindings repository around the given probe runner.
pub fn binding_repository(
    project_root: impl Into<PathBuf>,
    runner: Arc<dyn ProbeRunner>,
    probe_body: impl Into<String>,
) -> Repository<BindingSnapshot> {
    let body: Arc<str> = Arc::from(probe_body.into());
    Repository::new(BINDING_PROBE, project_root, BINDING_GLOBS, move || {
        let runner = Arc::clone(&runner);
        let body = Arc::clone(&body);
        async move {
            let raw = runner
                .run(Probe::new(BINDING_PROBE, body.as_ref()))
                .await
                .map_err(LoadError::Probe)?;
            parse_bindings(&raw)
        }
    })
}
