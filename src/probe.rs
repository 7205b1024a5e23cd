//! Boundary to the embedder-side probe executor.
//!
//! Snapshots come from small introspection scripts run inside the target
//! project's own runtime. The core never shells out itself: it hands a
//! `Probe` to whatever `ProbeRunner` the embedder wired in and consumes the
//! raw JSON that comes back. Script bodies are generated by the embedder
//! too; repositories only carry them through.

use std::future::Future;
use std::pin::Pin;

/// One introspection request: a stable label for logging plus the script
/// body to execute.
#[derive(Debug, Clone)]
pub struct Probe {
    pub label: &'static str,
    pub body: String,
}

impl Probe {
    pub fn new(label: &'static str, body: impl Into<String>) -> Self {
        Probe {
            label,
            body: body.into(),
        }
    }
}

pub type ProbeFuture = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send>>;

/// Executes probes against the target project. Implementations live in the
/// embedder (an artisan-based runner in practice, stubs in tests).
pub trait ProbeRunner: Send + Sync {
    fn run(&self, probe: Probe) -> ProbeFuture;
}
