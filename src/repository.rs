//! Generic pattern-invalidated snapshot cache.
//!
//! A `Repository` owns one wholesale-replaced snapshot of externally
//! introspected data. `get()` never blocks and never fails: before the
//! first load completes it returns the default (empty) snapshot, and the
//! first access schedules the initial load in the background. Filesystem
//! events funnel through `on_path_changed`, which invalidates only when the
//! changed path matches one of the repository's glob patterns. At most one
//! reload is in flight at a time; invalidations arriving during a reload
//! coalesce into exactly one follow-up reload.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Why a (re)load produced no snapshot. Parse skips and signature misses
/// are normal negatives elsewhere in the crate and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The probe could not be executed, or its invocation failed.
    #[error("probe execution failed: {0:#}")]
    Probe(anyhow::Error),
    /// The probe ran but its output did not fit the snapshot schema.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Boxed future returned by snapshot loaders.
pub type LoadFuture<S> = Pin<Box<dyn Future<Output = Result<S, LoadError>> + Send>>;

/// Produces a fresh snapshot; called once per (re)load. Closures returning
/// a future implement this via the blanket impl.
pub trait SnapshotLoader<S>: Send + Sync + 'static {
    fn load(&self) -> LoadFuture<S>;
}

impl<S, F, Fut> SnapshotLoader<S> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, LoadError>> + Send + 'static,
{
    fn load(&self) -> LoadFuture<S> {
        Box::pin(self())
    }
}

/// Reload lifecycle. `LoadingDirty` remembers that more invalidations
/// arrived while a reload was running; any number of them collapse into
/// one follow-up pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReloadState {
    /// No load has run or been scheduled yet
    Unloaded,
    Idle,
    Loading,
    LoadingDirty,
}

struct Inner<S> {
    name: &'static str,
    project_root: PathBuf,
    patterns: Vec<glob::Pattern>,
    loader: Box<dyn SnapshotLoader<S>>,
    snapshot: ArcSwap<S>,
    state: Mutex<ReloadState>,
    error_sink: Mutex<Box<dyn Fn(&LoadError) + Send + Sync>>,
}

pub struct Repository<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Repository {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Default + Send + Sync + 'static> Repository<S> {
    /// Creates a repository with an empty snapshot. `patterns` are glob
    /// patterns relative to `project_root`; an invalid pattern is logged
    /// and skipped rather than failing construction.
    pub fn new(
        name: &'static str,
        project_root: impl Into<PathBuf>,
        patterns: &[&str],
        loader: impl SnapshotLoader<S>,
    ) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|raw| match glob::Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(
                        "{} repository: ignoring invalid invalidation pattern {:?}: {}",
                        name, raw, e
                    );
                    None
                }
            })
            .collect();
        Repository {
            inner: Arc::new(Inner {
                name,
                project_root: project_root.into(),
                patterns,
                loader: Box::new(loader),
                snapshot: ArcSwap::from_pointee(S::default()),
                state: Mutex::new(ReloadState::Unloaded),
                error_sink: Mutex::new(Box::new(move |error: &LoadError| {
                    warn!("{} repository: reload failed: {}", name, error);
                })),
            }),
        }
    }

    /// Replaces the default failure reporting (a `tracing` warning) with a
    /// custom sink.
    pub fn set_error_sink(&self, sink: impl Fn(&LoadError) + Send + Sync + 'static) {
        let mut guard = self
            .inner
            .error_sink
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *guard = Box::new(sink);
    }

    /// Best-available snapshot, without blocking. The very first access
    /// also schedules the initial load.
    pub fn get(&self) -> Arc<S> {
        let schedule = {
            let mut state = self.lock_state();
            if *state == ReloadState::Unloaded {
                *state = ReloadState::Loading;
                true
            } else {
                false
            }
        };
        if schedule {
            self.spawn_reload();
        }
        self.inner.snapshot.load_full()
    }

    /// Marks the snapshot stale and schedules a reload. While a reload is
    /// already in flight this only queues a single follow-up pass, however
    /// often it is called.
    pub fn invalidate(&self) {
        let schedule = {
            let mut state = self.lock_state();
            match *state {
                ReloadState::Loading => {
                    *state = ReloadState::LoadingDirty;
                    false
                }
                ReloadState::LoadingDirty => false,
                ReloadState::Unloaded | ReloadState::Idle => {
                    *state = ReloadState::Loading;
                    true
                }
            }
        };
        if schedule {
            self.spawn_reload();
        }
    }

    /// Feeds one filesystem event. The path is relativized against the
    /// project root and checked against the invalidation patterns; only a
    /// match invalidates. Returns whether it did.
    pub fn on_path_changed(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.inner.project_root).unwrap_or(path);
        let hit = self
            .inner
            .patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative));
        if hit {
            debug!(
                "{} repository: {} invalidates the snapshot",
                self.inner.name,
                relative.display()
            );
            self.invalidate();
        }
        hit
    }

    /// Whether a reload (or a queued follow-up) is currently in flight.
    pub fn reload_in_flight(&self) -> bool {
        matches!(
            *self.lock_state(),
            ReloadState::Loading | ReloadState::LoadingDirty
        )
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    fn lock_state(&self) -> MutexGuard<'_, ReloadState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs loads on the ambient tokio runtime. Outside a runtime the load
    /// is skipped with a warning; `get()` keeps returning the current
    /// snapshot either way.
    fn spawn_reload(&self) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    "{} repository: no async runtime available, skipping reload",
                    self.inner.name
                );
                let mut state = self.lock_state();
                *state = ReloadState::Unloaded;
                return;
            }
        };
        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            loop {
                debug!("{} repository: reloading snapshot", inner.name);
                match inner.loader.load().await {
                    Ok(snapshot) => {
                        inner.snapshot.store(Arc::new(snapshot));
                        debug!("{} repository: snapshot installed", inner.name);
                    }
                    Err(error) => {
                        // previous snapshot stays in place
                        let sink = inner.error_sink.lock().unwrap_or_else(|e| e.into_inner());
                        (*sink)(&error);
                    }
                }
                let run_again = {
                    let mut state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
                    if *state == ReloadState::LoadingDirty {
                        *state = ReloadState::Loading;
                        true
                    } else {
                        *state = ReloadState::Idle;
                        false
                    }
                };
                if !run_again {
                    break;
                }
            }
        });
    }
}
