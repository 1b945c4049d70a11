//! Dev-mode project with live reload
//!
//! Module directories are watched for changes. A change only marks the
//! build as stale; the rebuild happens lazily on the next request, so a
//! request that follows a source edit always sees the edited content.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use devloop_domain::error::{Error, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use super::build::{BuildState, build_project};
use super::manifest::ProjectManifest;

/// A project module served in dev mode
pub struct DevModeProject {
    root: PathBuf,
    manifest: ProjectManifest,
    module: String,
    state: ArcSwap<BuildState>,
    dirty: Arc<AtomicBool>,
    rebuild_lock: Mutex<()>,
    watcher: Option<RecommendedWatcher>,
}

impl DevModeProject {
    /// Load the project at `root`, build `module` and start watching sources
    ///
    /// A build failure does not fail the call; it is served as an error
    /// until the sources are fixed.
    pub fn open(root: impl Into<PathBuf>, module: impl Into<String>) -> Result<Self> {
        let root = root.into();
        let module = module.into();
        let manifest = ProjectManifest::load(&root)?;
        let watched = manifest.modules_for(&module)?;

        let initial = build_project(&root, &manifest, &module);
        let dirty = Arc::new(AtomicBool::new(false));
        let watcher = match watch_modules(&root, &watched, Arc::clone(&dirty)) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!(error = %e, "File watching unavailable, rebuilding on every request");
                None
            }
        };

        info!(
            project = %manifest.project.name,
            module = %module,
            modules = ?watched,
            "Dev mode started"
        );
        Ok(Self {
            root,
            manifest,
            module,
            state: ArcSwap::from_pointee(initial),
            dirty,
            rebuild_lock: Mutex::new(()),
            watcher,
        })
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parsed manifest
    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// Module being served
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Mark the build as stale
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Current build, rebuilding first if sources changed
    pub fn current(&self) -> Arc<BuildState> {
        let stale = self.watcher.is_none() || self.dirty.swap(false, Ordering::SeqCst);
        if stale {
            let _guard = self
                .rebuild_lock
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            debug!(module = %self.module, "Sources changed, rebuilding");
            self.state
                .store(Arc::new(build_project(&self.root, &self.manifest, &self.module)));
        }
        self.state.load_full()
    }
}

impl std::fmt::Debug for DevModeProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevModeProject")
            .field("root", &self.root)
            .field("module", &self.module)
            .field("watching", &self.watcher.is_some())
            .finish_non_exhaustive()
    }
}

fn watch_modules(
    root: &Path,
    modules: &[String],
    dirty: Arc<AtomicBool>,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: std::result::Result<Event, notify::Error>| match res {
            Ok(event) if !matches!(event.kind, EventKind::Access(_)) => {
                dirty.store(true, Ordering::SeqCst);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "File watch error");
                dirty.store(true, Ordering::SeqCst);
            }
        },
        Config::default(),
    )
    .map_err(|e| Error::infrastructure(format!("Failed to create file watcher: {e}")))?;

    for module in modules {
        let dir = root.join(module);
        watcher
            .watch(&dir, RecursiveMode::Recursive)
            .map_err(|e| {
                Error::infrastructure(format!("Failed to watch {}: {e}", dir.display()))
            })?;
        debug!(dir = %dir.display(), "Watching module sources");
    }
    Ok(watcher)
}
