//! Shader hot reload.
//!
//! A `notify` watcher on the source directory feeds changed paths into a
//! bounded channel. The render loop drains it once per frame through
//! [`ShaderHotReloader::reload`], which recompiles every tracked shader whose
//! source modification time advanced. When the channel fills up, the
//! overflow flag makes the next poll rescan every tracked shader instead.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::SystemTime;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::cache::modified;
use crate::compiler::ShaderCompiler;
use crate::device::ShaderDevice;
use crate::error::{ShaderError, ShaderResult};
use crate::resolver::ShaderResolver;
use crate::stage::{ShaderResourceCounts, ShaderStage};

/// Pending change events kept before falling back to a full rescan.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A shader rebuilt after its source changed.
#[derive(Debug)]
pub struct ReloadedShader<S> {
    pub name: String,
    pub stage: ShaderStage,
    pub shader: S,
}

/// Producer side of the change queue.
#[derive(Debug, Clone)]
pub struct ShaderEventSender {
    tx: mpsc::SyncSender<PathBuf>,
    overflow: Arc<AtomicBool>,
}

impl ShaderEventSender {
    /// Queue a changed path. Never blocks; a full queue raises the overflow
    /// flag instead.
    pub fn push(&self, path: PathBuf) {
        match self.tx.try_send(path) {
            Ok(()) => {}
            Err(mpsc::TrySendError::Full(_)) => self.overflow.store(true, Ordering::Release),
            Err(mpsc::TrySendError::Disconnected(_)) => {}
        }
    }
}

#[derive(Debug)]
struct TrackedShader {
    stage: ShaderStage,
    resources: ShaderResourceCounts,
    source: PathBuf,
    last_modified: Option<SystemTime>,
}

/// Watches shader sources and rebuilds shaders whose source changed.
pub struct ShaderHotReloader {
    _watcher: Option<RecommendedWatcher>,
    events: mpsc::Receiver<PathBuf>,
    overflow: Arc<AtomicBool>,
    tracked: BTreeMap<String, TrackedShader>,
}

impl ShaderHotReloader {
    /// Start watching `source_dir`.
    pub fn new(source_dir: &Path) -> ShaderResult<Self> {
        let (mut reloader, sender) = Self::without_watcher(DEFAULT_EVENT_CAPACITY);

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        for path in event.paths {
                            sender.push(path);
                        }
                    }
                }
                Err(e) => log::warn!("Shader watcher error: {e}"),
            })
            .map_err(|e| ShaderError::io(source_dir, io::Error::other(e)))?;

        watcher
            .watch(source_dir, RecursiveMode::NonRecursive)
            .map_err(|e| ShaderError::io(source_dir, io::Error::other(e)))?;
        log::info!("Watching shader sources in {:?}", source_dir);

        reloader._watcher = Some(watcher);
        Ok(reloader)
    }

    /// A reloader fed only through the returned sender.
    pub fn without_watcher(capacity: usize) -> (Self, ShaderEventSender) {
        let (tx, events) = mpsc::sync_channel(capacity);
        let overflow = Arc::new(AtomicBool::new(false));
        let sender = ShaderEventSender {
            tx,
            overflow: overflow.clone(),
        };
        let reloader = Self {
            _watcher: None,
            events,
            overflow,
            tracked: BTreeMap::new(),
        };
        (reloader, sender)
    }

    /// Start tracking `name`. Names without a source file are ignored.
    pub fn track<C: ShaderCompiler>(
        &mut self,
        resolver: &ShaderResolver<C>,
        name: &str,
        stage: ShaderStage,
        resources: ShaderResourceCounts,
    ) {
        let Some(source) = resolver.source_path(name) else {
            log::debug!("Not tracking '{name}': no source file");
            return;
        };
        let last_modified = modified(&source);
        self.tracked.insert(
            name.to_string(),
            TrackedShader {
                stage,
                resources,
                source,
                last_modified,
            },
        );
    }

    pub fn untrack(&mut self, name: &str) {
        self.tracked.remove(name);
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.tracked.contains_key(name)
    }

    /// Drain pending events and return the tracked names whose source
    /// modification time advanced.
    pub fn poll_changed(&mut self) -> Vec<String> {
        let mut touched: BTreeSet<OsString> = BTreeSet::new();
        while let Ok(path) = self.events.try_recv() {
            if let Some(file_name) = path.file_name() {
                touched.insert(file_name.to_os_string());
            }
        }
        let rescan = self.overflow.swap(false, Ordering::AcqRel);
        if rescan {
            log::debug!("Shader event queue overflowed, rescanning all sources");
        }

        self.tracked
            .iter()
            .filter(|(_, tracked)| {
                rescan
                    || tracked
                        .source
                        .file_name()
                        .is_some_and(|f| touched.contains(f))
            })
            .filter(|(_, tracked)| match modified(&tracked.source) {
                Some(now) => tracked.last_modified.is_none_or(|last| now > last),
                None => false,
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Rebuild every changed shader.
    ///
    /// A shader that fails to rebuild is left out of the result so the caller
    /// keeps using the previous one; it is retried on its next change.
    pub fn reload<C: ShaderCompiler, D: ShaderDevice>(
        &mut self,
        resolver: &ShaderResolver<C>,
        device: &D,
    ) -> Vec<ReloadedShader<D::Shader>> {
        let mut reloaded = Vec::new();
        for name in self.poll_changed() {
            let Some(tracked) = self.tracked.get_mut(&name) else {
                continue;
            };
            match resolver.load_shader_with_stage(device, &name, tracked.stage, tracked.resources)
            {
                Ok(shader) => {
                    tracked.last_modified = modified(&tracked.source);
                    log::info!("Reloaded shader '{name}'");
                    reloaded.push(ReloadedShader {
                        name,
                        stage: tracked.stage,
                        shader,
                    });
                }
                Err(_) => log::warn!("Keeping previous version of '{name}'"),
            }
        }
        reloaded
    }
}
