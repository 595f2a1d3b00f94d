//! On-disk bytecode cache.
//!
//! Artifacts live at `<compiled_root>/<stage>/<name>.<ext>`, one tree per
//! format, so one source compiled for several stages keeps one artifact per
//! stage. An artifact is fresh when its source is missing or not newer than
//! the artifact. There is no eviction.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{ShaderError, ShaderResult};
use crate::stage::{ShaderFormat, ShaderStage};

/// Compiled shader cache for a single format.
#[derive(Debug, Clone)]
pub struct ShaderCache {
    root: PathBuf,
    format: ShaderFormat,
}

impl ShaderCache {
    pub fn new(root: impl Into<PathBuf>, format: ShaderFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> ShaderFormat {
        self.format
    }

    /// Path the `stage` artifact for `name` is cached at.
    pub fn artifact_path(&self, name: &str, stage: ShaderStage) -> PathBuf {
        self.root
            .join(stage.as_str())
            .join(format!("{name}.{}", self.format.extension()))
    }

    /// Whether `artifact` can be used without recompiling `source`.
    pub fn is_fresh(source: Option<&Path>, artifact: &Path) -> bool {
        let Some(artifact_time) = modified(artifact) else {
            return false;
        };
        match source {
            None => true,
            Some(source) => match modified(source) {
                Some(source_time) => source_time <= artifact_time,
                // Unknown source time: trust the cache only if the source is gone.
                None => !source.exists(),
            },
        }
    }

    pub fn read(&self, path: &Path) -> ShaderResult<Vec<u8>> {
        fs::read(path).map_err(|e| ShaderError::io(path, e))
    }

    /// Persist `code` for `name` and `stage`. Best effort: failures are
    /// logged and `None` is returned.
    pub fn store(&self, name: &str, stage: ShaderStage, code: &[u8]) -> Option<PathBuf> {
        let path = self.artifact_path(name, stage);
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            log::warn!("Failed to create shader cache dir {:?}: {e}", parent);
            return None;
        }
        match fs::write(&path, code) {
            Ok(()) => {
                log::debug!("Cached {} bytes at {:?}", code.len(), path);
                Some(path)
            }
            Err(e) => {
                log::warn!("Failed to write shader cache {:?}: {e}", path);
                None
            }
        }
    }
}

/// Modification time of `path`, if it exists and the platform reports one.
pub(crate) fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, time: SystemTime) {
        fs::write(path, b"x").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn test_artifact_path() {
        let cache = ShaderCache::new("c/SPIRV", ShaderFormat::SpirV);
        assert_eq!(
            cache.artifact_path("RawTriangle.vert", ShaderStage::Vertex),
            Path::new("c/SPIRV/vertex/RawTriangle.vert.spv")
        );
    }

    #[test]
    fn test_artifact_path_differs_per_stage() {
        let cache = ShaderCache::new("c/DXIL", ShaderFormat::Dxil);
        let vertex = cache.artifact_path("Quad", ShaderStage::Vertex);
        let fragment = cache.artifact_path("Quad", ShaderStage::Fragment);
        assert_ne!(vertex, fragment);
        assert_eq!(fragment, Path::new("c/DXIL/fragment/Quad.dxil"));
    }

    #[test]
    fn test_freshness() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.vert.wgsl");
        let artifact = dir.path().join("a.vert.spv");
        let base = SystemTime::now() - Duration::from_secs(3600);

        assert!(!ShaderCache::is_fresh(None, &artifact));

        touch(&artifact, base);
        assert!(ShaderCache::is_fresh(None, &artifact));
        assert!(ShaderCache::is_fresh(Some(&source), &artifact));

        touch(&source, base);
        assert!(ShaderCache::is_fresh(Some(&source), &artifact));

        touch(&source, base + Duration::from_secs(10));
        assert!(!ShaderCache::is_fresh(Some(&source), &artifact));
    }

    #[test]
    fn test_store_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ShaderCache::new(dir.path().join("Compiled/MSL"), ShaderFormat::Msl);
        let path = cache
            .store("Quad.frag", ShaderStage::Fragment, &[1, 2, 3])
            .unwrap();
        assert_eq!(path, dir.path().join("Compiled/MSL/fragment/Quad.frag.msl"));
        assert_eq!(cache.read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_store_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not dir").unwrap();
        let cache = ShaderCache::new(blocker.join("SPIRV"), ShaderFormat::SpirV);
        assert!(cache.store("x.vert", ShaderStage::Vertex, &[0]).is_none());
    }

    #[test]
    fn test_read_missing() {
        let cache = ShaderCache::new("nowhere", ShaderFormat::SpirV);
        let err = cache.read(Path::new("nowhere/x.spv")).unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }
}
