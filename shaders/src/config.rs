//! Resolver configuration.

use std::path::{Path, PathBuf};

use crate::stage::ShaderFormat;

/// Where shaders live on disk and what the resolver produces.
///
/// # Example
///
/// ```ignore
/// let config = ResolverConfig::new("content")
///     .with_format(ShaderFormat::SpirV)
///     .with_entry_point("main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Root of the content tree.
    pub content_root: PathBuf,
    /// Entry point passed to the compiler and the device.
    pub entry_point: String,
    /// Bytecode format to produce and cache.
    pub format: ShaderFormat,
    /// Source directory, relative to the content root.
    pub source_dir: PathBuf,
    /// Compiled cache directory, relative to the content root.
    pub compiled_dir: PathBuf,
}

impl ResolverConfig {
    pub const DEFAULT_ENTRY_POINT: &'static str = "main";
    pub const DEFAULT_SOURCE_DIR: &'static str = "Shaders/Source";
    pub const DEFAULT_COMPILED_DIR: &'static str = "Shaders/Compiled";

    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            entry_point: Self::DEFAULT_ENTRY_POINT.to_string(),
            format: ShaderFormat::platform_preferred(),
            source_dir: PathBuf::from(Self::DEFAULT_SOURCE_DIR),
            compiled_dir: PathBuf::from(Self::DEFAULT_COMPILED_DIR),
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn with_format(mut self, format: ShaderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn with_compiled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.compiled_dir = dir.into();
        self
    }

    /// Absolute (or content-relative) source directory.
    pub fn source_root(&self) -> PathBuf {
        self.content_root.join(&self.source_dir)
    }

    /// Directory holding artifacts of the configured format.
    pub fn compiled_root(&self) -> PathBuf {
        self.content_root
            .join(&self.compiled_dir)
            .join(self.format.dir_name())
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::new("content");
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.format, ShaderFormat::platform_preferred());
        assert_eq!(config.source_root(), Path::new("content/Shaders/Source"));
    }

    #[test]
    fn test_compiled_root_per_format() {
        let config = ResolverConfig::new("root").with_format(ShaderFormat::Dxil);
        assert_eq!(config.compiled_root(), Path::new("root/Shaders/Compiled/DXIL"));

        let config = config
            .with_format(ShaderFormat::SpirV)
            .with_compiled_dir("cache");
        assert_eq!(config.compiled_root(), Path::new("root/cache/SPIRV"));
    }
}
