//! Shader resolution: cache lookup, compilation and device hand-off.

use std::path::PathBuf;

use crate::cache::ShaderCache;
use crate::compiler::{CompileRequest, ShaderCompiler};
use crate::config::ResolverConfig;
use crate::device::ShaderDevice;
use crate::error::{ShaderError, ShaderResult};
use crate::stage::{
    ShaderCreateInfo, ShaderFormat, ShaderResourceCounts, ShaderStage, infer_stage,
};

/// Where resolved bytecode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderOrigin {
    /// Read from a fresh cached artifact.
    Cache,
    /// Compiled from source and written to the cache.
    Compiled,
}

/// Bytecode ready to hand to a device.
#[derive(Debug, Clone)]
pub struct ResolvedShader {
    pub name: String,
    pub stage: ShaderStage,
    pub format: ShaderFormat,
    pub code: Vec<u8>,
    pub origin: ShaderOrigin,
}

/// Resolves shader names to bytecode and device shader objects.
///
/// Resolution order for a name such as `RawTriangle.vert`:
///
/// 1. `<compiled>/<FORMAT>/<stage>/RawTriangle.vert.<ext>` if it exists and its
///    source is missing or not newer.
/// 2. Otherwise the first existing `<source>/RawTriangle.vert.<src-ext>`
///    for the compiler's extensions, compiled and written back to the cache.
///
/// Failures are logged and returned; nothing is retried.
pub struct ShaderResolver<C = Box<dyn ShaderCompiler>> {
    config: ResolverConfig,
    cache: ShaderCache,
    compiler: C,
}

impl<C: ShaderCompiler> ShaderResolver<C> {
    pub fn new(config: ResolverConfig, compiler: C) -> Self {
        let cache = ShaderCache::new(config.compiled_root(), config.format);
        log::info!(
            "Shader resolver: {:?} via {} (content {:?})",
            config.format,
            compiler.name(),
            config.content_root
        );
        Self {
            config,
            cache,
            compiler,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn format(&self) -> ShaderFormat {
        self.config.format
    }

    /// Cached artifact location for `name` compiled as `stage`.
    pub fn artifact_path(&self, name: &str, stage: ShaderStage) -> PathBuf {
        self.cache.artifact_path(name, stage)
    }

    /// Candidate source files for `name`, in lookup order.
    pub fn source_candidates(&self, name: &str) -> Vec<PathBuf> {
        let root = self.config.source_root();
        self.compiler
            .source_extensions()
            .iter()
            .map(|ext| root.join(format!("{name}.{ext}")))
            .collect()
    }

    /// The first existing source file for `name`.
    pub fn source_path(&self, name: &str) -> Option<PathBuf> {
        self.source_candidates(name)
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Find or build bytecode for `name`.
    pub fn resolve(&self, name: &str, stage: ShaderStage) -> ShaderResult<ResolvedShader> {
        let format = self.config.format;
        let artifact = self.cache.artifact_path(name, stage);
        let source = self.source_path(name);

        if ShaderCache::is_fresh(source.as_deref(), &artifact) {
            let code = self.cache.read(&artifact)?;
            log::debug!("Loaded cached shader {:?}", artifact);
            return Ok(ResolvedShader {
                name: name.to_string(),
                stage,
                format,
                code,
                origin: ShaderOrigin::Cache,
            });
        }

        let Some(source) = source else {
            let mut searched = self.source_candidates(name);
            searched.push(artifact);
            return Err(ShaderError::SourceNotFound {
                name: name.to_string(),
                searched,
            });
        };

        if !self.compiler.supports_format(format) {
            return Err(ShaderError::UnsupportedFormat {
                format,
                reason: format!("compiler '{}' cannot produce it", self.compiler.name()),
            });
        }

        log::info!("Compiling {:?} ({:?} -> {:?})", source, stage, format);
        let code = self.compiler.compile(&CompileRequest {
            name,
            source: &source,
            stage,
            entry_point: &self.config.entry_point,
            format,
        })?;
        if code.is_empty() {
            return Err(ShaderError::CompilationFailed {
                name: name.to_string(),
                stage,
                message: "compiler produced no bytecode".to_string(),
            });
        }

        self.cache.store(name, stage, &code);

        Ok(ResolvedShader {
            name: name.to_string(),
            stage,
            format,
            code,
            origin: ShaderOrigin::Compiled,
        })
    }

    /// Load a vertex or fragment shader, inferring the stage from `name`.
    pub fn load_shader<D: ShaderDevice>(
        &self,
        device: &D,
        name: &str,
        resources: ShaderResourceCounts,
    ) -> ShaderResult<D::Shader> {
        infer_stage(name)
            .ok_or_else(|| ShaderError::InvalidStage(name.to_string()))
            .and_then(|stage| self.create(device, name, stage, resources))
            .inspect_err(|e| log::error!("Failed to load shader '{name}': {e}"))
    }

    /// Load a shader with an explicit stage. Required for compute shaders.
    pub fn load_shader_with_stage<D: ShaderDevice>(
        &self,
        device: &D,
        name: &str,
        stage: ShaderStage,
        resources: ShaderResourceCounts,
    ) -> ShaderResult<D::Shader> {
        self.create(device, name, stage, resources)
            .inspect_err(|e| log::error!("Failed to load shader '{name}': {e}"))
    }

    fn create<D: ShaderDevice>(
        &self,
        device: &D,
        name: &str,
        stage: ShaderStage,
        resources: ShaderResourceCounts,
    ) -> ShaderResult<D::Shader> {
        let format = self.config.format;
        if !device.supported_formats().supports(format) {
            return Err(ShaderError::UnsupportedFormat {
                format,
                reason: format!("device accepts {:?}", device.supported_formats()),
            });
        }

        let resolved = self.resolve(name, stage)?;
        device.create_shader(&ShaderCreateInfo {
            name,
            code: &resolved.code,
            entry_point: &self.config.entry_point,
            format,
            stage,
            resources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::NagaCompiler;

    #[test]
    fn test_source_candidates_follow_compiler_order() {
        let resolver = ShaderResolver::new(
            ResolverConfig::new("content").with_format(ShaderFormat::SpirV),
            NagaCompiler::new(),
        );
        assert_eq!(
            resolver.source_candidates("Quad.frag"),
            vec![
                PathBuf::from("content/Shaders/Source/Quad.frag.wgsl"),
                PathBuf::from("content/Shaders/Source/Quad.frag.glsl"),
            ]
        );
        assert_eq!(
            resolver.artifact_path("Quad.frag", ShaderStage::Fragment),
            PathBuf::from("content/Shaders/Compiled/SPIRV/fragment/Quad.frag.spv")
        );
    }

    #[test]
    fn test_unsupported_compiler_format() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig::new(dir.path()).with_format(ShaderFormat::Msl);
        std::fs::create_dir_all(config.source_root()).unwrap();
        std::fs::write(config.source_root().join("A.vert.wgsl"), "").unwrap();

        let resolver = ShaderResolver::new(config, NagaCompiler::new());
        let err = resolver.resolve("A.vert", ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, ShaderError::UnsupportedFormat { .. }));
    }
}
