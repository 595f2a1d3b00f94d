use std::fs;

use crate::error::{ShaderError, ShaderResult};
use crate::stage::{ShaderFormat, ShaderStage};

use super::{CompileRequest, ShaderCompiler};

/// In-process compiler built on naga.
///
/// Reads WGSL (`.wgsl`) or, as a fallback, GLSL (`.glsl`) and emits SPIR-V.
#[derive(Debug, Default, Clone, Copy)]
pub struct NagaCompiler;

impl NagaCompiler {
    const EXTENSIONS: [&'static str; 2] = ["wgsl", "glsl"];

    pub fn new() -> Self {
        Self
    }

    /// Compile WGSL source text to SPIR-V words.
    pub fn compile_wgsl(
        &self,
        name: &str,
        source: &str,
        stage: ShaderStage,
        entry_point: &str,
    ) -> ShaderResult<Vec<u32>> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| failed(name, stage, format!("WGSL parse error: {}", e.emit_to_string(source))))?;
        write_spirv(name, &module, stage, entry_point)
    }

    /// Compile GLSL source text to SPIR-V words.
    ///
    /// GLSL entry points are always `main`.
    pub fn compile_glsl(
        &self,
        name: &str,
        source: &str,
        stage: ShaderStage,
    ) -> ShaderResult<Vec<u32>> {
        let options = naga::front::glsl::Options::from(stage.to_naga());
        let mut frontend = naga::front::glsl::Frontend::default();
        let module = frontend
            .parse(&options, source)
            .map_err(|errors| failed(name, stage, format!("GLSL parse error:\n{errors}")))?;
        write_spirv(name, &module, stage, "main")
    }
}

impl ShaderCompiler for NagaCompiler {
    fn name(&self) -> &str {
        "naga"
    }

    fn source_extensions(&self) -> &[&str] {
        &Self::EXTENSIONS
    }

    fn supports_format(&self, format: ShaderFormat) -> bool {
        format == ShaderFormat::SpirV
    }

    fn compile(&self, request: &CompileRequest<'_>) -> ShaderResult<Vec<u8>> {
        if !self.supports_format(request.format) {
            return Err(ShaderError::UnsupportedFormat {
                format: request.format,
                reason: "naga only emits SPIR-V".to_string(),
            });
        }

        let source =
            fs::read_to_string(request.source).map_err(|e| ShaderError::io(request.source, e))?;

        let is_glsl = request
            .source
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("glsl"));

        let words = if is_glsl {
            self.compile_glsl(request.name, &source, request.stage)?
        } else {
            self.compile_wgsl(request.name, &source, request.stage, request.entry_point)?
        };

        log::debug!(
            "naga compiled '{}' ({:?}) to {} SPIR-V words",
            request.name,
            request.stage,
            words.len()
        );
        Ok(bytemuck::cast_slice(&words).to_vec())
    }
}

fn failed(name: &str, stage: ShaderStage, message: String) -> ShaderError {
    ShaderError::CompilationFailed {
        name: name.to_string(),
        stage,
        message,
    }
}

fn write_spirv(
    name: &str,
    module: &naga::Module,
    stage: ShaderStage,
    entry_point: &str,
) -> ShaderResult<Vec<u32>> {
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let info = validator
        .validate(module)
        .map_err(|e| failed(name, stage, format!("validation error: {e}")))?;

    let naga_stage = stage.to_naga();
    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry_point && ep.stage == naga_stage)
    {
        return Err(failed(
            name,
            stage,
            format!("entry point '{entry_point}' not found for stage {stage:?}"),
        ));
    }

    let options = naga::back::spv::Options {
        lang_version: (1, 3),
        ..Default::default()
    };
    let pipeline_options = naga::back::spv::PipelineOptions {
        shader_stage: naga_stage,
        entry_point: entry_point.to_string(),
    };

    naga::back::spv::write_vec(module, &info, &options, Some(&pipeline_options))
        .map_err(|e| failed(name, stage, format!("SPIR-V generation error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SPIRV_MAGIC: u32 = 0x0723_0203;

    const VERTEX_WGSL: &str = r#"
@vertex
fn main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(index) - 1);
    let y = f32(i32(index & 1u) * 2 - 1);
    return vec4<f32>(x, y, 0.0, 1.0);
}
"#;

    const FRAGMENT_GLSL: &str = r#"
#version 450
layout(location = 0) out vec4 out_color;
void main() {
    out_color = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

    #[test]
    fn test_compile_wgsl() {
        let words = NagaCompiler::new()
            .compile_wgsl("Tri.vert", VERTEX_WGSL, ShaderStage::Vertex, "main")
            .unwrap();
        assert_eq!(words[0], SPIRV_MAGIC);
    }

    #[test]
    fn test_compile_glsl() {
        let words = NagaCompiler::new()
            .compile_glsl("Red.frag", FRAGMENT_GLSL, ShaderStage::Fragment)
            .unwrap();
        assert_eq!(words[0], SPIRV_MAGIC);
    }

    #[test]
    fn test_wrong_stage_entry_point() {
        let err = NagaCompiler::new()
            .compile_wgsl("Tri.frag", VERTEX_WGSL, ShaderStage::Fragment, "main")
            .unwrap_err();
        assert!(matches!(err, ShaderError::CompilationFailed { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = NagaCompiler::new()
            .compile_wgsl("Bad.vert", "fn main( {", ShaderStage::Vertex, "main")
            .unwrap_err();
        assert!(err.to_string().contains("WGSL parse error"));
    }

    #[test]
    fn test_compile_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Tri.vert.wgsl");
        fs::write(&source, VERTEX_WGSL).unwrap();

        let code = NagaCompiler::new()
            .compile(&CompileRequest {
                name: "Tri.vert",
                source: &source,
                stage: ShaderStage::Vertex,
                entry_point: "main",
                format: ShaderFormat::SpirV,
            })
            .unwrap();
        assert!(!code.is_empty());
        assert_eq!(code.len() % 4, 0);
    }

    #[test]
    fn test_rejects_non_spirv() {
        let err = NagaCompiler::new()
            .compile(&CompileRequest {
                name: "Tri.vert",
                source: Path::new("unused.wgsl"),
                stage: ShaderStage::Vertex,
                entry_point: "main",
                format: ShaderFormat::Dxil,
            })
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnsupportedFormat { .. }));
    }
}
