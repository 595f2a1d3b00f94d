//! Shader compilers.
//!
//! - [`NagaCompiler`] - in-process WGSL/GLSL to SPIR-V
//! - [`SlangcCompiler`] - the external `slangc` executable, all formats

mod naga_compiler;
mod slangc;

pub use self::naga_compiler::NagaCompiler;
pub use self::slangc::{SlangcCompiler, SlangcConfig};

use std::path::Path;

use crate::error::ShaderResult;
use crate::stage::{ShaderFormat, ShaderStage};

/// Input to a single compilation.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Shader name, used for diagnostics.
    pub name: &'a str,
    /// Source file to compile.
    pub source: &'a Path,
    pub stage: ShaderStage,
    pub entry_point: &'a str,
    pub format: ShaderFormat,
}

/// Turns a shader source file into bytecode.
pub trait ShaderCompiler {
    /// Human readable compiler name.
    fn name(&self) -> &str;

    /// Source extensions this compiler reads, primary first.
    fn source_extensions(&self) -> &[&str];

    fn supports_format(&self, format: ShaderFormat) -> bool;

    fn compile(&self, request: &CompileRequest<'_>) -> ShaderResult<Vec<u8>>;
}

impl<C: ShaderCompiler + ?Sized> ShaderCompiler for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn source_extensions(&self) -> &[&str] {
        (**self).source_extensions()
    }

    fn supports_format(&self, format: ShaderFormat) -> bool {
        (**self).supports_format(format)
    }

    fn compile(&self, request: &CompileRequest<'_>) -> ShaderResult<Vec<u8>> {
        (**self).compile(request)
    }
}
