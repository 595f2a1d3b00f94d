//! Shared fixtures for shader integration tests.
//!
//! Provides a content tree in a temporary directory plus a compiler and a
//! device that record how often they are called.

#![allow(dead_code)]

use std::cell::Cell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use gpu_examples_shaders::{
    CompileRequest, ResolverConfig, ShaderCompiler, ShaderCreateInfo, ShaderDevice, ShaderError,
    ShaderFormat, ShaderFormats, ShaderResourceCounts, ShaderResult, ShaderStage,
};
use tempfile::TempDir;

/// Temporary content root laid out like the shipped one.
pub struct ContentDir {
    pub dir: TempDir,
    pub config: ResolverConfig,
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

impl ContentDir {
    pub fn new() -> Self {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig::new(dir.path()).with_format(ShaderFormat::SpirV);
        Self { dir, config }
    }

    pub fn source_path(&self, file: &str) -> PathBuf {
        self.config.source_root().join(file)
    }

    pub fn write_source(&self, file: &str, contents: &str) -> PathBuf {
        let path = self.source_path(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_artifact(&self, name: &str, stage: ShaderStage, code: &[u8]) -> PathBuf {
        let path = self
            .config
            .compiled_root()
            .join(stage.as_str())
            .join(format!("{name}.{}", self.config.format.extension()));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, code).unwrap();
        path
    }

    /// Every file and directory under the content root.
    pub fn entries(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                out.push(path.clone());
                if path.is_dir() {
                    walk(&path, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self.dir.path(), &mut out);
        out.sort();
        out
    }
}

/// A fixed point in the past plus `secs`.
pub fn time(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + secs)
}

pub fn set_mtime(path: &Path, when: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

/// Compiler returning canned bytecode and counting invocations.
#[derive(Debug, Clone)]
pub struct MockCompiler {
    pub output: Vec<u8>,
    pub fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockCompiler {
    pub fn new(output: &[u8]) -> Self {
        init_logging();
        Self {
            output: output.to_vec(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(b"")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ShaderCompiler for MockCompiler {
    fn name(&self) -> &str {
        "mock"
    }

    fn source_extensions(&self) -> &[&str] {
        &["slang", "hlsl"]
    }

    fn supports_format(&self, _format: ShaderFormat) -> bool {
        true
    }

    fn compile(&self, request: &CompileRequest<'_>) -> ShaderResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ShaderError::CompilationFailed {
                name: request.name.to_string(),
                stage: request.stage,
                message: "mock failure".to_string(),
            });
        }
        Ok(self.output.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockShader {
    pub name: String,
    pub code: Vec<u8>,
    pub stage: ShaderStage,
    pub entry_point: String,
    pub resources: ShaderResourceCounts,
}

/// Device accepting the given formats and recording created shaders.
#[derive(Debug)]
pub struct MockDevice {
    pub formats: ShaderFormats,
    pub reject: bool,
    created: Cell<usize>,
}

impl MockDevice {
    pub fn new(formats: ShaderFormats) -> Self {
        Self {
            formats,
            reject: false,
            created: Cell::new(0),
        }
    }

    pub fn spirv() -> Self {
        Self::new(ShaderFormats::SPIRV)
    }

    pub fn created(&self) -> usize {
        self.created.get()
    }
}

impl ShaderDevice for MockDevice {
    type Shader = MockShader;

    fn supported_formats(&self) -> ShaderFormats {
        self.formats
    }

    fn create_shader(&self, info: &ShaderCreateInfo<'_>) -> ShaderResult<MockShader> {
        if self.reject {
            return Err(ShaderError::CreationFailed {
                name: info.name.to_string(),
                message: "rejected".to_string(),
            });
        }
        self.created.set(self.created.get() + 1);
        Ok(MockShader {
            name: info.name.to_string(),
            code: info.code.to_vec(),
            stage: info.stage,
            entry_point: info.entry_point.to_string(),
            resources: info.resources,
        })
    }
}
