use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;

use crate::error::{ShaderError, ShaderResult};
use crate::stage::{ShaderFormat, ShaderStage};

use super::{CompileRequest, ShaderCompiler};

/// Environment variable naming the slangc executable.
pub const SLANGC_ENV: &str = "SLANGC";

/// Where to find slangc and its helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlangcConfig {
    /// Explicit slangc path. Falls back to `$SLANGC`, then `PATH`.
    pub executable: Option<PathBuf>,
    /// Directory with the DXC libraries, prepended to the child's `PATH`.
    /// Needed for DXIL output only.
    pub dxc_dir: Option<PathBuf>,
}

impl SlangcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn with_dxc_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dxc_dir = Some(dir.into());
        self
    }

    /// Find the slangc executable. The result is always absolute since
    /// slangc is run from its own directory.
    pub fn locate(&self) -> ShaderResult<PathBuf> {
        if let Some(path) = &self.executable {
            return if path.is_file() {
                absolute(path)
            } else {
                Err(ShaderError::CompilerNotFound(format!(
                    "slangc not found at {}",
                    path.display()
                )))
            };
        }

        if let Some(path) = env::var_os(SLANGC_ENV).map(PathBuf::from) {
            if path.is_file() {
                return absolute(&path);
            }
            log::warn!("${SLANGC_ENV} points at missing file {:?}", path);
        }

        which::which("slangc")
            .map_err(|e| ShaderError::CompilerNotFound(format!("slangc not on PATH: {e}")))
            .and_then(|path| absolute(&path))
    }
}

fn absolute(path: &Path) -> ShaderResult<PathBuf> {
    std::path::absolute(path).map_err(|e| ShaderError::io(path, e))
}

/// Compiler driving the external `slangc` executable.
///
/// Reads `.slang` sources, falling back to `.hlsl`. Outputs go through a
/// private temporary directory that is removed when the compiler is dropped.
#[derive(Debug)]
pub struct SlangcCompiler {
    executable: PathBuf,
    dxc_dir: Option<PathBuf>,
    temp_dir: TempDir,
    counter: AtomicU64,
}

impl SlangcCompiler {
    const EXTENSIONS: [&'static str; 2] = ["slang", "hlsl"];

    pub fn new(config: &SlangcConfig) -> ShaderResult<Self> {
        let executable = config.locate()?;

        let dxc_dir = match &config.dxc_dir {
            Some(dir) if dir.is_dir() => Some(absolute(dir)?),
            Some(dir) => {
                // DXIL output will fail later; SPIR-V and MSL still work.
                log::warn!("DXC directory {:?} not found, ignoring", dir);
                None
            }
            None => None,
        };

        let temp_dir = tempfile::Builder::new()
            .prefix("gpu_examples_shaders_")
            .tempdir()
            .map_err(|e| ShaderError::io(env::temp_dir(), e))?;

        log::info!("Using slangc at {:?}", executable);

        Ok(Self {
            executable,
            dxc_dir,
            temp_dir,
            counter: AtomicU64::new(0),
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `(target, profile)` pair for a format.
    pub fn target_profile(format: ShaderFormat) -> (&'static str, &'static str) {
        match format {
            ShaderFormat::SpirV => ("spirv", "glsl_450"),
            ShaderFormat::Dxil => ("dxil", "sm_6_0"),
            ShaderFormat::Msl => ("metal", "metal"),
        }
    }

    /// Command-line arguments for one compilation.
    pub fn build_arguments(
        source: &Path,
        stage: ShaderStage,
        entry_point: &str,
        format: ShaderFormat,
        output: &Path,
    ) -> Vec<OsString> {
        let (target, profile) = Self::target_profile(format);
        vec![
            source.as_os_str().to_owned(),
            "-target".into(),
            target.into(),
            "-profile".into(),
            profile.into(),
            "-stage".into(),
            stage.as_str().into(),
            "-entry".into(),
            entry_point.into(),
            "-o".into(),
            output.as_os_str().to_owned(),
        ]
    }

    fn next_output_path(&self, format: ShaderFormat) -> PathBuf {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        self.temp_dir
            .path()
            .join(format!("shader_{id}.{}", format.extension()))
    }

    fn child_path(&self) -> Option<OsString> {
        let dxc_dir = self.dxc_dir.as_ref()?;
        let mut paths = vec![dxc_dir.clone()];
        if let Some(current) = env::var_os("PATH") {
            paths.extend(env::split_paths(&current));
        }
        env::join_paths(paths).ok()
    }
}

impl ShaderCompiler for SlangcCompiler {
    fn name(&self) -> &str {
        "slangc"
    }

    fn source_extensions(&self) -> &[&str] {
        &Self::EXTENSIONS
    }

    fn supports_format(&self, _format: ShaderFormat) -> bool {
        true
    }

    fn compile(&self, request: &CompileRequest<'_>) -> ShaderResult<Vec<u8>> {
        // slangc runs from its own directory.
        let source = absolute(request.source)?;
        let output = self.next_output_path(request.format);
        let args = Self::build_arguments(
            &source,
            request.stage,
            request.entry_point,
            request.format,
            &output,
        );

        let mut command = Command::new(&self.executable);
        command.args(&args);
        if let Some(dir) = self.executable.parent()
            && !dir.as_os_str().is_empty()
        {
            command.current_dir(dir);
        }
        if let Some(path) = self.child_path() {
            command.env("PATH", path);
        }

        log::debug!("Running {:?} {:?}", self.executable, args);
        let result = command
            .output()
            .map_err(|e| ShaderError::io(&self.executable, e))?;
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();

        let failed = |message: String| ShaderError::CompilationFailed {
            name: request.name.to_string(),
            stage: request.stage,
            message,
        };

        if !result.status.success() {
            let _ = fs::remove_file(&output);
            return Err(failed(format!("slangc exited with {}: {stderr}", result.status)));
        }
        if !stderr.is_empty() {
            log::warn!("slangc diagnostics for '{}':\n{stderr}", request.name);
        }

        let code = match fs::read(&output) {
            Ok(code) => code,
            Err(_) => {
                return Err(failed(format!("no output file generated. {stderr}")));
            }
        };
        let _ = fs::remove_file(&output);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_arguments() {
        let args = SlangcCompiler::build_arguments(
            Path::new("src/Tri.vert.slang"),
            ShaderStage::Vertex,
            "main",
            ShaderFormat::SpirV,
            Path::new("tmp/out.spv"),
        );
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "src/Tri.vert.slang",
                "-target",
                "spirv",
                "-profile",
                "glsl_450",
                "-stage",
                "vertex",
                "-entry",
                "main",
                "-o",
                "tmp/out.spv"
            ]
        );
    }

    #[test]
    fn test_target_profiles() {
        assert_eq!(SlangcCompiler::target_profile(ShaderFormat::Dxil), ("dxil", "sm_6_0"));
        assert_eq!(SlangcCompiler::target_profile(ShaderFormat::Msl), ("metal", "metal"));
    }

    #[test]
    fn test_locate_makes_path_absolute() {
        let dir = tempfile::tempdir_in(".").unwrap();
        let exe = dir.path().join("slangc");
        fs::write(&exe, b"").unwrap();
        assert!(exe.is_relative());

        let located = SlangcConfig::new().with_executable(&exe).locate().unwrap();
        assert!(located.is_absolute());
        assert!(located.ends_with(exe.strip_prefix(".").unwrap()));
    }

    #[test]
    fn test_locate_explicit_missing() {
        let config = SlangcConfig::new().with_executable("/definitely/not/here/slangc");
        let err = config.locate().unwrap_err();
        assert!(matches!(err, ShaderError::CompilerNotFound(_)));
    }

    #[test]
    fn test_temp_dir_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("slangc");
        fs::write(&exe, b"").unwrap();

        let compiler = SlangcCompiler::new(&SlangcConfig::new().with_executable(&exe)).unwrap();
        let temp = compiler.temp_dir().to_path_buf();
        assert!(temp.is_dir());
        drop(compiler);
        assert!(!temp.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_with_stub_executable() {
        use std::os::unix::fs::PermissionsExt;

        // Relative paths: slangc is run from its own directory, so both the
        // executable and the source must still resolve after the switch.
        let dir = tempfile::tempdir_in(".").unwrap();
        let source = dir.path().join("Tri.vert.slang");
        fs::write(&source, "// source").unwrap();
        assert!(source.is_relative());

        let write_script = |name: &str, body: &str| {
            let path = dir.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        };

        // The output path is always the last argument.
        let good = write_script("good_slangc", "for last; do :; done\nprintf 'BYTECODE' > \"$last\"");
        let bad = write_script("bad_slangc", "echo 'error: unexpected token' >&2\nexit 1");

        let request = CompileRequest {
            name: "Tri.vert",
            source: &source,
            stage: ShaderStage::Vertex,
            entry_point: "main",
            format: ShaderFormat::SpirV,
        };

        let compiler = SlangcCompiler::new(&SlangcConfig::new().with_executable(&good)).unwrap();
        assert!(compiler.executable().is_absolute());
        assert_eq!(compiler.compile(&request).unwrap(), b"BYTECODE");
        // Temporary outputs are cleaned up after each compilation.
        assert_eq!(fs::read_dir(compiler.temp_dir()).unwrap().count(), 0);

        let compiler = SlangcCompiler::new(&SlangcConfig::new().with_executable(&bad)).unwrap();
        let err = compiler.compile(&request).unwrap_err();
        assert!(err.to_string().contains("unexpected token"));
    }
}
