//! Command line arguments and runner settings.
//!
//! The clap parser is converted into plain builder-style settings so the
//! runner can also be driven from code.

use std::path::PathBuf;

use clap::Parser;
use gpu_examples_shaders::{ShaderFormat, ShaderFormats, SlangcConfig};

use crate::error::AppError;

/// Bytecode format selection for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    Spirv,
    Dxil,
    Msl,
}

impl From<CliFormat> for ShaderFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Spirv => ShaderFormat::SpirV,
            CliFormat::Dxil => ShaderFormat::Dxil,
            CliFormat::Msl => ShaderFormat::Msl,
        }
    }
}

/// Which compiler turns sources into bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CompilerChoice {
    /// In-process WGSL/GLSL compiler (SPIR-V only).
    #[default]
    Naga,
    /// External slangc executable (.slang/.hlsl sources).
    Slangc,
}

/// GPU examples command line.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gpu-examples",
    about = "Small GPU examples with a cached shader resolver",
    long_about = "Runs one example by name, or every example in turn when no name is given.\n\n\
        Shaders are looked up in <content>/Shaders/Compiled/<FORMAT>/<stage> first and\n\
        compiled from <content>/Shaders/Source when missing or stale.\n\n\
        EXAMPLES:\n\
          gpu-examples --list\n\
          gpu-examples BasicTriangle\n\
          gpu-examples --max-frames 120",
    version
)]
pub struct ExampleArgs {
    /// Example to run (case-insensitive). Runs all examples when omitted.
    pub example: Option<String>,

    /// List available examples and exit.
    #[arg(long)]
    pub list: bool,

    /// Exit each example after rendering N frames.
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Content root containing Shaders/ and Images/.
    #[arg(long)]
    pub content_dir: Option<PathBuf>,

    /// Shader bytecode format. The wgpu renderer only consumes spirv; other
    /// formats are rejected before any window opens.
    #[arg(long, value_enum, default_value = "spirv")]
    pub format: CliFormat,

    /// Shader compiler.
    #[arg(long, value_enum, default_value = "naga")]
    pub compiler: CompilerChoice,

    /// Path to the slangc executable.
    #[arg(long)]
    pub slangc: Option<PathBuf>,

    /// Directory with the DXC libraries (DXIL output through slangc).
    #[arg(long)]
    pub dxc_dir: Option<PathBuf>,

    /// Disable shader hot reload in debug builds.
    #[arg(long)]
    pub no_hot_reload: bool,
}

impl ExampleArgs {
    /// Runner settings derived from the arguments.
    pub fn runner_settings(&self) -> RunnerSettings {
        let mut settings = RunnerSettings::default()
            .with_hot_reload(cfg!(debug_assertions) && !self.no_hot_reload);
        if let Some(max_frames) = self.max_frames {
            settings = settings.with_max_frames(max_frames);
        }
        settings
    }

    /// Bytecode format for the resolver, checked against what the renderer
    /// can create shaders from.
    pub fn shader_format(&self, supported: ShaderFormats) -> Result<ShaderFormat, AppError> {
        let format = ShaderFormat::from(self.format);
        if supported.supports(format) {
            return Ok(format);
        }
        let names: Vec<&str> = [ShaderFormat::SpirV, ShaderFormat::Dxil, ShaderFormat::Msl]
            .into_iter()
            .filter(|f| supported.supports(*f))
            .map(|f| f.dir_name())
            .collect();
        Err(AppError::UnsupportedFormat(format.dir_name(), names.join(", ")))
    }

    pub fn slangc_config(&self) -> SlangcConfig {
        let mut config = SlangcConfig::new();
        if let Some(path) = &self.slangc {
            config = config.with_executable(path);
        }
        if let Some(dir) = &self.dxc_dir {
            config = config.with_dxc_dir(dir);
        }
        config
    }
}

/// How each example window is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub width: u32,
    pub height: u32,
    /// Stop an example after this many frames.
    pub max_frames: Option<u64>,
    /// Watch shader sources and rebuild shaders on change.
    pub hot_reload: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            max_frames: None,
            hot_reload: false,
        }
    }
}

impl RunnerSettings {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ExampleArgs::try_parse_from(["gpu-examples"]).unwrap();
        assert!(args.example.is_none());
        assert_eq!(args.format, CliFormat::Spirv);
        assert_eq!(args.compiler, CompilerChoice::Naga);

        let settings = args.runner_settings();
        assert_eq!((settings.width, settings.height), (640, 480));
        assert_eq!(settings.max_frames, None);
        assert_eq!(settings.hot_reload, cfg!(debug_assertions));
    }

    #[test]
    fn test_full_command_line() {
        let args = ExampleArgs::try_parse_from([
            "gpu-examples",
            "basictriangle",
            "--max-frames",
            "10",
            "--format",
            "dxil",
            "--compiler",
            "slangc",
            "--slangc",
            "/opt/slang/bin/slangc",
            "--dxc-dir",
            "/opt/dxc",
            "--no-hot-reload",
        ])
        .unwrap();

        assert_eq!(args.example.as_deref(), Some("basictriangle"));
        assert_eq!(ShaderFormat::from(args.format), ShaderFormat::Dxil);
        assert_eq!(args.compiler, CompilerChoice::Slangc);

        let settings = args.runner_settings();
        assert_eq!(settings.max_frames, Some(10));
        assert!(!settings.hot_reload);

        let slangc = args.slangc_config();
        assert_eq!(slangc.executable, Some(PathBuf::from("/opt/slang/bin/slangc")));
        assert_eq!(slangc.dxc_dir, Some(PathBuf::from("/opt/dxc")));
    }

    #[test]
    fn test_shader_format_checked_against_renderer() {
        let args = ExampleArgs::try_parse_from(["gpu-examples"]).unwrap();
        assert_eq!(
            args.shader_format(ShaderFormats::SPIRV).unwrap(),
            ShaderFormat::SpirV
        );

        let args = ExampleArgs::try_parse_from(["gpu-examples", "--format", "msl"]).unwrap();
        let err = args.shader_format(ShaderFormats::SPIRV).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat("MSL", _)));
        assert_eq!(
            err.to_string(),
            "shader format MSL is not supported by the renderer (supported: SPIRV)"
        );

        let args = ExampleArgs::try_parse_from(["gpu-examples", "--format", "dxil"]).unwrap();
        assert!(args.shader_format(ShaderFormats::SPIRV).is_err());
        assert_eq!(
            args.shader_format(ShaderFormats::SPIRV | ShaderFormats::DXIL).unwrap(),
            ShaderFormat::Dxil
        );
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(ExampleArgs::try_parse_from(["gpu-examples", "--format", "dxbc"]).is_err());
    }
}
