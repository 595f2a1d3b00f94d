//! # GPU Examples App
//!
//! Runs examples in a window, one at a time, sharing one shader resolver.
//!
//! ## Overview
//!
//! - [`Example`] - lifecycle implemented by each example
//! - [`ExampleRegistry`] - ordered, case-insensitive list of examples
//! - [`ExampleRunner`] - winit event loop and frame loop
//! - [`GpuContext`] - wgpu device for a window; creates shaders from SPIR-V
//! - [`SurfaceWindow`] - extra window drawn with the same device
//! - [`ExampleArgs`] - command line, converted into [`RunnerSettings`]
//!
//! ## Example
//!
//! ```ignore
//! let registry = ExampleRegistry::new().with("ClearScreen", clear_screen::create);
//! let resolver = ShaderResolver::new(config, Box::new(NagaCompiler::new()));
//! let mut runner = ExampleRunner::new(RunnerSettings::default(), resolver, content_root)?;
//! runner.run_all(&registry)?;
//! ```

mod args;
mod content;
mod context;
mod error;
mod example;
mod input;
mod registry;
mod runner;
mod window;

pub use args::{CliFormat, CompilerChoice, ExampleArgs, RunnerSettings};
pub use content::{CONTENT_ENV, content_candidates, find_content_root};
pub use context::{GpuContext, GpuShader, PipelineTarget, RenderPipelineDesc, VertexLayout};
pub use error::{AppError, ExampleError};
pub use example::{Example, ExampleContext, Frame, IMAGES_DIR};
pub use input::{InputState, Key};
pub use registry::{ExampleConstructor, ExampleEntry, ExampleRegistry};
pub use runner::ExampleRunner;
pub use window::SurfaceWindow;

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the app subsystem.
pub fn init() {
    log::info!("GPU Examples App v{} initialized", VERSION);
}

/// Install the logger, `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .map_err(|e| AppError::Logger(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
