//! Application and example error types.

use std::path::PathBuf;

use gpu_examples_core::ImageError;
use gpu_examples_shaders::ShaderError;
use thiserror::Error;

/// Errors raised by an example while it runs.
#[derive(Debug, Error)]
pub enum ExampleError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Image(#[from] ImageError),

    /// A GPU operation failed.
    #[error("GPU error: {0}")]
    Gpu(String),

    /// A result check inside the example failed.
    #[error("check failed: {0}")]
    Check(String),
}

/// Errors raised by the runner itself.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialize logging: {0}")]
    Logger(String),

    #[error("content directory not found (tried {0:?})")]
    ContentNotFound(Vec<PathBuf>),

    #[error("unknown example '{0}'")]
    UnknownExample(String),

    /// The renderer cannot create shaders from this bytecode format.
    #[error("shader format {0} is not supported by the renderer (supported: {1})")]
    UnsupportedFormat(&'static str, String),

    #[error("failed to create event loop: {0}")]
    EventLoop(String),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("GPU initialization failed: {0}")]
    GpuInit(String),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The example itself failed.
    #[error("example '{name}' failed: {source}")]
    Example {
        name: String,
        #[source]
        source: ExampleError,
    },
}

impl AppError {
    /// Process exit code: 255 for an example's own failure, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Example { .. } => 255,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = AppError::Example {
            name: "ClearScreen".to_string(),
            source: ExampleError::Gpu("lost".to_string()),
        };
        assert_eq!(err.exit_code(), 255);
        assert_eq!(err.to_string(), "example 'ClearScreen' failed: GPU error: lost");

        assert_eq!(AppError::UnknownExample("Nope".to_string()).exit_code(), 1);
        assert_eq!(AppError::GpuInit("no adapter".to_string()).exit_code(), 1);
        assert_eq!(
            AppError::UnsupportedFormat("DXIL", "SPIRV".to_string()).exit_code(),
            1
        );
    }
}
