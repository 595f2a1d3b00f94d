//! Shader error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::stage::{ShaderFormat, ShaderStage};

/// Errors produced while locating, compiling or creating shaders.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// The stage could not be inferred from the shader name.
    #[error("invalid shader stage for '{0}': name must contain .vert or .frag")]
    InvalidStage(String),

    /// Neither a cached artifact nor a source file exists.
    #[error("shader '{name}' not found (looked in {searched:?})")]
    SourceNotFound {
        name: String,
        searched: Vec<PathBuf>,
    },

    /// The device or compiler cannot handle the requested format.
    #[error("unsupported shader format {format:?}: {reason}")]
    UnsupportedFormat {
        format: ShaderFormat,
        reason: String,
    },

    /// The external compiler executable could not be located.
    #[error("shader compiler not found: {0}")]
    CompilerNotFound(String),

    /// The compiler ran but rejected the source.
    #[error("failed to compile '{name}' ({stage:?}): {message}")]
    CompilationFailed {
        name: String,
        stage: ShaderStage,
        message: String,
    },

    /// Filesystem access failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The device refused the bytecode.
    #[error("failed to create shader '{name}': {message}")]
    CreationFailed { name: String, message: String },
}

impl ShaderError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for shader operations.
pub type ShaderResult<T> = Result<T, ShaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShaderError::InvalidStage("Thing.comp".to_string());
        assert_eq!(
            err.to_string(),
            "invalid shader stage for 'Thing.comp': name must contain .vert or .frag"
        );

        let err = ShaderError::CreationFailed {
            name: "SolidColor.frag".to_string(),
            message: "bad magic".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create shader 'SolidColor.frag': bad magic"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err = ShaderError::io("a/b.spv", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("a/b.spv"));
    }
}
