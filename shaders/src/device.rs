//! The device-side seam: turning bytecode into a shader object.

use crate::error::ShaderResult;
use crate::stage::{ShaderCreateInfo, ShaderFormats};

/// A graphics device able to create shader objects from bytecode.
pub trait ShaderDevice {
    /// The device's shader object.
    type Shader;

    /// Bytecode formats this device accepts.
    fn supported_formats(&self) -> ShaderFormats;

    /// Create a shader from already compiled bytecode.
    fn create_shader(&self, info: &ShaderCreateInfo<'_>) -> ShaderResult<Self::Shader>;
}
