//! # GPU Examples Shaders
//!
//! Turns shader names into device shader objects:
//!
//! - [`infer_stage`] - stage from a name such as `RawTriangle.vert`
//! - [`ShaderResolver`] - cached artifact or compiled source, handed to a [`ShaderDevice`]
//! - [`ShaderCache`] - per-format bytecode cache with a staleness check
//! - [`NagaCompiler`] / [`SlangcCompiler`] - the [`ShaderCompiler`] implementations
//! - [`ShaderHotReloader`] - rebuilds shaders when their sources change (`hot-reload` feature)

pub mod cache;
pub mod compiler;
pub mod config;
pub mod device;
pub mod error;
#[cfg(feature = "hot-reload")]
pub mod hot_reload;
pub mod resolver;
pub mod stage;

pub use cache::ShaderCache;
pub use compiler::{CompileRequest, NagaCompiler, ShaderCompiler, SlangcCompiler, SlangcConfig};
pub use config::ResolverConfig;
pub use device::ShaderDevice;
pub use error::{ShaderError, ShaderResult};
#[cfg(feature = "hot-reload")]
pub use hot_reload::{ReloadedShader, ShaderEventSender, ShaderHotReloader};
pub use resolver::{ResolvedShader, ShaderOrigin, ShaderResolver};
pub use stage::{
    ShaderCreateInfo, ShaderFormat, ShaderFormats, ShaderResourceCounts, ShaderStage, infer_stage,
};

/// Shaders library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    log::info!("GPU Examples Shaders v{} initialized", VERSION);
}

static_assertions::assert_impl_all!(ShaderResolver<NagaCompiler>: Send, Sync);
static_assertions::assert_impl_all!(ShaderCache: Send, Sync);
static_assertions::assert_impl_all!(SlangcCompiler: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
