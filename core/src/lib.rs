//! # GPU Examples Core
//!
//! Data shared by every example: fixed-layout vertex records and image
//! loading.

pub mod image;
pub mod vertex;

pub use self::image::{ImageError, RgbaImage, load_image};
pub use self::vertex::{
    ComputeSpriteInstance, PositionColorVertex, PositionTextureColorVertex, PositionTextureVertex,
    PositionVertex, Vertex, VertexAttribute, VertexAttributeFormat,
};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    log::info!("GPU Examples Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
