//! # GPU Examples Demos
//!
//! The example programs, registered in the order they are run:
//!
//! - `ClearScreen` - clear to a fixed color
//! - `ClearScreenMultiWindow` - two windows sharing one device
//! - `BasicTriangle` - triangle without vertex buffer, wireframe/viewport/scissor toggles
//! - `BasicVertexBuffer` - triangle from a vertex buffer
//! - `CullMode` - front face and cull mode combinations
//! - `BasicStencil` - stencil mask written by one triangle, tested by another
//! - `InstancedIndexed` - instancing with vertex/index offsets
//! - `TexturedQuad` - six sampler variants
//! - `BasicCompute` - compute shader writes a texture
//! - `CopyAndReadback` - GPU copies checked on the CPU
//! - `DrawIndirect` - draw arguments read from a GPU buffer
//! - `BlitMirror` - one image blitted into four flipped quadrants
//! - `Blit2DArray` - per-layer blit between array textures
//! - `GenerateMipmaps` - mip chain built by blits, smallest level shown
//! - `TriangleMSAA` - multisampled triangle per supported sample count
//! - `DepthSampler` - depth buffer sampled by an outline pass
//! - `Cubemap` - skybox over a six-face cube texture
//! - `PullSpriteBatch` - sprites pulled from a storage buffer
//! - `ComputeSpriteBatch` - sprite vertices built by a compute shader

use std::path::PathBuf;

use gpu_examples_app::ExampleRegistry;

mod basic_compute;
mod basic_stencil;
mod basic_triangle;
mod basic_vertex_buffer;
mod blit;
mod blit_2d_array;
mod blit_mirror;
mod clear_screen;
mod clear_screen_multi_window;
mod compute_sprite_batch;
mod copy_and_readback;
mod cube;
mod cubemap;
mod cull_mode;
mod depth_sampler;
mod draw_indirect;
mod generate_mipmaps;
mod instanced_indexed;
mod pull_sprite_batch;
mod sprites;
mod textured;
mod textured_quad;
mod triangle_msaa;

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Content shipped with this crate, used when no other content root is found.
pub fn default_content_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content")
}

/// Every example, in run order.
pub fn registry() -> ExampleRegistry {
    ExampleRegistry::new()
        .with("ClearScreen", clear_screen::create)
        .with("ClearScreenMultiWindow", clear_screen_multi_window::create)
        .with("BasicTriangle", basic_triangle::create)
        .with("BasicVertexBuffer", basic_vertex_buffer::create)
        .with("CullMode", cull_mode::create)
        .with("BasicStencil", basic_stencil::create)
        .with("InstancedIndexed", instanced_indexed::create)
        .with("TexturedQuad", textured_quad::create)
        .with("BasicCompute", basic_compute::create)
        .with("CopyAndReadback", copy_and_readback::create)
        .with("DrawIndirect", draw_indirect::create)
        .with("BlitMirror", blit_mirror::create)
        .with("Blit2DArray", blit_2d_array::create)
        .with("GenerateMipmaps", generate_mipmaps::create)
        .with("TriangleMSAA", triangle_msaa::create)
        .with("DepthSampler", depth_sampler::create)
        .with("Cubemap", cubemap::create)
        .with("PullSpriteBatch", pull_sprite_batch::create)
        .with("ComputeSpriteBatch", compute_sprite_batch::create)
}

/// Step `current` by one in either direction, wrapping around `len`.
pub(crate) fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let registry = registry();
        assert_eq!(registry.len(), 19);
        assert_eq!(registry.names().next(), Some("ClearScreen"));
        assert_eq!(registry.names().nth(1), Some("ClearScreenMultiWindow"));
        assert_eq!(registry.names().last(), Some("ComputeSpriteBatch"));
        assert!(registry.find("texturedquad").is_some());
        assert!(registry.find("trianglemsaa").is_some());
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        assert_eq!(cycle(0, 6, false), 5);
        assert_eq!(cycle(5, 6, true), 0);
        assert_eq!(cycle(2, 6, true), 3);
    }

    #[test]
    fn test_default_content_root_exists() {
        let root = default_content_root();
        assert!(root.join("Shaders").join("Source").is_dir());
        for image in [
            "ravioli.bmp",
            "ravioli_inverted.bmp",
            "cube0.bmp",
            sprites::ATLAS_IMAGE,
        ] {
            assert!(root.join("Images").join(image).is_file(), "missing {image}");
        }
    }
}
