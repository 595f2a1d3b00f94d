//! Sprite data shared by the sprite batch examples.

use glam::Mat4;
use gpu_examples_app::{ExampleContext, ExampleError};
use gpu_examples_core::ComputeSpriteInstance;
use rand::Rng;

use crate::textured;

pub const SPRITE_COUNT: u32 = 8192;
pub const ATLAS_IMAGE: &str = "ravioli_atlas.bmp";
pub const FRAGMENT_SHADER: &str = "TexturedQuadColor.frag";

const SPRITE_SIZE: f32 = 32.0;
/// Top-left corner of each atlas cell; each cell is half the atlas.
const ATLAS_CELLS: [(f32, f32); 4] = [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.5, 0.5)];
const ATLAS_CELL_SIZE: f32 = 0.5;

/// Straight alpha blending on both color and alpha.
pub const SPRITE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Pixel-space projection for a 640x480 canvas with y pointing down.
pub fn camera() -> Mat4 {
    Mat4::orthographic_rh(0.0, 640.0, 480.0, 0.0, 0.0, -1.0)
}

/// Scatter `sprites` over the canvas with random rotation and atlas cell.
pub fn randomize(rng: &mut impl Rng, sprites: &mut [ComputeSpriteInstance]) {
    for sprite in sprites {
        let (tex_u, tex_v) = ATLAS_CELLS[rng.gen_range(0..ATLAS_CELLS.len())];
        *sprite = ComputeSpriteInstance {
            x: rng.gen_range(0..640) as f32,
            y: rng.gen_range(0..480) as f32,
            z: 0.0,
            rotation: rng.r#gen::<f32>() * std::f32::consts::TAU,
            w: SPRITE_SIZE,
            h: SPRITE_SIZE,
            tex_u,
            tex_v,
            tex_w: ATLAS_CELL_SIZE,
            tex_h: ATLAS_CELL_SIZE,
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
            ..Default::default()
        };
    }
}

/// Six indices per sprite over four corner vertices: j, j+1, j+2, j+3, j+2, j+1.
pub fn quad_indices(sprite_count: u32) -> Vec<u32> {
    (0..sprite_count)
        .flat_map(|sprite| {
            let j = sprite * 4;
            [j, j + 1, j + 2, j + 3, j + 2, j + 1]
        })
        .collect()
}

/// Atlas texture view and a point-clamp sampler.
pub fn load_atlas(
    ctx: &ExampleContext<'_>,
) -> Result<(wgpu::TextureView, wgpu::Sampler), ExampleError> {
    let image = ctx.load_image(ATLAS_IMAGE)?;
    let texture = textured::upload_texture(
        ctx.gpu,
        "Sprite Atlas",
        &image,
        wgpu::TextureUsages::TEXTURE_BINDING,
    );
    let sampler = ctx.gpu.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("PointClamp"),
        ..Default::default()
    });
    Ok((
        texture.create_view(&wgpu::TextureViewDescriptor::default()),
        sampler,
    ))
}

/// Layout entries for the atlas at bindings 2 and 3.
pub fn atlas_layout_entries() -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 3,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

pub fn buffer_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    ty: wgpu::BufferBindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_quad_indices_pattern() {
        let indices = quad_indices(2);
        assert_eq!(indices, vec![0, 1, 2, 3, 2, 1, 4, 5, 6, 7, 6, 5]);
        assert_eq!(quad_indices(SPRITE_COUNT).len(), SPRITE_COUNT as usize * 6);
    }

    #[test]
    fn test_randomize_stays_on_canvas() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut sprites = vec![ComputeSpriteInstance::default(); 256];
        randomize(&mut rng, &mut sprites);
        for sprite in &sprites {
            assert!((0.0..640.0).contains(&sprite.x));
            assert!((0.0..480.0).contains(&sprite.y));
            assert!((0.0..std::f32::consts::TAU).contains(&sprite.rotation));
            assert!(ATLAS_CELLS.contains(&(sprite.tex_u, sprite.tex_v)));
            assert_eq!((sprite.w, sprite.tex_w), (SPRITE_SIZE, ATLAS_CELL_SIZE));
            assert_eq!(sprite.a, 1.0);
        }
    }

    #[test]
    fn test_camera_maps_canvas_corners() {
        let camera = camera();
        let top_left = camera.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = camera.project_point3(glam::Vec3::new(640.0, 480.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_blend_uses_source_alpha_everywhere() {
        assert_eq!(SPRITE_BLEND.color, SPRITE_BLEND.alpha);
        assert_eq!(SPRITE_BLEND.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    }
}
