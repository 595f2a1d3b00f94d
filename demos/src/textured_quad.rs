//! Draws `ravioli.bmp` on a quad repeated four times, cycling through six
//! samplers with Left/Right.

use gpu_examples_app::{Example, ExampleContext, ExampleError, Frame, GpuShader, InputState, Key};
use gpu_examples_shaders::ReloadedShader;

use crate::cycle;
use crate::textured::{self, QuadRenderer};

const IMAGE: &str = "ravioli.bmp";
const UV_REPEAT: f32 = 4.0;
const ANISOTROPY: u16 = 4;

struct SamplerVariant {
    name: &'static str,
    filter: wgpu::FilterMode,
    address_mode: wgpu::AddressMode,
    anisotropy: u16,
}

const SAMPLERS: [SamplerVariant; 6] = [
    SamplerVariant {
        name: "PointClamp",
        filter: wgpu::FilterMode::Nearest,
        address_mode: wgpu::AddressMode::ClampToEdge,
        anisotropy: 1,
    },
    SamplerVariant {
        name: "PointWrap",
        filter: wgpu::FilterMode::Nearest,
        address_mode: wgpu::AddressMode::Repeat,
        anisotropy: 1,
    },
    SamplerVariant {
        name: "LinearClamp",
        filter: wgpu::FilterMode::Linear,
        address_mode: wgpu::AddressMode::ClampToEdge,
        anisotropy: 1,
    },
    SamplerVariant {
        name: "LinearWrap",
        filter: wgpu::FilterMode::Linear,
        address_mode: wgpu::AddressMode::Repeat,
        anisotropy: 1,
    },
    SamplerVariant {
        name: "AnisotropicClamp",
        filter: wgpu::FilterMode::Linear,
        address_mode: wgpu::AddressMode::ClampToEdge,
        anisotropy: ANISOTROPY,
    },
    SamplerVariant {
        name: "AnisotropicWrap",
        filter: wgpu::FilterMode::Linear,
        address_mode: wgpu::AddressMode::Repeat,
        anisotropy: ANISOTROPY,
    },
];

impl SamplerVariant {
    fn create(&self, device: &wgpu::Device) -> wgpu::Sampler {
        // Anisotropy requires linear filtering at every level.
        let mipmap_filter = match self.filter {
            wgpu::FilterMode::Nearest => wgpu::MipmapFilterMode::Nearest,
            wgpu::FilterMode::Linear => wgpu::MipmapFilterMode::Linear,
        };
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(self.name),
            address_mode_u: self.address_mode,
            address_mode_v: self.address_mode,
            address_mode_w: self.address_mode,
            mag_filter: self.filter,
            min_filter: self.filter,
            mipmap_filter,
            anisotropy_clamp: self.anisotropy,
            ..Default::default()
        })
    }
}

struct State {
    quad: QuadRenderer,
    bind_groups: Vec<wgpu::BindGroup>,
}

#[derive(Default)]
pub struct TexturedQuad {
    state: Option<State>,
    current: usize,
}

pub fn create() -> Box<dyn Example> {
    Box::new(TexturedQuad::default())
}

impl Example for TexturedQuad {
    fn init(&mut self, ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
        let quad = QuadRenderer::new(ctx, UV_REPEAT)?;
        let image = ctx.load_image(IMAGE)?;
        let gpu = ctx.gpu;

        let texture = textured::upload_texture(gpu, IMAGE, &image, wgpu::TextureUsages::TEXTURE_BINDING);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_groups = SAMPLERS
            .iter()
            .map(|variant| quad.bind_group(gpu, &view, &variant.create(&gpu.device)))
            .collect();

        self.state = Some(State { quad, bind_groups });

        log::info!("Press Left/Right to switch sampler state");
        log::info!("Sampler state: {}", SAMPLERS[self.current].name);
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ExampleContext<'_>, input: &InputState) -> Result<(), ExampleError> {
        let previous = self.current;
        if input.just_pressed(Key::Left) {
            self.current = cycle(self.current, SAMPLERS.len(), false);
        }
        if input.just_pressed(Key::Right) {
            self.current = cycle(self.current, SAMPLERS.len(), true);
        }
        if self.current != previous {
            log::info!("Sampler state: {}", SAMPLERS[self.current].name);
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<(), ExampleError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let mut pass = frame.clear_pass(wgpu::Color::BLACK);
        state.quad.draw(&mut pass, &state.bind_groups[self.current]);
        Ok(())
    }

    fn shaders_reloaded(
        &mut self,
        ctx: &mut ExampleContext<'_>,
        shaders: Vec<ReloadedShader<GpuShader>>,
    ) -> Result<(), ExampleError> {
        if let Some(state) = &mut self.state {
            state.quad.shaders_reloaded(ctx.gpu, shaders);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anisotropic_samplers_filter_linearly() {
        for variant in SAMPLERS.iter().filter(|v| v.anisotropy > 1) {
            assert_eq!(variant.filter, wgpu::FilterMode::Linear, "{}", variant.name);
        }
    }
}
