//! Every shipped shader compiles to valid SPIR-V.

use std::path::PathBuf;

use gpu_examples_shaders::{NagaCompiler, ResolverConfig, ShaderStage, infer_stage};
use rstest::rstest;

fn source_path(name: &str) -> PathBuf {
    ResolverConfig::new(gpu_examples_demos::default_content_root())
        .source_root()
        .join(format!("{name}.wgsl"))
}

#[rstest]
#[case::raw_triangle("RawTriangle.vert")]
#[case::solid_color("SolidColor.frag")]
#[case::position_color("PositionColor.vert")]
#[case::position_color_instanced("PositionColorInstanced.vert")]
#[case::textured_quad_vert("TexturedQuad.vert")]
#[case::textured_quad_frag("TexturedQuad.frag")]
#[case::fill_texture("FillTexture.comp")]
#[case::blit_vert("Blit.vert")]
#[case::blit_frag("Blit.frag")]
#[case::textured_quad_array("TexturedQuadArray.frag")]
#[case::position_color_transform("PositionColorTransform.vert")]
#[case::solid_color_depth("SolidColorDepth.frag")]
#[case::depth_outline("DepthOutline.frag")]
#[case::skybox_vert("Skybox.vert")]
#[case::skybox_frag("Skybox.frag")]
#[case::pull_sprite_batch("PullSpriteBatch.vert")]
#[case::textured_quad_color("TexturedQuadColor.frag")]
#[case::textured_quad_color_with_matrix("TexturedQuadColorWithMatrix.vert")]
#[case::sprite_batch("SpriteBatch.comp")]
fn test_shader_compiles(#[case] name: &str) {
    let stage = infer_stage(name).unwrap_or(ShaderStage::Compute);
    let source = std::fs::read_to_string(source_path(name)).unwrap();

    let words = NagaCompiler::new()
        .compile_wgsl(name, &source, stage, "main")
        .unwrap();

    assert_eq!(words[0], 0x0723_0203);
}

#[test]
fn test_every_source_is_covered() {
    let dir = ResolverConfig::new(gpu_examples_demos::default_content_root()).source_root();
    let count = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "wgsl"))
        .count();
    assert_eq!(count, 19);
}
