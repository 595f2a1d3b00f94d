//! Resolver behaviour against a real filesystem.
//!
//! Covers stage inference, cache hits, recompilation of stale artifacts,
//! missing shaders and the naga compile path end to end.

mod common;

use std::fs;

use common::{ContentDir, MockCompiler, MockDevice, set_mtime, time};
use gpu_examples_shaders::{
    NagaCompiler, ShaderError, ShaderFormat, ShaderFormats, ShaderOrigin, ShaderResolver,
    ShaderResourceCounts, ShaderStage,
};
use rstest::rstest;

const MINIMAL_VERTEX_WGSL: &str = r#"
@vertex
fn main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(f32(index), 0.0, 0.0, 1.0);
}
"#;

#[rstest]
#[case::vertex("Tri.vert", ShaderStage::Vertex)]
#[case::fragment("Tri.frag", ShaderStage::Fragment)]
fn test_load_shader_infers_stage(#[case] name: &str, #[case] stage: ShaderStage) {
    let content = ContentDir::new();
    content.write_source(&format!("{name}.slang"), "src");
    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(&[1, 2, 3, 4]));
    let device = MockDevice::spirv();

    let resources = ShaderResourceCounts::new().with_samplers(1);
    let shader = resolver.load_shader(&device, name, resources).unwrap();

    assert_eq!(shader.stage, stage);
    assert_eq!(shader.code, vec![1, 2, 3, 4]);
    assert_eq!(shader.entry_point, "main");
    assert_eq!(shader.resources, resources);
    assert_eq!(resolver.compiler().calls(), 1);
}

#[test]
fn test_uninferable_stage_never_compiles() {
    let content = ContentDir::new();
    content.write_source("FillTexture.comp.slang", "src");
    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(&[1]));
    let device = MockDevice::spirv();

    let err = resolver
        .load_shader(&device, "FillTexture.comp", ShaderResourceCounts::default())
        .unwrap_err();

    assert!(matches!(err, ShaderError::InvalidStage(_)));
    assert_eq!(resolver.compiler().calls(), 0);
    assert_eq!(device.created(), 0);

    // An explicit stage works for the same shader.
    let shader = resolver
        .load_shader_with_stage(
            &device,
            "FillTexture.comp",
            ShaderStage::Compute,
            ShaderResourceCounts::new().with_storage_textures(1),
        )
        .unwrap();
    assert_eq!(shader.stage, ShaderStage::Compute);
    assert_eq!(resolver.compiler().calls(), 1);
}

#[test]
fn test_fresh_cache_skips_compiler() {
    let content = ContentDir::new();
    let source = content.write_source("Tri.vert.slang", "src");
    let artifact = content.write_artifact("Tri.vert", ShaderStage::Vertex, b"cached");
    set_mtime(&source, time(0));
    set_mtime(&artifact, time(0));

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"fresh"));
    let resolved = resolver.resolve("Tri.vert", ShaderStage::Vertex).unwrap();

    assert_eq!(resolved.origin, ShaderOrigin::Cache);
    assert_eq!(resolved.code, b"cached");
    assert_eq!(resolver.compiler().calls(), 0);
}

#[test]
fn test_cache_without_source_is_used() {
    let content = ContentDir::new();
    content.write_artifact("Shipped.frag", ShaderStage::Fragment, b"precompiled");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"x"));
    let resolved = resolver.resolve("Shipped.frag", ShaderStage::Fragment).unwrap();

    assert_eq!(resolved.origin, ShaderOrigin::Cache);
    assert_eq!(resolver.compiler().calls(), 0);
}

#[test]
fn test_stale_cache_recompiles_and_overwrites() {
    let content = ContentDir::new();
    let source = content.write_source("Tri.vert.slang", "src");
    let artifact = content.write_artifact("Tri.vert", ShaderStage::Vertex, b"old");
    set_mtime(&artifact, time(0));
    set_mtime(&source, time(60));

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"new bytecode"));
    let resolved = resolver.resolve("Tri.vert", ShaderStage::Vertex).unwrap();

    assert_eq!(resolved.origin, ShaderOrigin::Compiled);
    assert_eq!(resolver.compiler().calls(), 1);
    assert_eq!(fs::read(&artifact).unwrap(), b"new bytecode");

    // The rewritten artifact is now fresh.
    let again = resolver.resolve("Tri.vert", ShaderStage::Vertex).unwrap();
    assert_eq!(again.origin, ShaderOrigin::Cache);
    assert_eq!(resolver.compiler().calls(), 1);
}

#[test]
fn test_fallback_source_extension() {
    let content = ContentDir::new();
    content.write_source("Legacy.frag.hlsl", "src");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"hlsl"));
    assert_eq!(
        resolver.source_path("Legacy.frag"),
        Some(content.source_path("Legacy.frag.hlsl"))
    );
    let resolved = resolver.resolve("Legacy.frag", ShaderStage::Fragment).unwrap();
    assert_eq!(resolved.code, b"hlsl");
}

#[test]
fn test_missing_shader_has_no_side_effects() {
    let content = ContentDir::new();
    let before = content.entries();

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"x"));
    let device = MockDevice::spirv();
    let err = resolver
        .load_shader(&device, "Missing.vert", ShaderResourceCounts::default())
        .unwrap_err();

    assert!(matches!(err, ShaderError::SourceNotFound { .. }));
    assert_eq!(resolver.compiler().calls(), 0);
    assert_eq!(device.created(), 0);
    assert_eq!(content.entries(), before);
}

#[test]
fn test_compile_failure_is_not_cached() {
    let content = ContentDir::new();
    content.write_source("Broken.frag.slang", "src");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::failing());
    let err = resolver
        .resolve("Broken.frag", ShaderStage::Fragment)
        .unwrap_err();

    assert!(matches!(err, ShaderError::CompilationFailed { .. }));
    assert!(!resolver.artifact_path("Broken.frag", ShaderStage::Fragment).exists());
}

#[test]
fn test_empty_bytecode_is_rejected() {
    let content = ContentDir::new();
    content.write_source("Empty.vert.slang", "src");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b""));
    let err = resolver.resolve("Empty.vert", ShaderStage::Vertex).unwrap_err();
    assert!(matches!(err, ShaderError::CompilationFailed { .. }));
}

#[test]
fn test_device_format_mismatch() {
    let content = ContentDir::new();
    content.write_source("Tri.vert.slang", "src");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"x"));
    let device = MockDevice::new(ShaderFormats::DXIL | ShaderFormats::MSL);
    let err = resolver
        .load_shader(&device, "Tri.vert", ShaderResourceCounts::default())
        .unwrap_err();

    assert!(matches!(
        err,
        ShaderError::UnsupportedFormat {
            format: ShaderFormat::SpirV,
            ..
        }
    ));
    assert_eq!(resolver.compiler().calls(), 0);
}

#[test]
fn test_device_rejection_is_returned() {
    let content = ContentDir::new();
    content.write_source("Tri.vert.slang", "src");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"x"));
    let mut device = MockDevice::spirv();
    device.reject = true;
    let err = resolver
        .load_shader(&device, "Tri.vert", ShaderResourceCounts::default())
        .unwrap_err();
    assert!(matches!(err, ShaderError::CreationFailed { .. }));
}

#[test]
fn test_naga_output_matches_cache_file() {
    let content = ContentDir::new();
    content.write_source("Minimal.vert.wgsl", MINIMAL_VERTEX_WGSL);

    let resolver = ShaderResolver::new(content.config.clone(), NagaCompiler::new());
    let resolved = resolver.resolve("Minimal.vert", ShaderStage::Vertex).unwrap();

    assert_eq!(resolved.origin, ShaderOrigin::Compiled);
    assert!(!resolved.code.is_empty());
    let cached = fs::metadata(resolver.artifact_path("Minimal.vert", ShaderStage::Vertex)).unwrap();
    assert_eq!(cached.len(), resolved.code.len() as u64);
}

#[test]
fn test_each_stage_has_its_own_artifact() {
    let content = ContentDir::new();
    content.write_source("Quad.slang", "src");

    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"code"));
    let vertex = resolver.resolve("Quad", ShaderStage::Vertex).unwrap();
    let fragment = resolver.resolve("Quad", ShaderStage::Fragment).unwrap();

    assert_eq!(vertex.origin, ShaderOrigin::Compiled);
    assert_eq!(fragment.origin, ShaderOrigin::Compiled);
    assert_eq!(resolver.compiler().calls(), 2);
    assert!(resolver.artifact_path("Quad", ShaderStage::Vertex).is_file());
    assert!(resolver.artifact_path("Quad", ShaderStage::Fragment).is_file());

    // Each stage is now served from its own cache entry.
    let again = resolver.resolve("Quad", ShaderStage::Fragment).unwrap();
    assert_eq!(again.origin, ShaderOrigin::Cache);
    assert_eq!(resolver.compiler().calls(), 2);
}

#[test]
fn test_logging_fixture_can_be_installed_repeatedly() {
    common::init_logging();
    common::init_logging();
    let content = ContentDir::new();
    log::debug!("content root {:?}", content.dir.path());
    assert!(log::log_enabled!(log::Level::Debug));
}
