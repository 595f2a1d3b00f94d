//! Hot reload driven through the event sender, plus one real watcher test.

#![cfg(feature = "hot-reload")]

mod common;

use std::time::{Duration, Instant};

use common::{ContentDir, MockCompiler, MockDevice, set_mtime, time};
use gpu_examples_shaders::{
    ShaderHotReloader, ShaderResolver, ShaderResourceCounts, ShaderStage,
};

fn tracked_setup() -> (ContentDir, ShaderResolver<MockCompiler>, std::path::PathBuf) {
    let content = ContentDir::new();
    let source = content.write_source("Quad.frag.slang", "v1");
    set_mtime(&source, time(0));
    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"code"));
    (content, resolver, source)
}

#[test]
fn test_untouched_sources_are_not_reported() {
    let (_content, resolver, source) = tracked_setup();
    let (mut reloader, sender) = ShaderHotReloader::without_watcher(8);
    reloader.track(&resolver, "Quad.frag", ShaderStage::Fragment, ShaderResourceCounts::default());

    // Event without a newer modification time.
    sender.push(source);
    assert!(reloader.poll_changed().is_empty());
}

#[test]
fn test_modified_source_is_reloaded() {
    let (content, resolver, source) = tracked_setup();
    let device = MockDevice::spirv();
    let (mut reloader, sender) = ShaderHotReloader::without_watcher(8);
    let resources = ShaderResourceCounts::new().with_samplers(1);
    reloader.track(&resolver, "Quad.frag", ShaderStage::Fragment, resources);

    let artifact = content.write_artifact("Quad.frag", ShaderStage::Fragment, b"old");
    set_mtime(&artifact, time(5));
    set_mtime(&source, time(10));
    sender.push(source.clone());

    let reloaded = reloader.reload(&resolver, &device);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].name, "Quad.frag");
    assert_eq!(reloaded[0].stage, ShaderStage::Fragment);
    assert_eq!(reloaded[0].shader.code, b"code");
    assert_eq!(reloaded[0].shader.resources, resources);
    assert_eq!(resolver.compiler().calls(), 1);

    // Same timestamp again: nothing to do.
    sender.push(source);
    assert!(reloader.reload(&resolver, &device).is_empty());
}

#[test]
fn test_failed_reload_keeps_retrying() {
    let content = ContentDir::new();
    let source = content.write_source("Quad.frag.slang", "v1");
    set_mtime(&source, time(0));
    let failing = ShaderResolver::new(content.config.clone(), MockCompiler::failing());
    let device = MockDevice::spirv();
    let (mut reloader, sender) = ShaderHotReloader::without_watcher(8);
    reloader.track(&failing, "Quad.frag", ShaderStage::Fragment, ShaderResourceCounts::default());

    set_mtime(&source, time(10));
    sender.push(source.clone());
    assert!(reloader.reload(&failing, &device).is_empty());

    // The stored time did not advance, so the next event still reports it.
    sender.push(source);
    assert_eq!(reloader.poll_changed(), vec!["Quad.frag".to_string()]);
}

#[test]
fn test_overflow_rescans_all_tracked() {
    let content = ContentDir::new();
    let a = content.write_source("A.vert.slang", "a");
    let b = content.write_source("B.frag.slang", "b");
    set_mtime(&a, time(0));
    set_mtime(&b, time(0));
    let resolver = ShaderResolver::new(content.config.clone(), MockCompiler::new(b"x"));

    let (mut reloader, sender) = ShaderHotReloader::without_watcher(1);
    reloader.track(&resolver, "A.vert", ShaderStage::Vertex, ShaderResourceCounts::default());
    reloader.track(&resolver, "B.frag", ShaderStage::Fragment, ShaderResourceCounts::default());

    set_mtime(&b, time(10));
    // First push fills the queue, the rest overflow.
    sender.push(content.source_path("unrelated.txt"));
    sender.push(content.source_path("unrelated.txt"));
    sender.push(b.clone());

    assert_eq!(reloader.poll_changed(), vec!["B.frag".to_string()]);
    // Overflow flag was consumed.
    assert!(reloader.poll_changed().is_empty());
}

#[test]
fn test_untracked_and_sourceless_names() {
    let (content, resolver, source) = tracked_setup();
    let (mut reloader, sender) = ShaderHotReloader::without_watcher(8);

    reloader.track(&resolver, "Missing.vert", ShaderStage::Vertex, ShaderResourceCounts::default());
    assert!(!reloader.is_tracked("Missing.vert"));

    reloader.track(&resolver, "Quad.frag", ShaderStage::Fragment, ShaderResourceCounts::default());
    reloader.untrack("Quad.frag");
    set_mtime(&source, time(10));
    sender.push(source);
    assert!(reloader.poll_changed().is_empty());
    drop(content);
}

#[test]
#[ignore = "depends on platform file notification latency"]
fn test_real_watcher_reports_changes() {
    let (content, resolver, source) = tracked_setup();
    let mut reloader = ShaderHotReloader::new(&content.config.source_root()).unwrap();
    reloader.track(&resolver, "Quad.frag", ShaderStage::Fragment, ShaderResourceCounts::default());

    std::fs::write(&source, "v2").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if reloader.poll_changed() == vec!["Quad.frag".to_string()] {
            break;
        }
        assert!(Instant::now() < deadline, "no change reported");
        std::thread::sleep(Duration::from_millis(50));
    }
}
