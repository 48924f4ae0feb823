// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for renderer options

use ar_backdrop::{PaletteStyle, RendererOptions};

#[test]
fn test_options_default() {
    let options = RendererOptions::default();

    assert!(
        !options.depth_visualization,
        "Depth visualization should be disabled by default"
    );
    assert!(!options.occlusion, "Occlusion should be disabled by default");
    assert_eq!(options.palette, PaletteStyle::Turbo);
}

#[test]
fn test_options_json_round_trip() {
    let mut options = RendererOptions::default();
    options.occlusion = true;
    options.palette = PaletteStyle::Grayscale;
    options.synthetic.depth_width = 320;

    let json = serde_json::to_string(&options).expect("options should serialize");
    let restored: RendererOptions = serde_json::from_str(&json).expect("options should parse");
    assert_eq!(restored, options);
}

#[test]
fn test_options_file_round_trip() {
    let mut path = std::env::temp_dir();
    path.push(format!("ar-backdrop-options-{}.json", std::process::id()));

    let mut options = RendererOptions::default();
    options.depth_visualization = true;
    options.save(&path).expect("options should save");

    let restored = RendererOptions::load(&path).expect("options should load");
    let _ = std::fs::remove_file(&path);
    assert_eq!(restored, options);
}

#[test]
fn test_options_missing_file_errors() {
    let err = RendererOptions::load(std::path::Path::new("/nonexistent/options.json"))
        .expect_err("loading a missing file should fail");
    assert!(matches!(err, ar_backdrop::RenderError::Options(_)));
}
