// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use ar_backdrop::constants::{
    DEPTH_MAX_MM, DEPTH_MIN_MM, NDC_REFERENCE_QUAD, PaletteStyle, QUAD_VERTEX_COUNT,
    SCENE_UV_QUAD,
};

#[test]
fn test_palette_style_values() {
    // Test that all palette styles exist (Turbo, Grayscale)
    assert_eq!(PaletteStyle::ALL.len(), 2);
    for style in PaletteStyle::ALL {
        assert!(!style.display_name().is_empty());
    }
}

#[test]
fn test_reference_quad_spans_ndc() {
    assert_eq!(NDC_REFERENCE_QUAD.len(), QUAD_VERTEX_COUNT);

    // The strip must cover all four corners of [-1,1]^2.
    for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
        assert!(
            NDC_REFERENCE_QUAD
                .iter()
                .any(|v| v[0] == x && v[1] == y && v[2] == 0.0),
            "corner ({}, {}) missing from reference quad",
            x,
            y
        );
    }
}

#[test]
fn test_scene_uv_quad_matches_strip_order() {
    // Scene UVs live in [0,1]^2 and follow the reference quad's vertex
    // order: NDC y = -1 (bottom) maps to v = 1.
    for (ndc, uv) in NDC_REFERENCE_QUAD.iter().zip(SCENE_UV_QUAD.iter()) {
        assert_eq!(uv[0], (ndc[0] + 1.0) * 0.5);
        assert_eq!(uv[1], (1.0 - ndc[1]) * 0.5);
    }
}

#[test]
fn test_depth_range_is_sane() {
    assert!(DEPTH_MIN_MM < DEPTH_MAX_MM);
    assert!(DEPTH_MIN_MM > 0.0);
}
