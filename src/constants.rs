// SPDX-License-Identifier: GPL-3.0-only

//! Renderer-wide constants - Single source of truth
//!
//! Quad geometry, depth range, and palette constants live here. These values
//! are shared between the renderer, the shaders (via the define preamble),
//! and the demo binary.

use serde::{Deserialize, Serialize};

/// Vertices per quad (drawn as a triangle strip)
pub const QUAD_VERTEX_COUNT: usize = 4;
/// Components per dynamic quad vertex (x, y + projective w for the
/// camera-texture quad)
pub const QUAD_COMPONENT_COUNT: usize = 3;

/// A quad of 4 vertices x 3 components
pub type QuadCoords = [[f32; QUAD_COMPONENT_COUNT]; QUAD_VERTEX_COUNT];

/// Reference quad spanning the normalized-device-coordinate range [-1,1]^2,
/// in triangle-strip order. Every per-frame coordinate transform starts from
/// this quad; virtual content is always drawn with it directly.
pub const NDC_REFERENCE_QUAD: QuadCoords = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
];

/// Static texture coordinates for sampling the virtual-scene framebuffer,
/// matching the strip order of [`NDC_REFERENCE_QUAD`] (texture v grows
/// downward)
pub const SCENE_UV_QUAD: [[f32; 2]; QUAD_VERTEX_COUNT] =
    [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Depth range limits for visualization (millimeters)
pub const DEPTH_MIN_MM: f32 = 400.0;
pub const DEPTH_MAX_MM: f32 = 4000.0;

/// Invalid depth marker value
pub const DEPTH_INVALID_MM: u16 = 0;
/// Maximum valid depth value (values above this are considered invalid)
pub const DEPTH_MAX_VALID_MM: u16 = 8000;

/// Width of the palette lookup strip in texels
pub const PALETTE_WIDTH: u32 = 256;

/// Default near/far planes for the virtual scene projection (meters)
pub const DEFAULT_Z_NEAR: f32 = 0.1;
pub const DEFAULT_Z_FAR: f32 = 100.0;

/// Depth-visualization palette styles
///
/// These select how depth values are mapped to colors when the background
/// renders the depth image instead of the camera feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaletteStyle {
    /// Turbo colormap - perceptually uniform rainbow (blue=near, red=far)
    #[default]
    Turbo,
    /// Grayscale - bright=near, dark=far
    Grayscale,
}

impl PaletteStyle {
    /// Get all palette variants for CLI/UI iteration
    pub const ALL: [PaletteStyle; 2] = [PaletteStyle::Turbo, PaletteStyle::Grayscale];

    /// Get display name for the palette
    pub fn display_name(&self) -> &'static str {
        match self {
            PaletteStyle::Turbo => "Turbo",
            PaletteStyle::Grayscale => "Grayscale",
        }
    }

    /// Name of the embedded palette strip asset
    pub fn asset_name(&self) -> &'static str {
        match self {
            PaletteStyle::Turbo => "turbo_palette.png",
            PaletteStyle::Grayscale => "grayscale_palette.png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_quad_shape() {
        assert_eq!(NDC_REFERENCE_QUAD.len(), QUAD_VERTEX_COUNT);
        for vertex in NDC_REFERENCE_QUAD {
            assert_eq!(vertex.len(), QUAD_COMPONENT_COUNT);
            assert!(vertex[0].abs() <= 1.0 && vertex[1].abs() <= 1.0);
        }
    }

    #[test]
    fn test_palette_asset_names() {
        for style in PaletteStyle::ALL {
            assert!(style.asset_name().ends_with(".png"));
        }
    }
}
