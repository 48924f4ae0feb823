// SPDX-License-Identifier: GPL-3.0-only

//! Deterministic stand-in for a tracking runtime
//!
//! Produces the same coordinate transforms a real AR session would: the
//! screen quad optionally expanded for EIS, and the camera-texture quad
//! rotated and center-cropped to the display's aspect ratio.

use super::types::{DisplayRotation, DisplayTransform, TargetSpace};
use crate::constants::QuadCoords;

/// Synthetic per-frame display transform
#[derive(Debug, Clone, Copy)]
pub struct SyntheticTransform {
    rotation: DisplayRotation,
    viewport_width: u32,
    viewport_height: u32,
    camera_width: u32,
    camera_height: u32,
    /// Fraction by which the background screen quad is expanded beyond NDC
    /// so EIS warping never reveals the screen edge
    eis_expansion: f32,
}

impl SyntheticTransform {
    pub fn new(
        viewport_width: u32,
        viewport_height: u32,
        camera_width: u32,
        camera_height: u32,
    ) -> Self {
        Self {
            rotation: DisplayRotation::Deg0,
            viewport_width,
            viewport_height,
            camera_width,
            camera_height,
            eis_expansion: 0.0,
        }
    }

    pub fn with_eis_expansion(mut self, expansion: f32) -> Self {
        self.eis_expansion = expansion.max(0.0);
        self
    }

    pub fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    fn screen_quad(&self, reference: &QuadCoords) -> QuadCoords {
        let scale = 1.0 + self.eis_expansion;
        let mut out = *reference;
        for vertex in &mut out {
            vertex[0] *= scale;
            vertex[1] *= scale;
            vertex[2] = 0.0;
        }
        out
    }

    fn camera_texture_quad(&self, reference: &QuadCoords) -> QuadCoords {
        // Camera aspect as seen through the current rotation.
        let (cam_w, cam_h) = if self.rotation.swaps_aspect() {
            (self.camera_height as f32, self.camera_width as f32)
        } else {
            (self.camera_width as f32, self.camera_height as f32)
        };
        let camera_aspect = cam_w / cam_h;
        let display_aspect = self.viewport_width as f32 / self.viewport_height as f32;

        // Center-crop the longer camera dimension so the feed fills the
        // display without letterboxing.
        let (crop_u, crop_v) = if camera_aspect > display_aspect {
            (display_aspect / camera_aspect, 1.0)
        } else {
            (1.0, camera_aspect / display_aspect)
        };

        let mut out = *reference;
        for vertex in &mut out {
            // NDC to texture space (v grows downward).
            let u = (vertex[0] + 1.0) * 0.5;
            let v = (1.0 - vertex[1]) * 0.5;

            let (u, v) = match self.rotation {
                DisplayRotation::Deg0 => (u, v),
                DisplayRotation::Deg90 => (v, 1.0 - u),
                DisplayRotation::Deg180 => (1.0 - u, 1.0 - v),
                DisplayRotation::Deg270 => (1.0 - v, u),
            };

            vertex[0] = 0.5 + (u - 0.5) * crop_u;
            vertex[1] = 0.5 + (v - 0.5) * crop_v;
            vertex[2] = 1.0;
        }
        out
    }
}

impl DisplayTransform for SyntheticTransform {
    fn transform_quad(&self, space: TargetSpace, reference: &QuadCoords) -> QuadCoords {
        match space {
            TargetSpace::Screen => self.screen_quad(reference),
            TargetSpace::CameraTexture => self.camera_texture_quad(reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NDC_REFERENCE_QUAD;

    #[test]
    fn test_screen_quad_expansion() {
        let transform = SyntheticTransform::new(640, 480, 640, 480).with_eis_expansion(0.1);
        let quad = transform.transform_quad(TargetSpace::Screen, &NDC_REFERENCE_QUAD);
        assert_eq!(quad[0], [-1.1, -1.1, 0.0]);
        assert_eq!(quad[3], [1.1, 1.1, 0.0]);
    }

    #[test]
    fn test_camera_quad_identity_when_aspects_match() {
        let transform = SyntheticTransform::new(640, 480, 640, 480);
        let quad = transform.transform_quad(TargetSpace::CameraTexture, &NDC_REFERENCE_QUAD);
        // NDC bottom-left maps to texture bottom-left (v = 1).
        assert_eq!(quad[0], [0.0, 1.0, 1.0]);
        assert_eq!(quad[3], [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_camera_quad_rotation_90() {
        let mut transform = SyntheticTransform::new(480, 640, 640, 480);
        transform.set_rotation(DisplayRotation::Deg90);
        let quad = transform.transform_quad(TargetSpace::CameraTexture, &NDC_REFERENCE_QUAD);
        // Rotation swaps the camera aspect to 480x640, matching the
        // viewport, so no crop: NDC bottom-left lands on (1, 1).
        assert_eq!(quad[0], [1.0, 1.0, 1.0]);
        assert_eq!(quad[3], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_camera_quad_center_crop() {
        // 16:9 camera on a square viewport crops u symmetrically.
        let transform = SyntheticTransform::new(480, 480, 1280, 720);
        let quad = transform.transform_quad(TargetSpace::CameraTexture, &NDC_REFERENCE_QUAD);
        let crop = 1.0 / (1280.0 / 720.0);
        let expected_left = 0.5 - crop * 0.5;
        assert!((quad[0][0] - expected_left).abs() < 1e-6);
        assert!((quad[0][1] - 1.0).abs() < 1e-6, "v is uncropped");
    }

    #[test]
    fn test_transform_deterministic() {
        let transform = SyntheticTransform::new(800, 600, 640, 480).with_eis_expansion(0.05);
        for space in [TargetSpace::Screen, TargetSpace::CameraTexture] {
            let a = transform.transform_quad(space, &NDC_REFERENCE_QUAD);
            let b = transform.transform_quad(space, &NDC_REFERENCE_QUAD);
            assert_eq!(a, b);
        }
    }
}
