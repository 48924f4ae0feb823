// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::QuadCoords;

/// Physical rotation of the display relative to the camera sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl DisplayRotation {
    /// Whether this rotation swaps the camera image's width and height
    pub fn swaps_aspect(&self) -> bool {
        matches!(self, DisplayRotation::Deg90 | DisplayRotation::Deg270)
    }
}

/// Named coordinate spaces the reference quad can be transformed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpace {
    /// Device screen space, possibly expanded beyond NDC for EIS
    /// compensation of the background feed
    Screen,
    /// Normalized camera-texture space ([0,1]^2, v grows downward)
    CameraTexture,
}

/// Per-frame coordinate transform supplied by the tracking runtime
///
/// Implementations map the fixed NDC reference quad into the requested
/// target space for the device's current rotation and viewport size. The
/// third component of each output vertex is space-specific: unused (0.0) for
/// screen coordinates, the projective divisor for camera-texture
/// coordinates.
pub trait DisplayTransform {
    fn transform_quad(&self, space: TargetSpace, reference: &QuadCoords) -> QuadCoords;
}

/// Borrowed view of an RGBA8 camera color image
#[derive(Debug, Clone, Copy)]
pub struct CameraImage<'a> {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA rows, `width * height * 4` bytes
    pub data: &'a [u8],
}

impl CameraImage<'_> {
    pub fn expected_len(&self) -> usize {
        (self.width * self.height * 4) as usize
    }
}

/// Borrowed view of a two-channel 8-bit camera depth image
///
/// Each texel holds a 16-bit depth in millimeters: low byte in the first
/// channel, high byte in the second.
#[derive(Debug, Clone, Copy)]
pub struct DepthImage<'a> {
    pub width: u32,
    pub height: u32,
    /// Tightly packed two-channel rows, `width * height * 2` bytes
    pub data: &'a [u8],
}

impl DepthImage<'_> {
    pub fn expected_len(&self) -> usize {
        (self.width * self.height * 2) as usize
    }

    /// Aspect ratio of the depth image (width over height)
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
