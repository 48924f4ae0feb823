// SPDX-License-Identifier: GPL-3.0-only

//! Depth palette lookup textures and CPU visualization helpers
//!
//! The GPU side is a single-row lookup strip sampled by the
//! depth-visualization shader; the CPU side converts depth images to
//! viewable RGBA for the demo binary and tests. Both are backed by the same
//! turbo colormap approximation.

use crate::assets;
use crate::constants::{
    DEPTH_MAX_MM, DEPTH_MAX_VALID_MM, DEPTH_MIN_MM, PALETTE_WIDTH, PaletteStyle,
};
use crate::errors::{AssetError, RenderResult};
use tracing::debug;

/// Turbo colormap: perceptually uniform rainbow (blue=near, red=far)
///
/// Polynomial approximation of the Turbo colormap.
#[inline]
fn turbo(t: f32) -> [u8; 4] {
    let r = (0.13572138
        + t * (4.6153926 + t * (-42.66032 + t * (132.13108 + t * (-152.54825 + t * 59.28144)))))
        .clamp(0.0, 1.0);
    let g = (0.09140261
        + t * (2.19418 + t * (4.84296 + t * (-14.18503 + t * (4.27805 + t * 2.53377)))))
        .clamp(0.0, 1.0);
    let b = (0.1066733
        + t * (12.64194 + t * (-60.58204 + t * (109.99648 + t * (-82.52904 + t * 20.43388)))))
        .clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255]
}

/// Grayscale mapping: near=bright, far=dark
#[inline]
fn grayscale(t: f32) -> [u8; 4] {
    let gray = ((1.0 - t) * 255.0) as u8;
    [gray, gray, gray, 255]
}

fn palette_color(style: PaletteStyle, t: f32) -> [u8; 4] {
    match style {
        PaletteStyle::Turbo => turbo(t),
        PaletteStyle::Grayscale => grayscale(t),
    }
}

/// Generate a single-row palette strip as RGBA bytes
///
/// Texel `x` holds the color for normalized depth `x / (width - 1)`. This is
/// the generator behind the embedded palette assets; the `palette` CLI
/// subcommand re-emits them.
pub fn palette_strip(style: PaletteStyle, width: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(width as usize * 4);
    for x in 0..width {
        let t = x as f32 / (width - 1) as f32;
        rgba.extend_from_slice(&palette_color(style, t));
    }
    rgba
}

/// Convert depth data (in millimeters) to RGBA visualization
///
/// Invalid depth values (0 or beyond the valid range) render black. Valid
/// values are normalized into the visualized range and mapped through the
/// palette, matching the depth-visualization shader.
pub fn depth_mm_to_rgba(depth_mm: &[u16], width: u32, height: u32, style: PaletteStyle) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    for &depth in depth_mm.iter().take(pixel_count) {
        if depth == 0 || depth > DEPTH_MAX_VALID_MM {
            rgba.extend_from_slice(&[0, 0, 0, 255]);
        } else {
            let t = ((depth as f32) - DEPTH_MIN_MM) / (DEPTH_MAX_MM - DEPTH_MIN_MM);
            rgba.extend_from_slice(&palette_color(style, t.clamp(0.0, 1.0)));
        }
    }
    rgba
}

/// GPU-resident palette lookup strip
pub struct PaletteTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Decode the embedded palette strip for `style` and upload it
///
/// Fails when the asset is missing from the bundle or does not decode to a
/// single-row image.
pub fn create_palette_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    style: PaletteStyle,
) -> RenderResult<PaletteTexture> {
    let strip = assets::load_palette_image(style.asset_name())?;
    if strip.height() != 1 || strip.width() < 2 {
        return Err(AssetError::DecodeFailed(format!(
            "{}: expected a single-row strip, got {}x{}",
            style.asset_name(),
            strip.width(),
            strip.height()
        ))
        .into());
    }

    debug!(
        palette = style.display_name(),
        width = strip.width(),
        "Uploading palette strip"
    );

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("backdrop_palette_texture"),
        size: wgpu::Extent3d {
            width: strip.width(),
            height: 1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        strip.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(strip.width() * 4),
            rows_per_image: Some(1),
        },
        wgpu::Extent3d {
            width: strip.width(),
            height: 1,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    Ok(PaletteTexture { texture, view })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turbo_endpoints() {
        // Blue-dominant in the near quarter, red-dominant at the far end.
        let near = turbo(0.2);
        let far = turbo(1.0);
        assert!(near[2] > near[0], "near quarter should lean blue");
        assert!(far[0] > far[2], "far end should lean red");
    }

    #[test]
    fn test_palette_strip_shape() {
        let strip = palette_strip(PaletteStyle::Turbo, PALETTE_WIDTH);
        assert_eq!(strip.len(), PALETTE_WIDTH as usize * 4);
        let gray = palette_strip(PaletteStyle::Grayscale, PALETTE_WIDTH);
        assert_eq!(&gray[..4], &[255, 255, 255, 255], "near end is white");
        assert_eq!(&gray[gray.len() - 4..], &[0, 0, 0, 255], "far end is black");
    }

    #[test]
    fn test_depth_invalid() {
        let depth = vec![0u16, 9000, 0, 9000];
        let rgba = depth_mm_to_rgba(&depth, 2, 2, PaletteStyle::Turbo);
        for chunk in rgba.chunks(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_depth_grayscale() {
        // Near depth should be bright, far depth should be dark.
        let depth = vec![400u16, 4000u16];
        let rgba = depth_mm_to_rgba(&depth, 2, 1, PaletteStyle::Grayscale);
        assert!(rgba[0] > 200);
        assert!(rgba[4] < 50);
    }
}
