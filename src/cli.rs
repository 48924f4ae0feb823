// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the offscreen demo
//!
//! This module drives the renderer through the documented per-frame order
//! against the synthetic tracking source:
//! - `render` composites procedurally generated camera/depth frames with a
//!   small virtual scene and saves the result as a PNG
//! - `palette` re-emits a palette lookup strip

use ar_backdrop::constants::{DEFAULT_Z_FAR, DEFAULT_Z_NEAR, PALETTE_WIDTH, PaletteStyle};
use ar_backdrop::gpu::{create_render_device, read_buffer_async};
use ar_backdrop::renderer::palette_strip;
use ar_backdrop::{
    BackgroundRenderer, CameraImage, DepthImage, RendererOptions, SyntheticTransform,
    VirtualSceneFrame,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Render `frames` synthetic frames and write the final composite to `output`
pub fn run_render(
    width: u32,
    height: u32,
    frames: u32,
    occlusion: bool,
    depth_visualization: bool,
    options_path: Option<&Path>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let frames = frames.max(1);
    let mut options = match options_path {
        Some(path) => RendererOptions::load(path)?,
        None => RendererOptions::default(),
    };
    // Command-line flags enable modes on top of the options file.
    options.occlusion |= occlusion;
    options.depth_visualization |= depth_visualization;

    let (device, queue, gpu_info) = pollster::block_on(create_render_device("ar-backdrop"))?;
    info!(
        adapter = %gpu_info.adapter_name,
        backend = ?gpu_info.backend,
        "Rendering offscreen"
    );

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("backdrop_demo_target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut renderer = BackgroundRenderer::new(
        Arc::clone(&device),
        Arc::clone(&queue),
        TARGET_FORMAT,
        options.palette,
    );
    renderer.set_depth_visualization(options.depth_visualization)?;
    renderer.set_occlusion(options.occlusion)?;

    let synthetic = options.synthetic;
    let transform = SyntheticTransform::new(
        width,
        height,
        synthetic.camera_width,
        synthetic.camera_height,
    )
    .with_eis_expansion(synthetic.eis_expansion);

    let scene = SceneTextures::new(&device, width, height);

    // Staging buffer for the final readback; rows padded to the copy
    // alignment.
    let padded_bytes_per_row = (width * 4).div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("backdrop_demo_staging"),
        size: (padded_bytes_per_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    for frame in 0..frames {
        renderer.update_display_geometry(&transform);

        let camera_rgba = synthetic_camera_rgba(
            synthetic.camera_width,
            synthetic.camera_height,
            frame,
        );
        renderer.update_camera_color_texture(&CameraImage {
            width: synthetic.camera_width,
            height: synthetic.camera_height,
            data: &camera_rgba,
        });

        let depth_rg8 = synthetic_depth_rg8(synthetic.depth_width, synthetic.depth_height);
        renderer.update_camera_depth_texture(&DepthImage {
            width: synthetic.depth_width,
            height: synthetic.depth_height,
            data: &depth_rg8,
        });

        scene.upload_sprite(&queue, DEFAULT_Z_NEAR, DEFAULT_Z_FAR);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("backdrop_demo_encoder"),
        });
        renderer.draw_background(&mut encoder, &target_view);
        renderer.draw_virtual_scene(
            &mut encoder,
            &target_view,
            &VirtualSceneFrame {
                color: &scene.color_view,
                depth: &scene.depth_view,
            },
            DEFAULT_Z_NEAR,
            DEFAULT_Z_FAR,
        );

        if frame == frames - 1 {
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &target,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &staging,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(padded_bytes_per_row),
                        rows_per_image: Some(height),
                    },
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    let padded = pollster::block_on(read_buffer_async(&device, &staging))?;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for row in 0..height {
        let start = (row * padded_bytes_per_row) as usize;
        pixels.extend_from_slice(&padded[start..start + (width * 4) as usize]);
    }

    let image = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or("rendered pixel data has unexpected size")?;
    image.save(output)?;

    info!(path = %output.display(), frames, "Wrote composite");
    println!("Wrote {} ({}x{}, {} frames)", output.display(), width, height, frames);
    Ok(())
}

/// Write the palette strip for `style` to `output`
pub fn run_palette(style: &str, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let style = match style.to_ascii_lowercase().as_str() {
        "turbo" => PaletteStyle::Turbo,
        "grayscale" => PaletteStyle::Grayscale,
        other => return Err(format!("unknown palette style: {}", other).into()),
    };

    let strip = palette_strip(style, PALETTE_WIDTH);
    let image = image::RgbaImage::from_raw(PALETTE_WIDTH, 1, strip)
        .ok_or("palette strip has unexpected size")?;
    image.save(output)?;

    println!("Wrote {} ({})", output.display(), style.display_name());
    Ok(())
}

/// Virtual-scene color and depth stand-ins for the demo
///
/// The renderer only needs texture views; the demo fills them with a small
/// sprite instead of rendering actual 3D content.
struct SceneTextures {
    width: u32,
    height: u32,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl SceneTextures {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backdrop_demo_scene_color"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        // Scene depth as an unfilterable float texture; a real host would
        // hand over its depth attachment instead.
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backdrop_demo_scene_depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            width,
            height,
            color,
            color_view,
            depth,
            depth_view,
        }
    }

    /// Fill the scene with a centered sprite 1.5 m in front of the camera
    fn upload_sprite(&self, queue: &wgpu::Queue, z_near: f32, z_far: f32) {
        let (w, h) = (self.width as usize, self.height as usize);
        let (left, right) = (w / 3, 2 * w / 3);
        let (top, bottom) = (h / 3, 2 * h / 3);

        let sprite_depth = scene_buffer_depth(1.5, z_near, z_far);

        let mut color = vec![0u8; w * h * 4];
        let mut depth = vec![1.0f32; w * h];
        for y in top..bottom {
            for x in left..right {
                let i = y * w + x;
                color[i * 4..i * 4 + 4].copy_from_slice(&[235, 140, 52, 255]);
                depth[i] = sprite_depth;
            }
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &color,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.depth,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&depth),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Depth-buffer value of a point `z_m` meters along the view ray
fn scene_buffer_depth(z_m: f32, z_near: f32, z_far: f32) -> f32 {
    ((z_far / (z_far - z_near)) * (1.0 - z_near / z_m)).clamp(0.0, 1.0)
}

/// Procedural camera frame: a hue gradient drifting with the frame index
fn synthetic_camera_rgba(width: u32, height: u32, frame: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    let shift = (frame * 8) as f32;
    for y in 0..height {
        let brightness = 0.55 + 0.45 * (y as f32 / height.max(1) as f32);
        for x in 0..width {
            let t = ((x as f32 + shift) / width as f32) % 1.0;
            let r = (t * 255.0 * brightness) as u8;
            let g = ((1.0 - t) * 200.0 * brightness) as u8;
            let b = (120.0 * brightness) as u8;
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    rgba
}

/// Procedural depth frame: near at the center, falling off radially, with
/// an invalid band along the top edge
fn synthetic_depth_rg8(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 2) as usize);
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let max_radius = (cx * cx + cy * cy).sqrt();
    for y in 0..height {
        for x in 0..width {
            let mm: u16 = if y < height / 16 {
                // Sensor dropout region.
                0
            } else {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let radius = (dx * dx + dy * dy).sqrt() / max_radius;
                (800.0 + radius * 3200.0) as u16
            };
            data.push((mm & 0xff) as u8);
            data.push((mm >> 8) as u8);
        }
    }
    data
}
