// SPDX-License-Identifier: GPL-3.0-only

//! Background camera-feed and occlusion renderer
//!
//! Owns the camera color/depth textures, the quad mesh, and the two shader
//! program slots, and exposes the per-frame operations the hosting render
//! loop drives: geometry update, texture updates, background draw,
//! virtual-scene draw. Mode changes rebuild the affected program from
//! scratch.
//!
//! Per-frame ordering contract: `update_display_geometry` first, then the
//! texture updates, then the draws.

mod mesh;
mod palette;
mod programs;

pub use mesh::QuadMesh;
pub use palette::{PaletteTexture, create_palette_texture, depth_mm_to_rgba, palette_strip};
pub use programs::{BackgroundKind, OcclusionParams, ShaderSlot};
pub use programs::{compose_background_camera, compose_background_depth, compose_occlusion};

use crate::constants::{DEFAULT_Z_FAR, DEFAULT_Z_NEAR, NDC_REFERENCE_QUAD, PaletteStyle};
use crate::errors::RenderResult;
use crate::gpu::CachedDimensions;
use crate::tracking::{CameraImage, DepthImage, DisplayTransform, TargetSpace};
use programs::{BackgroundProgram, OcclusionProgram};
use std::sync::Arc;
use tracing::{debug, warn};

/// Color and depth views of the framebuffer the virtual scene was rendered
/// into
#[derive(Clone, Copy)]
pub struct VirtualSceneFrame<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

/// Background camera-feed and occlusion renderer
///
/// Must be constructed after device creation, on the thread that owns the
/// device, and driven from that thread only; the renderer performs no
/// internal locking.
pub struct BackgroundRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    target_format: wgpu::TextureFormat,
    palette_style: PaletteStyle,

    mesh: QuadMesh,

    camera_color_texture: wgpu::Texture,
    camera_color_view: wgpu::TextureView,
    color_dims: CachedDimensions,
    camera_depth_texture: wgpu::Texture,
    camera_depth_view: wgpu::TextureView,
    depth_dims: CachedDimensions,

    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,

    background: ShaderSlot<BackgroundProgram>,
    occlusion: ShaderSlot<OcclusionProgram>,

    use_depth_visualization: bool,
    use_occlusion: bool,
    occlusion_params: OcclusionParams,

    geometry_initialized: bool,
}

impl BackgroundRenderer {
    /// Create the renderer for render targets of `target_format`
    ///
    /// Must be called after device creation, on the device's owning thread.
    /// Allocates the quad mesh and placeholder camera textures; both shader
    /// slots start unloaded until the first mode-set call.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        target_format: wgpu::TextureFormat,
        palette_style: PaletteStyle,
    ) -> Self {
        let mesh = QuadMesh::new(&device, &queue);

        // Placeholder extents; real extents arrive with the first upload.
        let camera_color_texture =
            create_camera_texture(&device, "backdrop_camera_color_texture", 1, 1, COLOR_FORMAT);
        let camera_color_view =
            camera_color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let camera_depth_texture =
            create_camera_texture(&device, "backdrop_camera_depth_texture", 1, 1, DEPTH_FORMAT);
        let camera_depth_view =
            camera_depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("backdrop_linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Nearest reads for the encoded depth textures; filtering would
        // blend the two depth bytes independently.
        let nearest_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("backdrop_nearest_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            target_format,
            palette_style,
            mesh,
            camera_color_texture,
            camera_color_view,
            color_dims: CachedDimensions::default(),
            camera_depth_texture,
            camera_depth_view,
            depth_dims: CachedDimensions::default(),
            linear_sampler,
            nearest_sampler,
            background: ShaderSlot::Unloaded,
            occlusion: ShaderSlot::Unloaded,
            use_depth_visualization: false,
            use_occlusion: false,
            occlusion_params: OcclusionParams {
                z_near: DEFAULT_Z_NEAR,
                z_far: DEFAULT_Z_FAR,
                depth_aspect_ratio: 1.0,
                pad: 0.0,
            },
            geometry_initialized: false,
        }
    }

    /// Switch the background between the camera feed and the depth
    /// visualization
    ///
    /// No-op when the requested mode is already loaded. Otherwise the
    /// current program is released and the new one is built from the asset
    /// bundle; on failure the slot stays unloaded and the flag keeps its
    /// previous value.
    pub fn set_depth_visualization(&mut self, enable: bool) -> RenderResult<()> {
        if self.background.is_loaded() && self.use_depth_visualization == enable {
            return Ok(());
        }

        debug!(depth_visualization = enable, "Reloading background program");
        self.background.unload();

        let program = if enable {
            BackgroundProgram::new_depth_visualization(
                &self.device,
                &self.queue,
                self.target_format,
                self.palette_style,
                &self.camera_depth_view,
                &self.linear_sampler,
                &self.nearest_sampler,
            )?
        } else {
            BackgroundProgram::new_camera(
                &self.device,
                self.target_format,
                &self.camera_color_view,
                &self.linear_sampler,
            )?
        };

        self.background = ShaderSlot::Loaded(program);
        self.use_depth_visualization = enable;
        Ok(())
    }

    /// Reload the virtual-scene compositing program for the given occlusion
    /// mode
    ///
    /// Always rebuilds, even when the flag is unchanged, so the compile-time
    /// occlusion define matches the request exactly. After any call the
    /// occlusion slot is loaded and `draw_virtual_scene` executes.
    pub fn set_occlusion(&mut self, enable: bool) -> RenderResult<()> {
        debug!(occlusion = enable, "Reloading occlusion program");
        self.occlusion.unload();

        let program = OcclusionProgram::new(
            &self.device,
            self.target_format,
            enable,
            &self.camera_depth_view,
            &self.linear_sampler,
            &self.nearest_sampler,
        )?;
        program.write_params(&self.queue, self.occlusion_params);

        self.occlusion = ShaderSlot::Loaded(program);
        self.use_occlusion = enable;
        Ok(())
    }

    /// Re-derive the screen and camera-texture quads for the current frame
    ///
    /// Must run once per frame before drawing; rotation or viewport changes
    /// invalidate the previous coordinates.
    pub fn update_display_geometry(&mut self, transform: &dyn DisplayTransform) {
        let screen = transform.transform_quad(TargetSpace::Screen, &NDC_REFERENCE_QUAD);
        let camera = transform.transform_quad(TargetSpace::CameraTexture, &NDC_REFERENCE_QUAD);
        self.mesh.set_screen_quad(&self.queue, &screen);
        self.mesh.set_camera_uv_quad(&self.queue, &camera);
        self.geometry_initialized = true;
    }

    /// Upload an RGBA8 camera color image at its native resolution
    pub fn update_camera_color_texture(&mut self, image: &CameraImage<'_>) {
        debug_assert_eq!(image.data.len(), image.expected_len());

        if self.color_dims.needs_update(image.width, image.height) {
            debug!(
                width = image.width,
                height = image.height,
                "Reallocating camera color texture"
            );
            self.camera_color_texture = create_camera_texture(
                &self.device,
                "backdrop_camera_color_texture",
                image.width,
                image.height,
                COLOR_FORMAT,
            );
            self.camera_color_view = self
                .camera_color_texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            self.color_dims.update(image.width, image.height);
            self.rebind_programs();
        }

        write_camera_texture(
            &self.queue,
            &self.camera_color_texture,
            image.data,
            image.width,
            image.height,
            4,
        );
    }

    /// Upload a two-channel 8-bit depth image at its native resolution
    ///
    /// While occlusion mode is active this also refreshes the stored depth
    /// aspect ratio and the occlusion program's uniform.
    pub fn update_camera_depth_texture(&mut self, image: &DepthImage<'_>) {
        debug_assert_eq!(image.data.len(), image.expected_len());

        if self.depth_dims.needs_update(image.width, image.height) {
            debug!(
                width = image.width,
                height = image.height,
                "Reallocating camera depth texture"
            );
            self.camera_depth_texture = create_camera_texture(
                &self.device,
                "backdrop_camera_depth_texture",
                image.width,
                image.height,
                DEPTH_FORMAT,
            );
            self.camera_depth_view = self
                .camera_depth_texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            self.depth_dims.update(image.width, image.height);
            self.rebind_programs();
        }

        write_camera_texture(
            &self.queue,
            &self.camera_depth_texture,
            image.data,
            image.width,
            image.height,
            2,
        );

        if self.use_occlusion {
            self.occlusion_params.depth_aspect_ratio = image.aspect_ratio();
            if let Some(program) = self.occlusion.loaded() {
                program.write_params(&self.queue, self.occlusion_params);
            }
        }
    }

    /// Draw the background with the currently loaded program
    ///
    /// No-op while the background slot is unloaded.
    pub fn draw_background(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let Some(program) = self.background.loaded() else {
            return;
        };
        if !self.geometry_initialized {
            warn!("draw_background called before the first display-geometry update");
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("backdrop_background_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&program.pipeline);
        render_pass.set_bind_group(0, Some(&program.bind_group), &[]);
        render_pass.set_vertex_buffer(0, self.mesh.screen_buffer().slice(..));
        render_pass.set_vertex_buffer(1, self.mesh.camera_uv_buffer().slice(..));
        render_pass.draw(0..QuadMesh::VERTEX_COUNT, 0..1);
    }

    /// Composite the virtual scene over the background
    ///
    /// Rebinds the screen quad to the unexpanded reference quad first:
    /// virtual content must use standard device coordinates, not the
    /// EIS-expanded coordinates of the background feed. No-op while the
    /// occlusion slot is unloaded.
    pub fn draw_virtual_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &VirtualSceneFrame<'_>,
        z_near: f32,
        z_far: f32,
    ) {
        let Some(program) = self.occlusion.loaded() else {
            return;
        };

        self.mesh.set_screen_quad(&self.queue, &NDC_REFERENCE_QUAD);

        self.occlusion_params.z_near = z_near;
        self.occlusion_params.z_far = z_far;
        program.write_params(&self.queue, self.occlusion_params);
        let scene_bind_group = program.scene_bind_group(&self.device, scene.color, scene.depth);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("backdrop_virtual_scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&program.pipeline);
        render_pass.set_bind_group(0, Some(&program.static_bind_group), &[]);
        render_pass.set_bind_group(1, Some(&scene_bind_group), &[]);
        render_pass.set_vertex_buffer(0, self.mesh.screen_buffer().slice(..));
        render_pass.set_vertex_buffer(1, self.mesh.camera_uv_buffer().slice(..));
        render_pass.set_vertex_buffer(2, self.mesh.scene_uv_buffer().slice(..));
        render_pass.draw(0..QuadMesh::VERTEX_COUNT, 0..1);
    }

    /// Kind of the currently loaded background program, if any
    pub fn background_kind(&self) -> Option<BackgroundKind> {
        self.background.loaded().map(|program| program.kind())
    }

    /// Whether the occlusion slot currently holds a program
    pub fn occlusion_loaded(&self) -> bool {
        self.occlusion.is_loaded()
    }

    /// Whether the loaded compositing program applies depth occlusion
    pub fn occlusion_compositing(&self) -> bool {
        self.occlusion
            .loaded()
            .is_some_and(|program| program.occlusion_enabled())
    }

    pub fn use_depth_visualization(&self) -> bool {
        self.use_depth_visualization
    }

    pub fn use_occlusion(&self) -> bool {
        self.use_occlusion
    }

    /// Aspect ratio of the last depth image uploaded while occlusion was
    /// active
    pub fn depth_aspect_ratio(&self) -> f32 {
        self.occlusion_params.depth_aspect_ratio
    }

    /// Current screen-space quad (CPU copy)
    pub fn screen_quad(&self) -> &crate::constants::QuadCoords {
        self.mesh.screen_quad()
    }

    /// Current camera-texture quad (CPU copy)
    pub fn camera_uv_quad(&self) -> &crate::constants::QuadCoords {
        self.mesh.camera_uv_quad()
    }

    /// Recreate static bind groups of loaded programs after a camera
    /// texture reallocation
    fn rebind_programs(&mut self) {
        if let Some(program) = self.background.loaded_mut() {
            program.rebind(
                &self.device,
                &self.camera_color_view,
                &self.camera_depth_view,
                &self.linear_sampler,
                &self.nearest_sampler,
            );
        }
        if let Some(program) = self.occlusion.loaded_mut() {
            program.rebind(
                &self.device,
                &self.camera_depth_view,
                &self.linear_sampler,
                &self.nearest_sampler,
            );
        }
    }
}

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg8Unorm;

fn create_camera_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_camera_texture(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    data: &[u8],
    width: u32,
    height: u32,
    bytes_per_texel: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_texel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
