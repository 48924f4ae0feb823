// SPDX-License-Identifier: GPL-3.0-only

//! Shader program slots for the background renderer
//!
//! Each program couples a render pipeline with its static bind group.
//! Programs are destroyed and rebuilt whenever their governing mode flag
//! changes; between rebuilds only uniform contents and texture bindings are
//! updated.

use super::mesh;
use super::palette::{self, PaletteTexture};
use crate::assets::{
    self, BACKGROUND_CAMERA_WGSL, BACKGROUND_DEPTH_WGSL, DEPTH_COMMON_WGSL, OCCLUSION_WGSL,
    ShaderDefines,
};
use crate::constants::{DEPTH_MAX_MM, DEPTH_MAX_VALID_MM, DEPTH_MIN_MM, PaletteStyle};
use crate::errors::RenderResult;

/// Explicit loaded-state for a shader slot
///
/// A slot is `Loaded` only while its mode has been applied; mode transitions
/// replace the whole program rather than mutating it.
pub enum ShaderSlot<T> {
    Unloaded,
    Loaded(T),
}

impl<T> ShaderSlot<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ShaderSlot::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ShaderSlot::Loaded(program) => Some(program),
            ShaderSlot::Unloaded => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            ShaderSlot::Loaded(program) => Some(program),
            ShaderSlot::Unloaded => None,
        }
    }

    /// Take the loaded program out, leaving the slot unloaded
    pub fn unload(&mut self) -> Option<T> {
        match std::mem::replace(self, ShaderSlot::Unloaded) {
            ShaderSlot::Loaded(program) => Some(program),
            ShaderSlot::Unloaded => None,
        }
    }
}

/// Which background source the loaded program renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    /// Camera color feed
    Camera,
    /// Depth image through the palette lookup
    DepthVisualization,
}

/// Uniform block shared with the occlusion shader
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OcclusionParams {
    /// Near plane of the virtual-scene projection (meters)
    pub z_near: f32,
    /// Far plane of the virtual-scene projection (meters)
    pub z_far: f32,
    /// Aspect ratio (width/height) of the camera depth image
    pub depth_aspect_ratio: f32,
    /// Padding for 16-byte uniform alignment
    pub pad: f32,
}

/// Compose the camera background shader source
pub fn compose_background_camera() -> RenderResult<String> {
    assets::compose_shader(&ShaderDefines::new(), &[BACKGROUND_CAMERA_WGSL])
}

/// Compose the depth-visualization background shader source
pub fn compose_background_depth() -> RenderResult<String> {
    let mut defines = ShaderDefines::new();
    defines.set_f32("MIN_DEPTH_MM", DEPTH_MIN_MM);
    defines.set_f32("MAX_DEPTH_MM", DEPTH_MAX_MM);
    defines.set_f32("MAX_VALID_DEPTH_MM", DEPTH_MAX_VALID_MM as f32);
    assets::compose_shader(&defines, &[DEPTH_COMMON_WGSL, BACKGROUND_DEPTH_WGSL])
}

/// Compose the occlusion compositing shader source for the given mode
pub fn compose_occlusion(use_occlusion: bool) -> RenderResult<String> {
    let mut defines = ShaderDefines::new();
    defines.set_bool("USE_OCCLUSION", use_occlusion);
    assets::compose_shader(&defines, &[DEPTH_COMMON_WGSL, OCCLUSION_WGSL])
}

fn fragment_texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn fragment_sampler_entry(binding: u32, filtering: bool) -> wgpu::BindGroupLayoutEntry {
    let ty = if filtering {
        wgpu::SamplerBindingType::Filtering
    } else {
        wgpu::SamplerBindingType::NonFiltering
    };
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(ty),
        count: None,
    }
}

fn create_quad_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader_source: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            ..Default::default()
        },
        // The background and the composite both ignore the target's depth;
        // the pass carries no depth attachment.
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

/// Background display program (camera feed or depth visualization)
pub struct BackgroundProgram {
    pub(super) kind: BackgroundKind,
    pub(super) pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    pub(super) bind_group: wgpu::BindGroup,
    /// Palette strip, present for the depth-visualization kind
    palette: Option<PaletteTexture>,
}

impl BackgroundProgram {
    /// Build the plain camera-feed program
    pub fn new_camera(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        camera_color: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
    ) -> RenderResult<Self> {
        let source = compose_background_camera()?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop_background_camera_layout"),
            entries: &[
                // Camera color texture
                fragment_texture_entry(0, true),
                // Sampler
                fragment_sampler_entry(1, true),
            ],
        });

        let pipeline = create_quad_pipeline(
            device,
            "backdrop_background_camera_pipeline",
            &source,
            &[&layout],
            &[mesh::screen_layout(), mesh::camera_uv_layout()],
            format,
            None,
        );

        let bind_group = Self::camera_bind_group(device, &layout, camera_color, linear_sampler);

        Ok(Self {
            kind: BackgroundKind::Camera,
            pipeline,
            layout,
            bind_group,
            palette: None,
        })
    }

    /// Build the depth-visualization program, loading the palette strip for
    /// `style` from the asset bundle
    pub fn new_depth_visualization(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        style: PaletteStyle,
        camera_depth: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
        nearest_sampler: &wgpu::Sampler,
    ) -> RenderResult<Self> {
        let source = compose_background_depth()?;
        let palette = palette::create_palette_texture(device, queue, style)?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop_background_depth_layout"),
            entries: &[
                // Camera depth texture (two-channel encoded, nearest reads)
                fragment_texture_entry(0, false),
                fragment_sampler_entry(1, false),
                // Palette lookup strip
                fragment_texture_entry(2, true),
                fragment_sampler_entry(3, true),
            ],
        });

        let pipeline = create_quad_pipeline(
            device,
            "backdrop_background_depth_pipeline",
            &source,
            &[&layout],
            &[mesh::screen_layout(), mesh::camera_uv_layout()],
            format,
            None,
        );

        let bind_group = Self::depth_bind_group(
            device,
            &layout,
            camera_depth,
            &palette.view,
            linear_sampler,
            nearest_sampler,
        );

        Ok(Self {
            kind: BackgroundKind::DepthVisualization,
            pipeline,
            layout,
            bind_group,
            palette: Some(palette),
        })
    }

    pub fn kind(&self) -> BackgroundKind {
        self.kind
    }

    /// Recreate the bind group after a camera texture reallocation
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        camera_color: &wgpu::TextureView,
        camera_depth: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
        nearest_sampler: &wgpu::Sampler,
    ) {
        self.bind_group = match self.kind {
            BackgroundKind::Camera => {
                Self::camera_bind_group(device, &self.layout, camera_color, linear_sampler)
            }
            BackgroundKind::DepthVisualization => {
                let palette = self
                    .palette
                    .as_ref()
                    .expect("depth-visualization program always carries a palette");
                Self::depth_bind_group(
                    device,
                    &self.layout,
                    camera_depth,
                    &palette.view,
                    linear_sampler,
                    nearest_sampler,
                )
            }
        };
    }

    fn camera_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_color: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_background_camera_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(camera_color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(linear_sampler),
                },
            ],
        })
    }

    fn depth_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_depth: &wgpu::TextureView,
        palette: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
        nearest_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_background_depth_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(camera_depth),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(nearest_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(palette),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(linear_sampler),
                },
            ],
        })
    }
}

/// Virtual-scene compositing program
///
/// Always drawable once loaded; the compile-time occlusion define controls
/// whether camera depth actually hides virtual fragments.
pub struct OcclusionProgram {
    occlusion_enabled: bool,
    pub(super) pipeline: wgpu::RenderPipeline,
    static_layout: wgpu::BindGroupLayout,
    scene_layout: wgpu::BindGroupLayout,
    pub(super) static_bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
}

impl OcclusionProgram {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        occlusion_enabled: bool,
        camera_depth: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
        nearest_sampler: &wgpu::Sampler,
    ) -> RenderResult<Self> {
        let source = compose_occlusion(occlusion_enabled)?;

        let static_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop_occlusion_static_layout"),
            entries: &[
                // Scene color sampler
                fragment_sampler_entry(0, true),
                // Depth sampler (camera + scene depth, nearest reads)
                fragment_sampler_entry(1, false),
                // Camera depth texture
                fragment_texture_entry(2, false),
                // Occlusion parameters
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop_occlusion_scene_layout"),
            entries: &[
                // Virtual scene color
                fragment_texture_entry(0, true),
                // Virtual scene depth
                fragment_texture_entry(1, false),
            ],
        });

        let pipeline = create_quad_pipeline(
            device,
            "backdrop_occlusion_pipeline",
            &source,
            &[&static_layout, &scene_layout],
            &[
                mesh::screen_layout(),
                mesh::camera_uv_layout(),
                mesh::scene_uv_layout(),
            ],
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_occlusion_params_buffer"),
            size: std::mem::size_of::<OcclusionParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let static_bind_group = Self::static_bind_group(
            device,
            &static_layout,
            camera_depth,
            &params_buffer,
            linear_sampler,
            nearest_sampler,
        );

        Ok(Self {
            occlusion_enabled,
            pipeline,
            static_layout,
            scene_layout,
            static_bind_group,
            params_buffer,
        })
    }

    /// Whether the loaded pipeline composites against camera depth
    pub fn occlusion_enabled(&self) -> bool {
        self.occlusion_enabled
    }

    /// Write the uniform block
    pub fn write_params(&self, queue: &wgpu::Queue, params: OcclusionParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    /// Recreate the static bind group after a depth texture reallocation
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        camera_depth: &wgpu::TextureView,
        linear_sampler: &wgpu::Sampler,
        nearest_sampler: &wgpu::Sampler,
    ) {
        self.static_bind_group = Self::static_bind_group(
            device,
            &self.static_layout,
            camera_depth,
            &self.params_buffer,
            linear_sampler,
            nearest_sampler,
        );
    }

    /// Bind the virtual scene's color and depth views for one draw
    pub fn scene_bind_group(
        &self,
        device: &wgpu::Device,
        scene_color: &wgpu::TextureView,
        scene_depth: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_occlusion_scene_bind_group"),
            layout: &self.scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene_color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(scene_depth),
                },
            ],
        })
    }

    fn static_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_depth: &wgpu::TextureView,
        params_buffer: &wgpu::Buffer,
        linear_sampler: &wgpu::Sampler,
        nearest_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_occlusion_static_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(nearest_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(camera_depth),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_slot_transitions() {
        let mut slot: ShaderSlot<u32> = ShaderSlot::Unloaded;
        assert!(!slot.is_loaded());
        assert!(slot.unload().is_none());

        slot = ShaderSlot::Loaded(7);
        assert!(slot.is_loaded());
        assert_eq!(slot.loaded(), Some(&7));
        assert_eq!(slot.unload(), Some(7));
        assert!(!slot.is_loaded());
    }

    #[test]
    fn test_occlusion_defines_in_source() {
        let enabled = compose_occlusion(true).unwrap();
        assert!(enabled.contains("const USE_OCCLUSION: bool = true;"));
        let disabled = compose_occlusion(false).unwrap();
        assert!(disabled.contains("const USE_OCCLUSION: bool = false;"));
    }

    #[test]
    fn test_depth_defines_in_source() {
        let source = compose_background_depth().unwrap();
        assert!(source.contains("const MIN_DEPTH_MM: f32 = 400.0;"));
        assert!(source.contains("const MAX_DEPTH_MM: f32 = 4000.0;"));
    }
}
