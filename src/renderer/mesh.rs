// SPDX-License-Identifier: GPL-3.0-only

//! Quad mesh backing the background and virtual-scene draws
//!
//! Three small vertex buffers built once and mutated in place: the
//! screen-space quad and the camera-texture quad (refreshed every frame from
//! the tracking transform) plus a fixed virtual-scene UV quad. CPU-side
//! copies of the two dynamic quads are kept next to their GPU buffers so the
//! virtual-scene draw can fall back to the reference quad and tests can
//! inspect the current coordinates.

use crate::constants::{NDC_REFERENCE_QUAD, QUAD_VERTEX_COUNT, QuadCoords, SCENE_UV_QUAD};

/// Camera-texture quad before the first geometry update: the reference quad
/// mapped straight into texture space, projective divisor 1
const CAMERA_UV_DEFAULT: QuadCoords = [
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
];

const SCREEN_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 0,
}];

const CAMERA_UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 1,
}];

const SCENE_UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 2,
}];

/// Vertex buffer layout for the screen-space quad (slot 0)
pub fn screen_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (3 * std::mem::size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SCREEN_ATTRIBUTES,
    }
}

/// Vertex buffer layout for the camera-texture quad (slot 1)
pub fn camera_uv_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (3 * std::mem::size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &CAMERA_UV_ATTRIBUTES,
    }
}

/// Vertex buffer layout for the virtual-scene UV quad (slot 2)
pub fn scene_uv_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (2 * std::mem::size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SCENE_UV_ATTRIBUTES,
    }
}

/// The quad mesh: static layout, per-frame coordinate updates
pub struct QuadMesh {
    screen_buffer: wgpu::Buffer,
    camera_uv_buffer: wgpu::Buffer,
    scene_uv_buffer: wgpu::Buffer,
    screen_quad: QuadCoords,
    camera_uv_quad: QuadCoords,
}

impl QuadMesh {
    /// Number of vertices drawn per quad (triangle strip)
    pub const VERTEX_COUNT: u32 = QUAD_VERTEX_COUNT as u32;

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let screen_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_screen_quad_buffer"),
            size: std::mem::size_of::<QuadCoords>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_uv_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_camera_uv_buffer"),
            size: std::mem::size_of::<QuadCoords>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_uv_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_scene_uv_buffer"),
            size: std::mem::size_of::<[[f32; 2]; QUAD_VERTEX_COUNT]>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        queue.write_buffer(
            &screen_buffer,
            0,
            bytemuck::cast_slice(NDC_REFERENCE_QUAD.as_slice()),
        );
        queue.write_buffer(
            &camera_uv_buffer,
            0,
            bytemuck::cast_slice(CAMERA_UV_DEFAULT.as_slice()),
        );
        queue.write_buffer(
            &scene_uv_buffer,
            0,
            bytemuck::cast_slice(SCENE_UV_QUAD.as_slice()),
        );

        Self {
            screen_buffer,
            camera_uv_buffer,
            scene_uv_buffer,
            screen_quad: NDC_REFERENCE_QUAD,
            camera_uv_quad: CAMERA_UV_DEFAULT,
        }
    }

    pub fn set_screen_quad(&mut self, queue: &wgpu::Queue, quad: &QuadCoords) {
        self.screen_quad = *quad;
        queue.write_buffer(&self.screen_buffer, 0, bytemuck::cast_slice(quad.as_slice()));
    }

    pub fn set_camera_uv_quad(&mut self, queue: &wgpu::Queue, quad: &QuadCoords) {
        self.camera_uv_quad = *quad;
        queue.write_buffer(
            &self.camera_uv_buffer,
            0,
            bytemuck::cast_slice(quad.as_slice()),
        );
    }

    pub fn screen_quad(&self) -> &QuadCoords {
        &self.screen_quad
    }

    pub fn camera_uv_quad(&self) -> &QuadCoords {
        &self.camera_uv_quad
    }

    pub fn screen_buffer(&self) -> &wgpu::Buffer {
        &self.screen_buffer
    }

    pub fn camera_uv_buffer(&self) -> &wgpu::Buffer {
        &self.camera_uv_buffer
    }

    pub fn scene_uv_buffer(&self) -> &wgpu::Buffer {
        &self.scene_uv_buffer
    }
}
