//! Per-corner data streamed to the GPU.
//!
//! Five `f32`s per vertex — position, UV, alpha — giving a fixed 20-byte
//! stride. `#[repr(C)]` pins the layout and `bytemuck` lets the frame's
//! accumulated `&[QuadVertex]` be cast straight to `&[u8]` for upload.
//!
//! ```text
//! QuadVertex (20 bytes per vertex)
//! ┌──────────────┬──────────────┬──────────────┐
//! │ position     │ uv           │ alpha        │
//! │ [f32; 2]     │ [f32; 2]     │ f32          │
//! │ offset 0     │ offset 8     │ offset 16    │
//! │ location(0)  │ location(1)  │ location(2)  │
//! └──────────────┴──────────────┴──────────────┘
//! ```
//!
//! Positions are world-space: quad corners are mapped through each
//! object's concatenated matrix on the CPU, and the shader applies only
//! the camera view-projection. That is what lets every quad of a frame
//! share one vertex buffer and one draw call.

use bytemuck::{Pod, Zeroable};

/// One corner of a rendered quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub alpha: f32,
}

// The GPU collaborator contract fixes the stride at 20 bytes.
const _: () = assert!(std::mem::size_of::<QuadVertex>() == 20);

impl QuadVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // alpha
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32,
            },
        ],
    };
}

/// Camera view-projection matrix uploaded as a uniform buffer.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}
