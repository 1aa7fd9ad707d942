//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position (CSS pixels until uploaded, then NDC) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Fixed colors for the playfield
pub mod colors {
    /// Slate #0f172a
    pub const BACKGROUND: [f32; 4] = [15.0 / 255.0, 23.0 / 255.0, 42.0 / 255.0, 1.0];
    /// Background while the level-start flash is visible
    pub const FLASH: [f32; 4] = [0.35, 0.4, 0.5, 1.0];
    pub const HEAVY_OUTLINE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const FIELD_RING: [f32; 4] = [1.0, 1.0, 1.0, 0.05];
    pub const FIELD_CORE: [f32; 4] = [1.0, 1.0, 1.0, 0.1];
    /// #ff7800
    pub const TURBO_ORANGE: [f32; 3] = [1.0, 120.0 / 255.0, 0.0];
    pub const TURBO_CORE: [f32; 4] = [1.0, 120.0 / 255.0, 0.0, 0.2];
}
