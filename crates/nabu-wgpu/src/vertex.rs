//! GPU vertex formats shared by the pipelines.

use bytemuck::{Pod, Zeroable};
use nabu_engine::coords::{Color, Point};

/// Vertex for the solid pipelines (triangles and lines): position in logical
/// pixels plus a normalized u8 color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct SolidVertex {
    pub pos: Point,
    pub color: [u8; 4],
}

impl SolidVertex {
    #[inline]
    pub fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            pos: Point::new(x, y),
            color: [color.r, color.g, color.b, color.a],
        }
    }

    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Unorm8x4   // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SolidVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Vertex for the text pipeline: position, atlas UV, color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct TextVertex {
    pub pos: Point,
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

impl TextVertex {
    #[inline]
    pub fn new(x: f32, y: f32, u: f32, v: f32, color: Color) -> Self {
        Self {
            pos: Point::new(x, y),
            uv: [u, v],
            color: [color.r, color.g, color.b, color.a],
        }
    }

    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Unorm8x4   // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TextVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

/// Minimum binding size for the viewport uniform buffer.
///
/// `ViewportUniform` is 16 bytes by construction, so the size is never zero;
/// centralizing this avoids `.unwrap()` at each pipeline-creation site.
pub(crate) fn viewport_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<ViewportUniform>() as u64)
        .expect("ViewportUniform has non-zero size by construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_sizes_match_attribute_layouts() {
        assert_eq!(std::mem::size_of::<SolidVertex>(), 12);
        assert_eq!(std::mem::size_of::<TextVertex>(), 20);
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
    }

    #[test]
    fn solid_vertex_carries_raw_channels() {
        let v = SolidVertex::new(1.0, 2.0, Color::new(10, 20, 30, 40));
        assert_eq!(v.pos, Point::new(1.0, 2.0));
        assert_eq!(v.color, [10, 20, 30, 40]);
    }
}
