//! Vertex layout and the fixed startup geometry.

use bytemuck::{Pod, Zeroable};

/// One vertex: clip-space position plus an RGBA color interpolated across
/// the triangle. Layout must match the pipeline's input element
/// descriptions (POSITION at offset 0, COLOR at offset 12).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Byte offset of the COLOR attribute.
pub const COLOR_OFFSET: u32 = 12;

/// The static triangle uploaded at startup: red bottom-left, green top,
/// blue bottom-right.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

impl Vertex {
    /// Per-vertex stride in bytes, as declared in the vertex buffer view.
    pub const fn stride() -> u32 {
        std::mem::size_of::<Vertex>() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_declared_layout() {
        // 3 floats of position + 4 floats of color, tightly packed.
        assert_eq!(Vertex::stride(), 28);
        assert_eq!(COLOR_OFFSET, 12);
    }

    #[test]
    fn triangle_bytes_round_trip() {
        let bytes = bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE);
        assert_eq!(bytes.len(), 3 * Vertex::stride() as usize);

        let back: &[Vertex] = bytemuck::cast_slice(bytes);
        assert_eq!(back, &TRIANGLE);
    }

    #[test]
    fn triangle_matches_fixed_geometry() {
        assert_eq!(TRIANGLE[0].position, [-0.5, -0.5, 0.0]);
        assert_eq!(TRIANGLE[1].position, [0.0, 0.5, 0.0]);
        assert_eq!(TRIANGLE[2].position, [0.5, -0.5, 0.0]);
    }
}
