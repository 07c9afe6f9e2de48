/// The surface contract shared by parametric and file-loaded meshes
use bitflags::bitflags;

bitflags! {
    /// Optional per-vertex attributes requested from [`Surface::generate_vertices`].
    ///
    /// Position is always emitted. Attributes are interleaved in the order
    /// position(3), normal(3), texture coordinate(2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexFlags: u8 {
        const NORMALS = 1 << 0;
        const TEX_COORDS = 1 << 1;
    }
}

impl VertexFlags {
    /// Number of floats written per vertex for this attribute set
    pub fn floats_per_vertex(self) -> usize {
        let mut count = 3;
        if self.contains(VertexFlags::NORMALS) {
            count += 3;
        }
        if self.contains(VertexFlags::TEX_COORDS) {
            count += 2;
        }
        count
    }
}

/// Geometry a rendering engine can upload once at initialization
pub trait Surface {
    fn vertex_count(&self) -> usize;
    fn line_index_count(&self) -> usize;
    fn triangle_index_count(&self) -> usize;

    /// Interleaved vertex attributes, `vertex_count() * flags.floats_per_vertex()` floats
    fn generate_vertices(&self, flags: VertexFlags) -> Vec<f32>;

    /// Index pairs for a wireframe rendering
    fn generate_line_indices(&self) -> Vec<u32>;

    /// Index triples for a filled rendering
    fn generate_triangle_indices(&self) -> Vec<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floats_per_vertex() {
        assert_eq!(VertexFlags::empty().floats_per_vertex(), 3);
        assert_eq!(VertexFlags::NORMALS.floats_per_vertex(), 6);
        assert_eq!(VertexFlags::TEX_COORDS.floats_per_vertex(), 5);
        assert_eq!((VertexFlags::NORMALS | VertexFlags::TEX_COORDS).floats_per_vertex(), 8);
    }
}
