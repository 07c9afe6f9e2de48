/// Indexed triangle meshes loaded from files
use crate::math::{Vec2, Vec3};
use crate::surface::{Surface, VertexFlags};

/// A triangle mesh with shared vertices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshSurface {
    positions: Vec<Vec3>,
    tex_coords: Option<Vec<Vec2>>,
    triangles: Vec<[u32; 3]>,
}

impl MeshSurface {
    /// # Panics
    /// If a triangle references a vertex outside `positions`.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let count = positions.len();
        assert!(
            triangles.iter().flatten().all(|&i| (i as usize) < count),
            "triangle index out of range for {count} vertices"
        );
        Self {
            positions,
            tex_coords: None,
            triangles,
        }
    }

    /// Attach one texture coordinate per vertex
    pub fn with_tex_coords(mut self, tex_coords: Vec<Vec2>) -> Self {
        assert_eq!(tex_coords.len(), self.positions.len(), "one texture coordinate per vertex");
        self.tex_coords = Some(tex_coords);
        self
    }

    /// Axis-aligned cube centred on the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let triangles = vec![
            [4, 5, 6], [4, 6, 7], // front
            [1, 0, 3], [1, 3, 2], // back
            [3, 7, 6], [3, 6, 2], // top
            [0, 1, 5], [0, 5, 4], // bottom
            [1, 2, 6], [1, 6, 5], // right
            [0, 4, 7], [0, 7, 3], // left
        ];
        Self::new(positions, triangles)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Area-weighted average of the face normals around each vertex
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::zeros(); self.positions.len()];
        for &[a, b, c] in &self.triangles {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let face = (self.positions[b] - self.positions[a]).cross(&(self.positions[c] - self.positions[a]));
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for normal in &mut normals {
            // Isolated vertices keep a zero normal
            normal.try_normalize_mut(f32::EPSILON);
        }
        normals
    }
}

impl Surface for MeshSurface {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn line_index_count(&self) -> usize {
        self.triangles.len() * 6
    }

    fn triangle_index_count(&self) -> usize {
        self.triangles.len() * 3
    }

    fn generate_vertices(&self, flags: VertexFlags) -> Vec<f32> {
        let normals = flags
            .contains(VertexFlags::NORMALS)
            .then(|| self.vertex_normals());
        let mut vertices = Vec::with_capacity(self.positions.len() * flags.floats_per_vertex());

        for (index, position) in self.positions.iter().enumerate() {
            vertices.extend_from_slice(position.as_slice());
            if let Some(normals) = &normals {
                vertices.extend_from_slice(normals[index].as_slice());
            }
            if flags.contains(VertexFlags::TEX_COORDS) {
                let uv = self
                    .tex_coords
                    .as_ref()
                    .map_or_else(Vec2::zeros, |coords| coords[index]);
                vertices.extend_from_slice(uv.as_slice());
            }
        }

        vertices
    }

    fn generate_line_indices(&self) -> Vec<u32> {
        self.triangles
            .iter()
            .flat_map(|&[a, b, c]| [a, b, b, c, c, a])
            .collect()
    }

    fn generate_triangle_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let cube = MeshSurface::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_index_count(), 36);
        assert_eq!(cube.line_index_count(), 72);
        assert_eq!(cube.generate_triangle_indices().len(), 36);
        assert_eq!(cube.generate_line_indices().len(), 72);
    }

    #[test]
    fn test_cube_normals_point_outwards() {
        let cube = MeshSurface::cube(2.0);
        for (position, normal) in cube.positions().iter().zip(cube.vertex_normals()) {
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-5);
            assert!(position.dot(&normal) > 0.0);
        }
    }

    #[test]
    fn test_vertex_layout_with_missing_tex_coords() {
        let mesh = MeshSurface::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        );
        let vertices = mesh.generate_vertices(VertexFlags::NORMALS | VertexFlags::TEX_COORDS);
        assert_eq!(vertices.len(), 3 * 8);
        assert_eq!(&vertices[8..16], &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_tex_coords_are_emitted() {
        let mesh = MeshSurface::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        )
        .with_tex_coords(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)]);
        let vertices = mesh.generate_vertices(VertexFlags::TEX_COORDS);
        assert_eq!(&vertices[10..15], &[0.0, 1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_lines_follow_triangle_edges() {
        let mesh = MeshSurface::new(vec![Vec3::zeros(); 4], vec![[0, 1, 2], [2, 1, 3]]);
        assert_eq!(
            mesh.generate_line_indices(),
            vec![0, 1, 1, 2, 2, 0, 2, 1, 1, 3, 3, 2]
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_rejects_dangling_index() {
        MeshSurface::new(vec![Vec3::zeros(); 2], vec![[0, 1, 2]]);
    }
}
