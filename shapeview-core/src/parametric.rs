/// Tessellation of parametric surfaces into indexed grid meshes.
///
/// A surface is sampled on a regular `divisions.x` by `divisions.y` grid over
/// the rectangular domain `[0, upper_bound.x] x [0, upper_bound.y]`. Vertices
/// are laid out row by row (`j` outer, `i` inner), so vertex `(i, j)` lives at
/// index `j * divisions.x + i`.
use crate::math::{IVec2, Vec2, Vec3};
use crate::surface::{Surface, VertexFlags};

/// Offset, in grid units, used for finite-difference tangents
const NORMAL_EPSILON: f32 = 0.01;

/// Grid resolution and domain extent of a parametric surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricInterval {
    pub divisions: IVec2,
    pub upper_bound: Vec2,
    pub texture_repeat: Vec2,
}

/// A continuous surface: maps a domain coordinate to a position
pub trait Evaluator {
    fn interval(&self) -> ParametricInterval;
    fn evaluate(&self, domain: &Vec2) -> Vec3;

    /// Whether the finite-difference normal at `domain` must be flipped, for
    /// parameterizations that reverse orientation somewhere.
    fn invert_normal(&self, _domain: &Vec2) -> bool {
        false
    }
}

/// A tessellated view of an [`Evaluator`]
#[derive(Debug, Clone)]
pub struct ParametricSurface<E> {
    evaluator: E,
    interval: ParametricInterval,
    slices: IVec2,
}

impl<E: Evaluator> ParametricSurface<E> {
    pub fn new(evaluator: E) -> Self {
        let interval = evaluator.interval();
        Self::with_interval(evaluator, interval)
    }

    /// Tessellate `evaluator` with an explicit interval instead of its own.
    ///
    /// # Panics
    /// If either axis has fewer than two divisions.
    pub fn with_interval(evaluator: E, interval: ParametricInterval) -> Self {
        assert!(
            interval.divisions.x >= 2 && interval.divisions.y >= 2,
            "parametric surface needs at least 2 divisions per axis, got {}x{}",
            interval.divisions.x,
            interval.divisions.y
        );
        Self {
            evaluator,
            interval,
            slices: interval.divisions - IVec2::new(1, 1),
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn interval(&self) -> &ParametricInterval {
        &self.interval
    }

    /// Domain coordinate of the (possibly fractional) grid point `(i, j)`
    pub fn domain(&self, i: f32, j: f32) -> Vec2 {
        Vec2::new(
            i * self.interval.upper_bound.x / self.slices.x as f32,
            j * self.interval.upper_bound.y / self.slices.y as f32,
        )
    }

    fn normal_at(&self, i: i32, j: i32) -> Vec3 {
        let mut s = i as f32;
        let mut t = j as f32;

        // Tangents degenerate at the domain edges (poles, seams)
        if i == 0 {
            s += NORMAL_EPSILON;
        }
        if i == self.interval.divisions.x - 1 {
            s -= NORMAL_EPSILON;
        }
        if j == 0 {
            t += NORMAL_EPSILON;
        }
        if j == self.interval.divisions.y - 1 {
            t -= NORMAL_EPSILON;
        }

        let p = self.evaluator.evaluate(&self.domain(s, t));
        let u = self.evaluator.evaluate(&self.domain(s + NORMAL_EPSILON, t)) - p;
        let v = self.evaluator.evaluate(&self.domain(s, t + NORMAL_EPSILON)) - p;
        let normal = u.cross(&v).normalize();

        if self.evaluator.invert_normal(&self.domain(i as f32, j as f32)) {
            -normal
        } else {
            normal
        }
    }
}

impl<E: Evaluator> Surface for ParametricSurface<E> {
    fn vertex_count(&self) -> usize {
        (self.interval.divisions.x * self.interval.divisions.y) as usize
    }

    fn line_index_count(&self) -> usize {
        4 * (self.slices.x * self.slices.y) as usize
    }

    fn triangle_index_count(&self) -> usize {
        6 * (self.slices.x * self.slices.y) as usize
    }

    fn generate_vertices(&self, flags: VertexFlags) -> Vec<f32> {
        let divisions = self.interval.divisions;
        let repeat = self.interval.texture_repeat;
        let mut vertices = Vec::with_capacity(self.vertex_count() * flags.floats_per_vertex());

        for j in 0..divisions.y {
            for i in 0..divisions.x {
                let position = self.evaluator.evaluate(&self.domain(i as f32, j as f32));
                vertices.extend_from_slice(position.as_slice());

                if flags.contains(VertexFlags::NORMALS) {
                    vertices.extend_from_slice(self.normal_at(i, j).as_slice());
                }

                if flags.contains(VertexFlags::TEX_COORDS) {
                    vertices.push(i as f32 * repeat.x / self.slices.x as f32);
                    vertices.push(j as f32 * repeat.y / self.slices.y as f32);
                }
            }
        }

        vertices
    }

    fn generate_line_indices(&self) -> Vec<u32> {
        let stride = self.interval.divisions.x as u32;
        let mut indices = Vec::with_capacity(self.line_index_count());

        for j in 0..self.slices.y as u32 {
            let row = j * stride;
            for i in 0..self.slices.x as u32 {
                let next = (i + 1) % stride;
                indices.extend_from_slice(&[row + i, row + next, row + i, row + i + stride]);
            }
        }

        indices
    }

    fn generate_triangle_indices(&self) -> Vec<u32> {
        let stride = self.interval.divisions.x as u32;
        let mut indices = Vec::with_capacity(self.triangle_index_count());

        for j in 0..self.slices.y as u32 {
            let row = j * stride;
            for i in 0..self.slices.x as u32 {
                let next = (i + 1) % stride;
                indices.extend_from_slice(&[
                    row + i,
                    row + next,
                    row + i + stride,
                    row + next,
                    row + next + stride,
                    row + i + stride,
                ]);
            }
        }

        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// The unit square in the xy plane, stretched by its upper bound
    struct Plane {
        divisions: IVec2,
        flipped: bool,
    }

    impl Plane {
        fn new(w: i32, h: i32) -> Self {
            Self {
                divisions: IVec2::new(w, h),
                flipped: false,
            }
        }
    }

    impl Evaluator for Plane {
        fn interval(&self) -> ParametricInterval {
            ParametricInterval {
                divisions: self.divisions,
                upper_bound: Vec2::new(2.0, 3.0),
                texture_repeat: Vec2::new(2.0, 4.0),
            }
        }

        fn evaluate(&self, domain: &Vec2) -> Vec3 {
            Vec3::new(domain.x, domain.y, 0.0)
        }

        fn invert_normal(&self, _domain: &Vec2) -> bool {
            self.flipped
        }
    }

    /// A surface whose positions are easy to tell apart
    struct Wavy;

    impl Evaluator for Wavy {
        fn interval(&self) -> ParametricInterval {
            ParametricInterval {
                divisions: IVec2::new(7, 4),
                upper_bound: Vec2::new(std::f32::consts::TAU, 1.5),
                texture_repeat: Vec2::new(1.0, 1.0),
            }
        }

        fn evaluate(&self, domain: &Vec2) -> Vec3 {
            Vec3::new(domain.x.cos(), domain.x.sin() * domain.y, domain.y * domain.y)
        }
    }

    #[test]
    fn test_counts_match_grid() {
        for (w, h) in [(2, 2), (3, 5), (20, 20), (60, 15)] {
            let surface = ParametricSurface::new(Plane::new(w, h));
            let cells = ((w - 1) * (h - 1)) as usize;
            assert_eq!(surface.vertex_count(), (w * h) as usize);
            assert_eq!(surface.line_index_count(), 4 * cells);
            assert_eq!(surface.triangle_index_count(), 6 * cells);
            assert_eq!(surface.generate_line_indices().len(), 4 * cells);
            assert_eq!(surface.generate_triangle_indices().len(), 6 * cells);
            assert_eq!(
                surface
                    .generate_vertices(VertexFlags::NORMALS | VertexFlags::TEX_COORDS)
                    .len(),
                (w * h) as usize * 8
            );
        }
    }

    #[test]
    fn test_positions_equal_evaluator() {
        let surface = ParametricSurface::new(Wavy);
        let vertices = surface.generate_vertices(VertexFlags::empty());
        let divisions = surface.interval().divisions;

        for j in 0..divisions.y {
            for i in 0..divisions.x {
                let index = (j * divisions.x + i) as usize * 3;
                let expected = Wavy.evaluate(&surface.domain(i as f32, j as f32));
                assert_eq!(&vertices[index..index + 3], expected.as_slice());
            }
        }
    }

    #[test]
    fn test_domain_spans_upper_bound() {
        let surface = ParametricSurface::new(Plane::new(3, 4));
        assert_eq!(surface.domain(0.0, 0.0), Vec2::new(0.0, 0.0));
        assert_relative_eq!(surface.domain(2.0, 3.0), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_plane_normals_and_tex_coords() {
        let surface = ParametricSurface::new(Plane::new(3, 5));
        let vertices = surface.generate_vertices(VertexFlags::NORMALS | VertexFlags::TEX_COORDS);

        for vertex in vertices.chunks(8) {
            assert_relative_eq!(Vec3::new(vertex[3], vertex[4], vertex[5]), Vec3::z(), epsilon = 1e-4);
        }

        // Last vertex: grid point (2, 4) scaled by repeat / slices
        let last = &vertices[vertices.len() - 8..];
        assert_relative_eq!(last[6], 2.0);
        assert_relative_eq!(last[7], 4.0);
    }

    #[test]
    fn test_tex_coords_without_normals() {
        let surface = ParametricSurface::new(Plane::new(3, 3));
        let vertices = surface.generate_vertices(VertexFlags::TEX_COORDS);
        assert_eq!(vertices.len(), 9 * 5);
        // Vertex (1, 0)
        assert_relative_eq!(vertices[5 + 3], 1.0);
        assert_relative_eq!(vertices[5 + 4], 0.0);
    }

    #[test]
    fn test_inverted_normals() {
        let surface = ParametricSurface::new(Plane {
            divisions: IVec2::new(2, 2),
            flipped: true,
        });
        let vertices = surface.generate_vertices(VertexFlags::NORMALS);
        for vertex in vertices.chunks(6) {
            assert_relative_eq!(Vec3::new(vertex[3], vertex[4], vertex[5]), -Vec3::z(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_index_topology() {
        let surface = ParametricSurface::new(Plane::new(3, 2));
        assert_eq!(surface.generate_line_indices(), vec![0, 1, 0, 3, 1, 2, 1, 4]);
        assert_eq!(
            surface.generate_triangle_indices(),
            vec![0, 1, 3, 1, 4, 3, 1, 2, 4, 2, 5, 4]
        );
    }

    #[test]
    fn test_triangle_winding_follows_normals() {
        let surface = ParametricSurface::new(Plane::new(4, 4));
        let vertices = surface.generate_vertices(VertexFlags::empty());
        let position = |index: u32| {
            let base = index as usize * 3;
            Vec3::new(vertices[base], vertices[base + 1], vertices[base + 2])
        };

        for triangle in surface.generate_triangle_indices().chunks(3) {
            let a = position(triangle[0]);
            let b = position(triangle[1]);
            let c = position(triangle[2]);
            assert!((b - a).cross(&(c - a)).z > 0.0);
        }
    }

    #[test]
    fn test_indices_stay_in_range() {
        let surface = ParametricSurface::new(Wavy);
        let count = surface.vertex_count() as u32;
        assert!(surface.generate_line_indices().iter().all(|&i| i < count));
        assert!(surface.generate_triangle_indices().iter().all(|&i| i < count));
    }

    #[test]
    #[should_panic(expected = "at least 2 divisions")]
    fn test_rejects_single_division() {
        ParametricSurface::new(Plane::new(1, 5));
    }
}
