/// STL file parser for binary and ASCII formats
///
/// STL stores an unindexed triangle soup; vertices with bit-identical
/// positions are merged so the resulting mesh gets smooth vertex normals.
use std::collections::HashMap;

use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::math::Vec3;
use crate::mesh::MeshSurface;

/// Size of a binary facet record: normal, three vertices, attribute count
const FACET_SIZE: usize = 50;

/// Collects triangles, sharing vertices with identical positions
#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    lookup: HashMap<[u32; 3], u32>,
    triangles: Vec<[u32; 3]>,
}

impl MeshBuilder {
    fn vertex(&mut self, p: Vec3) -> u32 {
        let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        let positions = &mut self.positions;
        *self.lookup.entry(key).or_insert_with(|| {
            positions.push(p);
            (positions.len() - 1) as u32
        })
    }

    fn triangle(&mut self, corners: [Vec3; 3]) {
        let indices = corners.map(|p| self.vertex(p));
        self.triangles.push(indices);
    }

    fn build(self) -> MeshSurface {
        MeshSurface::new(self.positions, self.triangles)
    }
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<MeshSurface> {
    if data.len() < 84 {
        return Err(Error::StlParse("file too small to be a valid STL".to_string()));
    }

    let (body, triangle_count) = binary_header(data)
        .map_err(|e| Error::StlParse(format!("bad header: {:?}", e)))?;
    let triangle_count = triangle_count as usize;
    if body.len() < triangle_count * FACET_SIZE {
        return Err(Error::StlParse(format!(
            "header announces {} triangles but only {} bytes follow",
            triangle_count,
            body.len()
        )));
    }

    let (_, facets) = count(binary_facet, triangle_count)(body)
        .map_err(|e| Error::StlParse(format!("bad facet: {:?}", e)))?;

    let mut builder = MeshBuilder::default();
    for facet in facets {
        builder.triangle(facet);
    }
    Ok(builder.build())
}

fn binary_header(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(80usize), le_u32)(input)
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], Vec3> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], [Vec3; 3]> {
    // The stored facet normal is ignored; normals are rebuilt per vertex
    let (input, _normal) = binary_vector(input)?;
    let (input, (a, b, c)) = tuple((binary_vector, binary_vector, binary_vector))(input)?;
    let (input, _attributes) = take(2usize)(input)?;
    Ok((input, [a, b, c]))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<MeshSurface> {
    match parse_ascii_stl_impl(input) {
        Ok((_, facets)) => {
            let mut builder = MeshBuilder::default();
            for facet in facets {
                builder.triangle(facet);
            }
            Ok(builder.build())
        }
        Err(e) => Err(Error::StlParse(format!("failed to parse ASCII STL: {:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<[Vec3; 3]>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, [Vec3; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [v1, v2, v3]))
}

fn parse_vertex(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vec3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<MeshSurface> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    const TETRA_FACES: [[[f32; 3]; 3]; 2] = [
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    ];

    fn binary_stl(faces: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&(faces.len() as u32).to_le_bytes());
        for face in faces {
            data.extend(std::iter::repeat(0u8).take(12));
            for corner in face {
                for c in corner {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
            data.extend_from_slice(&[0, 0]);
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_index_count(), 0);
    }

    #[test]
    fn test_binary_shares_vertices() {
        let mesh = parse_binary_stl(&binary_stl(&TETRA_FACES)).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = binary_stl(&TETRA_FACES);
        data.truncate(data.len() - 10);
        assert!(matches!(parse_binary_stl(&data), Err(Error::StlParse(_))));
        assert!(matches!(parse_binary_stl(&data[..40]), Err(Error::StlParse(_))));
    }

    #[test]
    fn test_parse_named_ascii_solid() {
        let text = "solid tetra
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal -1 0 0
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 0 0 1
    endloop
  endfacet
endsolid tetra
";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_index_count(), 6);
    }

    #[test]
    fn test_binary_starting_with_solid_falls_back() {
        let mut data = binary_stl(&TETRA_FACES);
        data[..5].copy_from_slice(b"solid");
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
    }
}
