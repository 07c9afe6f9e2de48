/// Wavefront OBJ parser producing indexed meshes
///
/// Only geometry is read: `v`, `vt` and `f` records. Faces with more than
/// three corners are fan-triangulated. Texture coordinates are attached when
/// every face corner that references a vertex agrees on its `vt`.
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::{many0, separated_list1},
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::math::{Vec2, Vec3};
use crate::mesh::MeshSurface;

/// One face corner: vertex index and optional texture index, both as written
#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    vertex: i64,
    tex_coord: Option<i64>,
}

/// A face and how many vertices preceded it, for relative indices
struct Face {
    line: usize,
    vertices_before: usize,
    tex_coords_before: usize,
    corners: Vec<Corner>,
}

#[derive(Debug, PartialEq)]
enum Record {
    Vertex(Vec3),
    TexCoord(Vec2),
    Face(Vec<Corner>),
    Ignored,
}

/// Parse OBJ text into a mesh
pub fn parse_obj(input: &str) -> Result<MeshSurface> {
    let mut positions = Vec::new();
    let mut tex_coords = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    for (number, line) in input.lines().enumerate() {
        let line_number = number + 1;
        // Comments may also trail a record
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let record = parse_record(line).map_err(|message| Error::ObjParse {
            line: line_number,
            message,
        })?;

        match record {
            Record::Vertex(p) => positions.push(p),
            Record::TexCoord(uv) => tex_coords.push(uv),
            Record::Face(corners) => faces.push(Face {
                line: line_number,
                vertices_before: positions.len(),
                tex_coords_before: tex_coords.len(),
                corners,
            }),
            Record::Ignored => {}
        }
    }

    let mut triangles = Vec::new();
    let mut corner_uv: Vec<Option<usize>> = vec![None; positions.len()];
    let mut uv_consistent = !tex_coords.is_empty();

    for face in faces {
        let Face { line, corners, .. } = &face;
        let line = *line;
        if corners.len() < 3 {
            return Err(Error::ObjParse {
                line,
                message: format!("face has {} corners, need at least 3", corners.len()),
            });
        }

        let mut resolved = Vec::with_capacity(corners.len());
        for corner in corners {
            let vertex = resolve_index(corner.vertex, face.vertices_before).ok_or_else(|| Error::ObjParse {
                line,
                message: format!("vertex index {} out of range", corner.vertex),
            })?;

            match corner.tex_coord {
                Some(index) => {
                    let uv = resolve_index(index, face.tex_coords_before).ok_or_else(|| Error::ObjParse {
                        line,
                        message: format!("texture index {} out of range", index),
                    })?;
                    match corner_uv[vertex] {
                        Some(existing) if existing != uv => uv_consistent = false,
                        _ => corner_uv[vertex] = Some(uv),
                    }
                }
                None => uv_consistent = false,
            }

            resolved.push(vertex as u32);
        }

        for i in 1..resolved.len() - 1 {
            triangles.push([resolved[0], resolved[i], resolved[i + 1]]);
        }
    }

    let mesh = MeshSurface::new(positions, triangles);
    if uv_consistent {
        let per_vertex = corner_uv
            .iter()
            .map(|uv| uv.map_or_else(Vec2::zeros, |index| tex_coords[index]))
            .collect();
        return Ok(mesh.with_tex_coords(per_vertex));
    }
    Ok(mesh)
}

/// OBJ indices are 1-based; negative values count back from the last
/// element defined before the face
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    (0..len as i64).contains(&resolved).then_some(resolved as usize)
}

/// The record's keyword and the rest of the line
fn record_keyword(input: &str) -> IResult<&str, &str> {
    terminated(take_till1(|c: char| c.is_whitespace()), space0)(input)
}

/// Dispatch on the exact keyword; records we do not draw are skipped
fn parse_record(line: &str) -> std::result::Result<Record, String> {
    let (body, keyword) = record_keyword(line).map_err(|_| format!("cannot read record `{line}`"))?;
    let parsed = match keyword {
        "v" => all_consuming(vertex_body)(body),
        "vt" => all_consuming(tex_coord_body)(body),
        "f" => all_consuming(face_body)(body),
        // Normals, groups, materials, points, lines, free-form curves
        _ => return Ok(Record::Ignored),
    };
    parsed
        .map(|(_, record)| record)
        .map_err(|_| format!("malformed `{keyword}` record `{body}`"))
}

fn vertex_body(input: &str) -> IResult<&str, Record> {
    let (input, (x, _, y, _, z)) = tuple((float, space1, float, space1, float))(input)?;
    // Optional w or vertex colour trails the position
    let (input, _) = many0(preceded(space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Record::Vertex(Vec3::new(x, y, z))))
}

fn tex_coord_body(input: &str) -> IResult<&str, Record> {
    let (input, u) = float(input)?;
    let (input, v) = opt(preceded(space1, float))(input)?;
    let (input, _w) = opt(preceded(space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Record::TexCoord(Vec2::new(u, v.unwrap_or(0.0)))))
}

fn face_body(input: &str) -> IResult<&str, Record> {
    let (input, corners) = separated_list1(space1, parse_corner)(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Record::Face(corners)))
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn parse_corner(input: &str) -> IResult<&str, Corner> {
    let (input, vertex) = integer(input)?;
    let (input, tex_coord) = opt(preceded(char('/'), opt(integer)))(input)?;
    let (input, _) = opt(preceded(char('/'), integer))(input)?;
    Ok((
        input,
        Corner {
            vertex,
            tex_coord: tex_coord.flatten(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Surface, VertexFlags};

    const QUAD: &str = "\
# a unit quad
mtllib quad.mtl
o Quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0 0 1
s off
f 1 2 3 4
";

    #[test]
    fn test_parse_quad_fan_triangulates() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_corner_forms_and_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf -3/1/1 2//1 3/3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_consistent_tex_coords_are_kept() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n";
        let mesh = parse_obj(text).unwrap();
        let vertices = mesh.generate_vertices(VertexFlags::TEX_COORDS);
        assert_eq!(&vertices[5..10], &[1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let text = "v 0 0 0\nv 1 0 0\n\nf 1 2 7\n";
        match parse_obj(text) {
            Err(Error::ObjParse { line, message }) => {
                assert_eq!(line, 4);
                assert!(message.contains("7"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keywords_are_skipped() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
p 1
cstype bspline
usemap none
surfacexyz 9
f 1 2 3 # one triangle
";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_keywords_match_exactly() {
        // `vx` is not a vertex, so the face points past the end
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvx 5 5 5\nf 1 2 4\n";
        assert!(matches!(parse_obj(text), Err(Error::ObjParse { line: 5, .. })));
    }

    #[test]
    fn test_trailing_garbage_on_face_is_an_error() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3 x\n";
        match parse_obj(text) {
            Err(Error::ObjParse { line, message }) => {
                assert_eq!(line, 4);
                assert_eq!(message, "malformed `f` record `1 2 3 x`");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_vertex_is_an_error() {
        let text = "v 0 0 0\nv 1 two 3\n";
        match parse_obj(text) {
            Err(Error::ObjParse { line, message }) => {
                assert_eq!(line, 2);
                assert_eq!(message, "malformed `v` record `1 two 3`");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_vertex_with_weight_and_colour() {
        let text = "v 0 0 0 1.0\nv 1 0 0 0.5 0.5 0.5\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.positions()[1], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_degenerate_face_is_an_error() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(parse_obj(text), Err(Error::ObjParse { line: 3, .. })));
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(1, 3), Some(0));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(0, 3), None);
        assert_eq!(resolve_index(4, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }
}
