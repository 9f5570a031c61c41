/// Wavefront OBJ decoding: `v` and `f` lines, everything else ignored
use std::io::Write;

use nalgebra::Point3;
use nom::{character::complete::digit1, combinator::map_res, IResult};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{Face, Mesh};

/// Decode ASCII OBJ text.
///
/// This is a tolerant superset parse: blank lines and unrecognized leading
/// tokens (`vn`, `vt`, `usemtl`, comments, ...) are ignored. `v` lines
/// append a vertex from their first three numbers, extra tokens such as a w
/// coordinate are ignored. `f` lines append one polygon face of any size
/// >= 3; face-vertex tokens of the form `i`, `i/t`, `i/t/n` or `i//n`
/// contribute only the vertex index `i`, which OBJ stores 1-based and which
/// is normalized to 0-based here. Faces are kept as-is, never triangulated.
pub fn parse_obj(input: &str) -> Result<Mesh> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    for (line_no, line) in input.lines().enumerate() {
        let line_no = line_no + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0f64; 3];
                for coord in &mut coords {
                    let tok = tokens.next().ok_or_else(|| {
                        MeshError::format(format!("line {line_no}: `v` needs three coordinates"))
                    })?;
                    *coord = tok.parse().map_err(|_| {
                        MeshError::format(format!("line {line_no}: bad coordinate {tok:?}"))
                    })?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let mut face: Face = Vec::new();
                for tok in tokens {
                    face.push(face_vertex(tok, line_no)?);
                }
                if face.len() < 3 {
                    return Err(MeshError::format(format!(
                        "line {line_no}: a face needs at least three vertices"
                    )));
                }
                faces.push(face);
            }
            _ => {}
        }
    }

    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        "decoded OBJ"
    );
    Mesh::new(vertices, faces)
}

/// Extract the 0-based vertex index from one face-vertex token.
///
/// Negative (relative) indices are not supported.
fn face_vertex(token: &str, line_no: usize) -> Result<u32> {
    if token.starts_with('-') {
        return Err(MeshError::format(format!(
            "line {line_no}: negative OBJ indices are not supported"
        )));
    }
    let index = match vertex_index(token) {
        Ok((rest, index)) if rest.is_empty() || rest.starts_with('/') => index,
        _ => {
            return Err(MeshError::format(format!(
                "line {line_no}: bad face vertex {token:?}"
            )))
        }
    };
    if index == 0 {
        return Err(MeshError::format(format!(
            "line {line_no}: OBJ indices are 1-based"
        )));
    }
    Ok(index - 1)
}

fn vertex_index(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

/// Encode a mesh as ASCII OBJ, preserving polygon faces.
pub fn write_obj<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for face in mesh.faces() {
        write!(writer, "f")?;
        for &index in face {
            write!(writer, " {}", index + 1)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_and_triangle() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn test_face_vertex_triples() {
        // Texture and normal indices are ignored, whatever their shape.
        let input = "v 0 0 0\nv 0 0 1\nv 0 1 0\nv 1 0 0\nv 1 0 1\nv 1 1 0\nf 1/2/3 4//5 6\n";
        let mesh = parse_obj(input).unwrap();
        assert_eq!(mesh.faces(), &[vec![0, 3, 5]]);
    }

    #[test]
    fn test_polygon_faces_kept_untriangulated() {
        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(input).unwrap();
        assert_eq!(mesh.faces(), &[vec![0, 1, 2, 3]]);
        assert_eq!(mesh.edge_indices(), &[(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let input = "# comment\no thing\nvn 0 0 1\nvt 0.5 0.5\n\nv 0 0 0\nv 1 0 0\nv 1 1 0\nusemtl shiny\nf 1 2 3\n";
        let mesh = parse_obj(input).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_vertex_w_coordinate_ignored() {
        let mesh = parse_obj("v 0 0 0 1.0\nv 1 0 0 1.0\nv 1 1 0 1.0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertices()[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_negative_index_rejected() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -1 -2 -3\n");
        assert!(matches!(result, Err(MeshError::Format { .. })));
    }

    #[test]
    fn test_zero_index_rejected() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 0 1 2\n");
        assert!(matches!(result, Err(MeshError::Format { .. })));
    }

    #[test]
    fn test_short_vertex_line_rejected() {
        assert!(matches!(
            parse_obj("v 0 0\n"),
            Err(MeshError::Format { .. })
        ));
    }

    #[test]
    fn test_short_face_line_rejected() {
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(MeshError::Format { .. })
        ));
    }

    #[test]
    fn test_out_of_range_face_index_is_index_error() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 9\n");
        assert!(matches!(result, Err(MeshError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_roundtrip_preserves_quads_and_bounds() {
        let cube = Mesh::unit_cube();
        let mut encoded = Vec::new();
        write_obj(&cube, &mut encoded).unwrap();
        let decoded = parse_obj(&String::from_utf8(encoded).unwrap()).unwrap();
        assert_eq!(decoded.face_count(), 6);
        assert_eq!(decoded.faces(), cube.faces());
        assert_eq!(decoded.bounding_box(), cube.bounding_box());
    }
}
