/// STL decoding: the ASCII token grammar and the 50-byte binary records
use std::io::Write;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::take_till1, character::complete::multispace0, number::complete::double,
    sequence::preceded, IResult,
};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{Face, Mesh};

const BINARY_HEADER_LEN: usize = 80;
const BINARY_RECORD_LEN: usize = 50;

/// Decode an STL file, trying the ASCII grammar first and falling back to
/// the binary layout on any ASCII failure.
///
/// Known limitation of that ordering: a binary file whose header begins
/// with the printable bytes `solid` is first routed to the ASCII attempt.
/// The fallback still recovers it because the attempt fails, but the
/// misrouting is inherent to sniffing rather than an error to fix here.
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    if let Ok(text) = std::str::from_utf8(data) {
        match parse_ascii_stl(text) {
            Ok(mesh) => return Ok(mesh),
            Err(err) => debug!(%err, "ASCII STL parse failed, trying binary"),
        }
    }
    parse_binary_stl(data)
}

/// Decode ASCII STL text.
///
/// The grammar is token-oriented: `facet` resets the vertex accumulator,
/// `vertex` consumes three numbers, and `endloop` emits a triangle when the
/// accumulator holds exactly three vertices. A facet block bracketing any
/// other vertex count is dropped without error; a non-numeric coordinate is
/// a hard error. STL shares no indices, so every triangle gets three fresh
/// vertices at synthesized indices.
pub fn parse_ascii_stl(input: &str) -> Result<Mesh> {
    let mut rest = match token(input) {
        Ok((rest, "solid")) => rest,
        _ => return Err(MeshError::format("ASCII STL must start with `solid`")),
    };

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();
    let mut pending: Vec<Point3<f64>> = Vec::new();

    while let Ok((next, word)) = token(rest) {
        rest = next;
        match word {
            "facet" => pending.clear(),
            "vertex" => {
                let (next, point) = point3(rest)
                    .map_err(|_| MeshError::format("expected three numbers after `vertex`"))?;
                rest = next;
                pending.push(point);
            }
            "endloop" => {
                if pending.len() == 3 {
                    let base = vertices.len() as u32;
                    vertices.append(&mut pending);
                    faces.push(vec![base, base + 1, base + 2]);
                } else {
                    pending.clear();
                }
            }
            "endsolid" => break,
            _ => {}
        }
    }

    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        "decoded ASCII STL"
    );
    Mesh::new(vertices, faces)
}

fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(char::is_whitespace))(input)
}

fn point3(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, x) = preceded(multispace0, double)(input)?;
    let (input, y) = preceded(multispace0, double)(input)?;
    let (input, z) = preceded(multispace0, double)(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Decode binary STL: an 80-byte header (discarded), a little-endian u32
/// triangle count, then one 50-byte record per triangle.
///
/// The declared count must account for the file size exactly; anything else
/// means a truncated or corrupt file.
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh> {
    if data.len() < BINARY_HEADER_LEN + 4 {
        return Err(MeshError::format(format!(
            "binary STL needs at least {} bytes, got {}",
            BINARY_HEADER_LEN + 4,
            data.len()
        )));
    }

    let count = u32::from_le_bytes([
        data[BINARY_HEADER_LEN],
        data[BINARY_HEADER_LEN + 1],
        data[BINARY_HEADER_LEN + 2],
        data[BINARY_HEADER_LEN + 3],
    ]);

    let expected = (BINARY_HEADER_LEN + 4) as u64 + BINARY_RECORD_LEN as u64 * u64::from(count);
    if data.len() as u64 != expected {
        return Err(MeshError::format(format!(
            "binary STL declares {count} triangles ({expected} bytes) but the file has {} bytes",
            data.len()
        )));
    }

    let count = count as usize;
    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(count * 3);
    let mut faces: Vec<Face> = Vec::with_capacity(count);
    let mut offset = BINARY_HEADER_LEN + 4;

    for _ in 0..count {
        // Skip the 12-byte normal; geometry is recovered from positions
        // alone, promoted to f64 on load.
        offset += 12;
        let base = vertices.len() as u32;
        for _ in 0..3 {
            vertices.push(read_point(&data[offset..offset + 12]));
            offset += 12;
        }
        faces.push(vec![base, base + 1, base + 2]);
        // Skip the attribute byte count.
        offset += 2;
    }

    debug!(triangles = count, "decoded binary STL");
    Mesh::new(vertices, faces)
}

fn read_point(buf: &[u8]) -> Point3<f64> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Point3::new(f64::from(x), f64::from(y), f64::from(z))
}

/// Encode a mesh as ASCII STL, fan-triangulating polygon faces.
pub fn write_ascii_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "solid meshview")?;
    for polygon in mesh.expand_faces() {
        for k in 1..polygon.len().saturating_sub(1) {
            let (a, b, c) = (&polygon[0], &polygon[k], &polygon[k + 1]);
            let n = facet_normal(a, b, c);
            writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
            writeln!(writer, "    outer loop")?;
            for v in [a, b, c] {
                writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
            }
            writeln!(writer, "    endloop")?;
            writeln!(writer, "  endfacet")?;
        }
    }
    writeln!(writer, "endsolid meshview")?;
    Ok(())
}

fn facet_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > f64::EPSILON {
        n / len
    } else {
        Vector3::zeros()
    }
}
