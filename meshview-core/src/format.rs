/// Format selection and whole-file decode dispatch
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;
use crate::{obj, stl};

/// The closed set of supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// STL, ASCII or binary; the variant is sniffed from the content.
    Stl,
    /// Wavefront OBJ, ASCII only.
    Obj,
}

impl MeshFormat {
    /// Select a format from the file extension, `None` when unrecognized.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "stl" | "stla" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }
}

/// Decode raw file bytes with the given format.
pub fn decode(data: &[u8], format: MeshFormat) -> Result<Mesh> {
    match format {
        MeshFormat::Stl => stl::parse_stl(data),
        MeshFormat::Obj => {
            let text = std::str::from_utf8(data)
                .map_err(|err| MeshError::format(format!("OBJ is not valid UTF-8: {err}")))?;
            obj::parse_obj(text)
        }
    }
}

/// Read a file and decode it into a mesh.
///
/// The whole file is loaded into memory before decoding; there is no
/// streaming path.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| MeshError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string(),
    })?;
    let data = fs::read(path)?;
    debug!(path = %path.display(), ?format, bytes = data.len(), "read mesh file");
    decode(&data, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(MeshFormat::from_path("model.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.STL"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.stla"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("/some/dir/model.OBJ"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("model.ply"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
    }

    #[test]
    fn test_decode_dispatch() {
        let stl = b"solid s\nfacet\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 1 1 0\nendloop\nendfacet\nendsolid\n";
        let mesh = decode(stl, MeshFormat::Stl).unwrap();
        assert_eq!(mesh.face_count(), 1);

        let obj = b"v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";
        let mesh = decode(obj, MeshFormat::Obj).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_obj_must_be_utf8() {
        let result = decode(&[b'v', b' ', 0xff, 0xfe], MeshFormat::Obj);
        assert!(matches!(result, Err(MeshError::Format { .. })));
    }

    #[test]
    fn test_load_mesh_unknown_extension() {
        let result = load_mesh("model.gltf");
        match result {
            Err(MeshError::UnknownFormat { extension }) => assert_eq!(extension, "gltf"),
            other => panic!("expected UnknownFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_load_mesh_missing_file_is_io_error() {
        let result = load_mesh("does_not_exist_meshview_test.stl");
        assert!(matches!(result, Err(MeshError::Io(_))));
    }

    #[test]
    fn test_extension() {
        assert_eq!(MeshFormat::Stl.extension(), "stl");
        assert_eq!(MeshFormat::Obj.extension(), "obj");
    }
}
