/// Meshview Core Library - mesh decoding and scene model
///
/// Turns STL and Wavefront OBJ files into a normalized in-memory mesh
/// representation: a vertex/face table, a deduplicated wireframe edge set,
/// and axis-aligned bounds for camera framing. Rendering frontends consume
/// `Scene` as a read-only data source.

pub mod bounds;
pub mod error;
pub mod format;
pub mod mesh;
pub mod obj;
pub mod stl;

// Re-export commonly used types
pub use bounds::Aabb;
pub use error::{MeshError, Result};
pub use format::{decode, load_mesh, MeshFormat};
pub use mesh::{Face, Mesh, Scene};
