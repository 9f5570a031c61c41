/// Error taxonomy for mesh decoding and construction
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeshError>;

/// Everything that can go wrong between a file on disk and a usable mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The file could not be read at all.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension maps to no supported format.
    #[error("unknown mesh format: {extension:?}")]
    UnknownFormat { extension: String },

    /// The content violates the expected grammar or signature.
    #[error("format error: {message}")]
    Format { message: String },

    /// A face references a vertex outside the vertex table.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

impl MeshError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}
