//! Export error taxonomy

use std::io;
use std::path::PathBuf;

use blob_common::ChunkError;

/// Errors raised by the mesh and scene exporters.
///
/// Everything except [`ExportError::UnresolvedSceneReference`] aborts the run.
/// Unresolved references are collected and logged, and the instance is dropped.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Requested export name is absent from the content source
    #[error("object '{0}' not found in content source (or it has no mesh)")]
    MeshNotFound(String),

    #[error("not writing object '{object}' because {}", unresolved_reason(.mesh))]
    UnresolvedSceneReference {
        object: String,
        mesh: Option<String>,
    },

    /// Vertex data does not match the index totals
    #[error("wrote {actual} bytes of vertex data, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn unresolved_reason(mesh: &Option<String>) -> String {
    match mesh {
        Some(mesh) => format!("mesh '{mesh}' was not written"),
        None => "it has no mesh".to_string(),
    }
}

impl ExportError {
    /// Whether the run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExportError::UnresolvedSceneReference { .. })
    }
}
