//! blob-export library
//!
//! Builds `meshes.blob` and `scene.blob` from a content source. Used by the
//! `blob-export` binary and by tools that want the blobs in memory.

pub mod error;
pub mod formats;
pub mod inspect;
pub mod manifest;
pub mod mesh;
pub mod scene;
pub mod source;

pub use error::ExportError;

// Re-export the shared format types
pub use blob_common::{
    IndexRecord, MeshBlob, NameRange, NameTable, SceneBlob, SceneLayout, SceneRecord, Triangle,
    Vertex,
};

// Re-export key types for export
pub use mesh::{build_mesh_blob, export_meshes, EncodedMeshBlob};
pub use scene::{build_scene_blob, export_scene, EncodedSceneBlob, ExportedMesh, SceneExport};
pub use source::{ContentSource, GltfSource, MemorySource, SourceObject, Transform};
