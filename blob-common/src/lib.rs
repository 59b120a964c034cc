//! Shared types for the chunked mesh/scene blob formats
//!
//! This crate is shared between:
//! - `blob-export` (asset pipeline, writes `meshes.blob` / `scene.blob`)
//! - renderers and tools that load the blobs back
//!
//! # Modules
//!
//! - [`formats`] - Chunk framing, name tables, vertex/index/scene records and blob decoders
//! - [`error`] - Error types for chunk framing and blob decoding

pub mod error;
pub mod formats;

pub use error::{BlobError, ChunkError};

// Re-export commonly used format items
pub use formats::{
    // Container
    CHUNK_HEADER_SIZE,
    Chunk,
    ChunkReader,
    ChunkTag,
    // Records
    BinaryRecord,
    IndexRecord,
    MeshBlob,
    MeshEntry,
    NameRange,
    NameTable,
    SceneBlob,
    SceneLayout,
    SceneRecord,
    TAG_INDEX,
    TAG_SCENE,
    TAG_STRINGS,
    TAG_VERTICES,
    Triangle,
    Vertex,
    read_chunks,
    write_chunk,
};
