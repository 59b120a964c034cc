//! Chunked blob formats
//!
//! A blob is a flat concatenation of chunks. There is no global header,
//! checksum or chunk count; readers consume chunks until end of stream.
//!
//! Integers are little-endian `u32`. Floats are IEEE-754 `f32` in the writer's
//! native byte order; consumers assume little-endian.
//!
//! # Mesh blob (`meshes.blob`)
//! ```text
//! v3n3: vertex records, 32 bytes each (pos.xyz, normal.xyz, uv.uv)
//! str0: concatenated UTF-8 mesh names, no separators
//! idx0: index records, 16 bytes each (name_begin, name_end, vertex_begin, vertex_count)
//! ```
//!
//! # Scene blob (`scene.blob`)
//! ```text
//! str0: concatenated UTF-8 mesh names (scene-local table)
//! scn0: scene records, 48 bytes (compact) or 60 bytes (with scale)
//! ```

pub mod chunk;
pub mod mesh_blob;
mod records;
pub mod scene_blob;

pub use chunk::*;
pub use mesh_blob::*;
pub use records::{BinaryRecord, IndexRecord, NameRange, NameTable, Triangle, Vertex};
pub use scene_blob::*;

use crate::error::BlobError;

/// Decode a payload made of fixed-size records.
pub(crate) fn decode_records<T: BinaryRecord>(
    tag: ChunkTag,
    payload: &[u8],
) -> Result<Vec<T>, BlobError> {
    if payload.len() % T::SIZE != 0 {
        return Err(BlobError::MalformedPayload {
            tag,
            len: payload.len(),
            record_size: T::SIZE,
        });
    }

    Ok(payload
        .chunks_exact(T::SIZE)
        .filter_map(T::from_bytes)
        .collect())
}

/// Store a chunk payload in its slot, rejecting a second chunk with the same tag.
pub(crate) fn take_unique(
    slot: &mut Option<Vec<u8>>,
    tag: ChunkTag,
    payload: Vec<u8>,
) -> Result<(), BlobError> {
    if slot.is_some() {
        return Err(BlobError::DuplicateChunk(tag));
    }
    *slot = Some(payload);
    Ok(())
}
