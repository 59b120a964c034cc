//! Error types for chunk framing and blob decoding

use std::io;

use crate::formats::ChunkTag;

/// Errors raised while writing or reading raw chunks.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Chunk tags are exactly 4 ASCII bytes
    #[error("invalid chunk tag {0:?} (expected exactly 4 ASCII bytes)")]
    InvalidTag(Vec<u8>),

    /// Stream ended inside a chunk header or payload
    #[error("truncated chunk {}: expected {expected} bytes, found {found}", describe_tag(.tag))]
    TruncatedChunk {
        /// `None` when the header itself was cut short
        tag: Option<ChunkTag>,
        expected: usize,
        found: usize,
    },

    #[error("chunk i/o failed: {0}")]
    Io(#[from] io::Error),
}

fn describe_tag(tag: &Option<ChunkTag>) -> String {
    match tag {
        Some(tag) => format!("'{tag}'"),
        None => "header".to_string(),
    }
}

/// Errors raised while decoding a mesh or scene blob.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("blob has no '{0}' chunk")]
    MissingChunk(ChunkTag),

    #[error("blob has more than one '{0}' chunk")]
    DuplicateChunk(ChunkTag),

    /// Payload is not a whole number of fixed-size records
    #[error("'{tag}' payload of {len} bytes is not a multiple of the {record_size}-byte record")]
    MalformedPayload {
        tag: ChunkTag,
        len: usize,
        record_size: usize,
    },

    #[error("record {record} has out-of-range name [{begin}, {end}) in a {table_len}-byte string table")]
    NameOutOfRange {
        record: usize,
        begin: u32,
        end: u32,
        table_len: usize,
    },

    #[error("record {record} names bytes that are not valid UTF-8")]
    InvalidName { record: usize },

    #[error("mesh record {record} covers vertices [{begin}, {end}) but the blob holds {available}")]
    VertexRangeOutOfBounds {
        record: usize,
        begin: u64,
        end: u64,
        available: usize,
    },
}
