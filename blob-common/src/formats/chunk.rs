//! Chunk framing: `[tag: 4 bytes][length: u32 LE][payload: length bytes]`
//!
//! The container is format-agnostic. Chunks are self-delimiting and
//! independent, so a reader can dispatch on tags instead of relying on order.
//!
//! Payload lengths are stored as `u32`. Payloads of 4 GiB or more silently
//! truncate the length field; nothing this tool writes comes close.

use std::fmt;
use std::io::{self, Read, Write};

use crate::error::ChunkError;

/// Size of a chunk header (tag + length)
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Vertex data chunk of a mesh blob
pub const TAG_VERTICES: ChunkTag = ChunkTag(*b"v3n3");
/// Name table chunk (both blobs carry their own)
pub const TAG_STRINGS: ChunkTag = ChunkTag(*b"str0");
/// Mesh index chunk of a mesh blob
pub const TAG_INDEX: ChunkTag = ChunkTag(*b"idx0");
/// Instance chunk of a scene blob
pub const TAG_SCENE: ChunkTag = ChunkTag(*b"scn0");

/// A validated 4-byte ASCII chunk tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag([u8; 4]);

impl ChunkTag {
    /// Validate a tag, which must be exactly 4 ASCII bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChunkError> {
        let tag: [u8; 4] = bytes
            .try_into()
            .map_err(|_| ChunkError::InvalidTag(bytes.to_vec()))?;
        if !tag.is_ascii() {
            return Err(ChunkError::InvalidTag(bytes.to_vec()));
        }
        Ok(Self(tag))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl TryFrom<&str> for ChunkTag {
    type Error = ChunkError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(value.as_bytes())
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tags are validated ASCII, except ones read from untrusted input
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A single decoded chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub tag: ChunkTag,
    pub payload: Vec<u8>,
}

/// Append `[tag][u32 length][payload]` to `w`.
///
/// Fails with [`ChunkError::InvalidTag`] before writing anything if `tag` is not
/// exactly 4 ASCII bytes.
pub fn write_chunk<W: Write>(w: &mut W, tag: &[u8], payload: &[u8]) -> Result<(), ChunkError> {
    let tag = ChunkTag::from_bytes(tag)?;

    w.write_all(tag.as_bytes())?;
    w.write_all(&(payload.len() as u32).to_le_bytes())?;
    w.write_all(payload)?;

    Ok(())
}

/// Lazily read chunks from `reader` until end of stream.
///
/// The sequence is finite and not restartable: reopen the stream to read again.
pub fn read_chunks<R: Read>(reader: R) -> ChunkReader<R> {
    ChunkReader {
        reader,
        done: false,
    }
}

/// Iterator over the chunks of a stream. Fused after the first error.
pub struct ChunkReader<R> {
    reader: R,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        let mut header = [0u8; CHUNK_HEADER_SIZE];
        let filled = read_full(&mut self.reader, &mut header)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < CHUNK_HEADER_SIZE {
            return Err(ChunkError::TruncatedChunk {
                tag: None,
                expected: CHUNK_HEADER_SIZE,
                found: filled,
            });
        }

        // Tags read back are not re-validated as ASCII; unknown tags are the caller's call
        let tag = ChunkTag([header[0], header[1], header[2], header[3]]);
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

        let mut payload = Vec::new();
        (&mut self.reader)
            .take(len as u64)
            .read_to_end(&mut payload)?;
        if payload.len() < len {
            return Err(ChunkError::TruncatedChunk {
                tag: Some(tag),
                expected: len,
                found: payload.len(),
            });
        }

        Ok(Some(Chunk { tag, payload }))
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the stream allows, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
