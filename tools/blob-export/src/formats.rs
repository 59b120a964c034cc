//! Blob file output
//!
//! Re-exports the shared chunk formats and writes finished blobs to disk.

pub use blob_common::formats::*;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use blob_common::ChunkError;

use crate::error::ExportError;
use crate::mesh::EncodedMeshBlob;
use crate::scene::EncodedSceneBlob;

/// Write a complete mesh blob: `v3n3`, `str0`, `idx0`, in that order.
pub fn write_mesh_blob<W: Write>(w: &mut W, blob: &EncodedMeshBlob) -> Result<(), ChunkError> {
    emit(w, TAG_VERTICES, &blob.vertex_data)?;
    emit(w, TAG_STRINGS, blob.strings.as_bytes())?;
    emit(w, TAG_INDEX, &blob.index_bytes())
}

/// Write a complete scene blob: `str0`, then `scn0`.
pub fn write_scene_blob<W: Write>(w: &mut W, blob: &EncodedSceneBlob) -> Result<(), ChunkError> {
    emit(w, TAG_STRINGS, blob.strings.as_bytes())?;
    emit(w, TAG_SCENE, &blob.record_bytes())
}

fn emit<W: Write>(w: &mut W, tag: ChunkTag, payload: &[u8]) -> Result<(), ChunkError> {
    tracing::debug!("chunk '{}': {} bytes", tag, payload.len());
    write_chunk(w, tag.as_bytes(), payload)
}

/// Encode a blob fully in memory, then write it to `path` in one pass.
///
/// The file is truncated on open. If writing fails part-way the partial file is
/// removed; any output of an aborted run must be treated as unusable anyway.
/// Returns the number of bytes written.
pub fn write_blob_file<F>(path: &Path, encode: F) -> Result<u64, ExportError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<(), ChunkError>,
{
    let mut bytes = Vec::new();
    encode(&mut bytes)?;

    let io_error = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Make sure the output dir exists before writing
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_error)?;
    }

    let result = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()
    });

    if let Err(source) = result {
        let _ = fs::remove_file(path);
        return Err(io_error(source));
    }

    tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_blob_file_creates_parent_dirs() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("dist").join("out.blob");

        let written = write_blob_file(&path, |w| write_chunk(w, b"str0", b"abc")).unwrap();

        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&path).unwrap().len(), 11);
    }

    #[test]
    fn test_encode_failure_writes_nothing() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out.blob");

        let result = write_blob_file(&path, |w| write_chunk(w, b"bad", b"abc"));

        assert!(matches!(
            result,
            Err(ExportError::Chunk(ChunkError::InvalidTag(_)))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out.blob");
        std::fs::write(&path, vec![0xAB; 100]).unwrap();

        write_blob_file(&path, |w| write_chunk(w, b"str0", b"")).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"str0\0\0\0\0");
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        // A directory cannot be opened as a file
        let result = write_blob_file(dir.path(), |w| write_chunk(w, b"str0", b""));
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
