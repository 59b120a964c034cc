//! Read a written blob back and summarize it

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use blob_common::{
    read_chunks, Chunk, ChunkTag, MeshBlob, SceneBlob, SceneLayout, TAG_INDEX, TAG_SCENE,
};

/// What a blob turned out to contain
#[derive(Debug)]
pub enum BlobContents {
    Meshes(MeshBlob),
    Scene(SceneBlob),
    /// Neither an `idx0` nor a `scn0` chunk
    Unknown,
}

/// Chunk listing plus decoded contents
#[derive(Debug)]
pub struct BlobReport {
    pub chunks: Vec<(ChunkTag, usize)>,
    pub contents: BlobContents,
}

/// Decode the blob at `path`. Scene records are read with `layout`.
pub fn inspect_blob(path: &Path, layout: SceneLayout) -> Result<BlobReport> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read blob: {:?}", path))?;

    let chunks: Vec<Chunk> = read_chunks(bytes.as_slice())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Malformed blob: {:?}", path))?;
    let listing = chunks.iter().map(|c| (c.tag, c.payload.len())).collect();

    let has = |tag: ChunkTag| chunks.iter().any(|c| c.tag == tag);
    let contents = if has(TAG_INDEX) {
        BlobContents::Meshes(MeshBlob::from_chunks(chunks.into_iter().map(Ok))?)
    } else if has(TAG_SCENE) {
        BlobContents::Scene(SceneBlob::from_chunks(chunks.into_iter().map(Ok), layout)?)
    } else {
        BlobContents::Unknown
    };

    Ok(BlobReport {
        chunks: listing,
        contents,
    })
}

impl fmt::Display for BlobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, len) in &self.chunks {
            writeln!(f, "chunk '{}': {} bytes", tag, len)?;
        }

        match &self.contents {
            BlobContents::Meshes(blob) => {
                writeln!(f, "{} meshes:", blob.mesh_count())?;
                for entry in blob.entries() {
                    writeln!(
                        f,
                        "  {:<24} start {:>8}  count {:>8}",
                        entry.name, entry.start, entry.count
                    )?;
                }
            }
            BlobContents::Scene(blob) => {
                writeln!(f, "{} instances:", blob.len())?;
                for (name, record) in blob.instances() {
                    let [x, y, z] = record.translation;
                    let [dx, dy, dz] = record.dimensions;
                    writeln!(
                        f,
                        "  {:<24} at ({:.3}, {:.3}, {:.3})  size ({:.3}, {:.3}, {:.3})",
                        name, x, y, z, dx, dy, dz
                    )?;
                }
            }
            BlobContents::Unknown => writeln!(f, "no mesh index or scene chunk")?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_mesh_blob;
    use crate::scene::{build_scene_blob, ExportedMesh};
    use crate::source::SourceObject;
    use blob_common::{Triangle, Vertex};
    use tempfile::tempdir;

    #[test]
    fn test_inspect_mesh_blob() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("meshes.blob");
        let tris: Vec<Triangle> = vec![[Vertex::default(); 3]; 2];
        let blob = build_mesh_blob([("Crate", tris.as_slice())]).unwrap();
        std::fs::write(&path, blob.to_bytes().unwrap()).unwrap();

        let report = inspect_blob(&path, SceneLayout::Compact).unwrap();

        assert_eq!(report.chunks.len(), 3);
        assert_eq!(report.chunks[0].1, 6 * 32);
        assert!(matches!(report.contents, BlobContents::Meshes(ref m) if m.mesh_count() == 1));
        assert!(report.to_string().contains("Crate"));
    }

    #[test]
    fn test_inspect_scene_blob() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("scene.blob");
        let objects = vec![SourceObject::new("Crate", Some("Crate"))];
        let export = build_scene_blob(
            &[ExportedMesh::new("Crate", "Crate")],
            &objects,
            SceneLayout::Compact,
        );
        std::fs::write(&path, export.blob.to_bytes().unwrap()).unwrap();

        let report = inspect_blob(&path, SceneLayout::Compact).unwrap();
        assert!(matches!(report.contents, BlobContents::Scene(ref s) if s.len() == 1));
    }

    #[test]
    fn test_inspect_truncated_blob() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.blob");
        std::fs::write(&path, b"str0\x09\0\0\0abc").unwrap();

        assert!(inspect_blob(&path, SceneLayout::Compact).is_err());
    }
}
