//! Mesh exporter (named triangle soup -> `meshes.blob`)

use std::io::Write;

use blob_common::{BinaryRecord, ChunkError, IndexRecord, NameTable, Triangle, Vertex};

use crate::error::ExportError;
use crate::formats::write_mesh_blob;
use crate::source::ContentSource;

/// A mesh blob ready to be framed: vertex data, name table and index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedMeshBlob {
    /// Tightly packed vertices (32 bytes each)
    pub vertex_data: Vec<u8>,
    pub strings: NameTable,
    /// One record per mesh, in input order
    pub index: Vec<IndexRecord>,
}

impl EncodedMeshBlob {
    /// Total vertices across all meshes
    pub fn vertex_count(&self) -> u64 {
        self.index.iter().map(|r| r.vertex_count as u64).sum()
    }

    pub fn index_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.index.len() * IndexRecord::SIZE);
        for record in &self.index {
            record.write_to(&mut bytes);
        }
        bytes
    }

    /// Frame the blob as `v3n3`, `str0`, `idx0`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), ChunkError> {
        write_mesh_blob(w, self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ChunkError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Build a mesh blob from `(name, triangles)` pairs, in order.
///
/// Each mesh's vertices follow directly after the previous mesh's, so index
/// records are contiguous and the first starts at vertex 0.
pub fn build_mesh_blob<'a, I>(meshes: I) -> Result<EncodedMeshBlob, ExportError>
where
    I: IntoIterator<Item = (&'a str, &'a [Triangle])>,
{
    let mut blob = EncodedMeshBlob::default();
    let mut vertex_count: u32 = 0;

    for (name, triangles) in meshes {
        tracing::info!("Writing '{}'...", name);

        let name_range = blob.strings.push(name);
        let count = (triangles.len() * 3) as u32;
        blob.index.push(IndexRecord::new(name_range, vertex_count, count));

        blob.vertex_data.extend_from_slice(bytemuck::cast_slice(triangles));
        vertex_count += count;
    }

    // Check that we wrote as much data as anticipated
    let expected = vertex_count as usize * Vertex::SIZE;
    if blob.vertex_data.len() != expected {
        return Err(ExportError::SizeMismatch {
            expected,
            actual: blob.vertex_data.len(),
        });
    }

    tracing::info!(
        "Built mesh blob: {} meshes, {} vertices, {} bytes of vertex data",
        blob.index.len(),
        vertex_count,
        blob.vertex_data.len()
    );

    Ok(blob)
}

/// Export the meshes of the named objects, in the order given.
///
/// Every name is resolved before anything is built: a name that is missing,
/// has no mesh, or whose mesh has no geometry aborts the whole export with
/// [`ExportError::MeshNotFound`].
pub fn export_meshes<S, N>(source: &S, names: &[N]) -> Result<EncodedMeshBlob, ExportError>
where
    S: ContentSource + ?Sized,
    N: AsRef<str>,
{
    let meshes = names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            source
                .object_geometry(name)
                .map(|(_, triangles)| (name, triangles))
                .ok_or_else(|| ExportError::MeshNotFound(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    build_mesh_blob(meshes)
}
