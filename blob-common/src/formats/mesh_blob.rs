//! Mesh blob (`meshes.blob`): `v3n3` + `str0` + `idx0`
//!
//! The exporter always writes the chunks in that order, but decoding here
//! dispatches on tags and does not depend on it. Unknown tags are skipped.

use std::io::Read;

use hashbrown::HashMap;

use super::chunk::{Chunk, TAG_INDEX, TAG_STRINGS, TAG_VERTICES, read_chunks};
use super::records::{IndexRecord, NameTable, Vertex};
use super::{decode_records, take_unique};
use crate::error::{BlobError, ChunkError};

/// A named mesh resolved from the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshEntry<'a> {
    pub name: &'a str,
    /// First vertex, counted from the start of the vertex data
    pub start: u32,
    pub count: u32,
}

/// Decoded mesh blob
#[derive(Debug, Clone)]
pub struct MeshBlob {
    vertices: Vec<Vertex>,
    strings: NameTable,
    index: Vec<IndexRecord>,
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl MeshBlob {
    /// Read and validate a mesh blob from a stream.
    pub fn read<R: Read>(reader: R) -> Result<Self, BlobError> {
        Self::from_chunks(read_chunks(reader))
    }

    /// Assemble a mesh blob from already-framed chunks, in any order.
    pub fn from_chunks<I>(chunks: I) -> Result<Self, BlobError>
    where
        I: IntoIterator<Item = Result<Chunk, ChunkError>>,
    {
        let mut vertex_data = None;
        let mut string_data = None;
        let mut index_data = None;

        for chunk in chunks {
            let Chunk { tag, payload } = chunk?;
            match tag {
                TAG_VERTICES => take_unique(&mut vertex_data, tag, payload)?,
                TAG_STRINGS => take_unique(&mut string_data, tag, payload)?,
                TAG_INDEX => take_unique(&mut index_data, tag, payload)?,
                _ => {}
            }
        }

        let vertex_data = vertex_data.ok_or(BlobError::MissingChunk(TAG_VERTICES))?;
        let string_data = string_data.ok_or(BlobError::MissingChunk(TAG_STRINGS))?;
        let strings = NameTable::from_bytes(string_data);
        let index_data = index_data.ok_or(BlobError::MissingChunk(TAG_INDEX))?;

        let vertices: Vec<Vertex> = decode_records(TAG_VERTICES, &vertex_data)?;
        let index: Vec<IndexRecord> = decode_records(TAG_INDEX, &index_data)?;

        let mut names = Vec::with_capacity(index.len());
        let mut lookup = HashMap::with_capacity(index.len());
        for (i, record) in index.iter().enumerate() {
            let name = strings.resolve(i, record.name)?;
            if record.vertex_end() > vertices.len() as u64 {
                return Err(BlobError::VertexRangeOutOfBounds {
                    record: i,
                    begin: record.vertex_begin as u64,
                    end: record.vertex_end(),
                    available: vertices.len(),
                });
            }
            // First record wins on duplicate names
            lookup.entry(name.to_string()).or_insert(i);
            names.push(name.to_string());
        }

        Ok(Self {
            vertices,
            strings,
            index,
            names,
            lookup,
        })
    }

    /// Look up a mesh by name.
    pub fn get(&self, name: &str) -> Option<MeshEntry<'_>> {
        self.lookup.get(name).map(|&i| self.entry(i))
    }

    /// Vertex data of a mesh, in triangle emission order.
    pub fn vertices(&self, name: &str) -> Option<&[Vertex]> {
        let entry = self.get(name)?;
        let start = entry.start as usize;
        Some(&self.vertices[start..start + entry.count as usize])
    }

    /// All meshes in index order.
    pub fn entries(&self) -> impl Iterator<Item = MeshEntry<'_>> + '_ {
        (0..self.index.len()).map(|i| self.entry(i))
    }

    pub fn index(&self) -> &[IndexRecord] {
        &self.index
    }

    pub fn strings(&self) -> &NameTable {
        &self.strings
    }

    pub fn all_vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn mesh_count(&self) -> usize {
        self.index.len()
    }

    fn entry(&self, i: usize) -> MeshEntry<'_> {
        let record = &self.index[i];
        MeshEntry {
            name: &self.names[i],
            start: record.vertex_begin,
            count: record.vertex_count,
        }
    }
}
