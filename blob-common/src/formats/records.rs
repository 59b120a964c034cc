//! Fixed-size records and the `[begin, end)` name table

use bytemuck::{Pod, Zeroable};

use crate::error::BlobError;

/// Trait for fixed-size binary records stored back to back in a chunk payload.
pub trait BinaryRecord: Sized {
    /// Size of one serialized record in bytes.
    const SIZE: usize;

    /// Append the serialized record to `out`.
    fn write_to(&self, out: &mut Vec<u8>);

    /// Read a record from the start of `bytes`.
    ///
    /// Returns `None` if the slice is too short.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;
}

/// Triangle-soup vertex (32 bytes)
///
/// ```text
/// 0x00: position [f32; 3]
/// 0x0C: normal   [f32; 3]
/// 0x18: uv       [f32; 2]
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<Vertex>() == Vertex::SIZE);

/// Three independent vertices; meshes are never indexed
pub type Triangle = [Vertex; 3];

impl Vertex {
    pub const SIZE: usize = 32;

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl BinaryRecord for Vertex {
    const SIZE: usize = Self::SIZE;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(self));
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..Self::SIZE)?;
        // Payload slices carry no alignment guarantee
        Some(bytemuck::pod_read_unaligned(bytes))
    }
}

/// `[begin, end)` byte range into a name table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NameRange {
    pub begin: u32,
    pub end: u32,
}

impl NameRange {
    pub fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    /// Check `begin <= end <= table_len`.
    pub fn is_within(&self, table_len: usize) -> bool {
        self.begin <= self.end && (self.end as usize) <= table_len
    }
}

/// Mesh index record (16 bytes)
///
/// ```text
/// 0x00: name_begin   u32
/// 0x04: name_end     u32
/// 0x08: vertex_begin u32 (in vertices, from the start of v3n3)
/// 0x0C: vertex_count u32 (multiple of 3)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord {
    pub name: NameRange,
    pub vertex_begin: u32,
    pub vertex_count: u32,
}

impl IndexRecord {
    pub const SIZE: usize = 16;

    pub fn new(name: NameRange, vertex_begin: u32, vertex_count: u32) -> Self {
        Self {
            name,
            vertex_begin,
            vertex_count,
        }
    }

    /// One past the last vertex of this mesh
    pub fn vertex_end(&self) -> u64 {
        self.vertex_begin as u64 + self.vertex_count as u64
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.name.begin.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.name.end.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.vertex_begin.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes
    }
}

impl BinaryRecord for IndexRecord {
    const SIZE: usize = Self::SIZE;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            name: NameRange::new(read_u32(bytes, 0), read_u32(bytes, 4)),
            vertex_begin: read_u32(bytes, 8),
            vertex_count: read_u32(bytes, 12),
        })
    }
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

pub(crate) fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Concatenated UTF-8 names addressed by [`NameRange`], no separators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    bytes: Vec<u8>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Append a name and return its range.
    pub fn push(&mut self, name: &str) -> NameRange {
        let begin = self.bytes.len() as u32;
        self.bytes.extend_from_slice(name.as_bytes());
        NameRange::new(begin, self.bytes.len() as u32)
    }

    /// Resolve the name of record `record`.
    pub fn resolve(&self, record: usize, range: NameRange) -> Result<&str, BlobError> {
        if !range.is_within(self.bytes.len()) {
            return Err(BlobError::NameOutOfRange {
                record,
                begin: range.begin,
                end: range.end,
                table_len: self.bytes.len(),
            });
        }
        std::str::from_utf8(&self.bytes[range.begin as usize..range.end as usize])
            .map_err(|_| BlobError::InvalidName { record })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.25, 0.75]);
        let mut out = Vec::new();
        v.write_to(&mut out);

        assert_eq!(out.len(), Vertex::SIZE);
        assert_eq!(&out[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&out[16..20], &1.0f32.to_ne_bytes()); // normal.y
        assert_eq!(&out[28..32], &0.75f32.to_ne_bytes()); // uv.v
        assert_eq!(Vertex::from_bytes(&out), Some(v));
    }

    #[test]
    fn test_vertex_from_unaligned_slice() {
        let v = Vertex::new([-1.0, 0.5, 9.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
        let mut out = vec![0u8];
        v.write_to(&mut out);

        assert_eq!(Vertex::from_bytes(&out[1..]), Some(v));
        assert_eq!(Vertex::from_bytes(&out[1..20]), None);
    }

    #[test]
    fn test_index_record_layout() {
        let record = IndexRecord::new(NameRange::new(5, 10), 36, 12);
        let bytes = record.to_bytes();

        assert_eq!(&bytes[0..4], &5u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &10u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &36u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &12u32.to_le_bytes());
        assert_eq!(IndexRecord::from_bytes(&bytes), Some(record));
        assert_eq!(record.vertex_end(), 48);
    }

    #[test]
    fn test_name_table_ranges() {
        let mut table = NameTable::new();
        let crate_range = table.push("Crate");
        let stand_range = table.push("Stand");

        assert_eq!(crate_range, NameRange::new(0, 5));
        assert_eq!(stand_range, NameRange::new(5, 10));
        assert_eq!(table.as_bytes(), b"CrateStand");
        assert_eq!(table.resolve(1, stand_range).unwrap(), "Stand");
    }

    #[test]
    fn test_name_table_rejects_bad_ranges() {
        let table = NameTable::from_bytes(b"Crate".to_vec());

        assert!(matches!(
            table.resolve(0, NameRange::new(3, 9)),
            Err(BlobError::NameOutOfRange { table_len: 5, .. })
        ));
        assert!(matches!(
            table.resolve(2, NameRange::new(4, 2)),
            Err(BlobError::NameOutOfRange { record: 2, .. })
        ));
        assert_eq!(table.resolve(0, NameRange::new(5, 5)).unwrap(), "");

        let broken = NameTable::from_bytes(vec![b'a', 0xff]);
        assert!(matches!(
            broken.resolve(7, NameRange::new(0, 2)),
            Err(BlobError::InvalidName { record: 7 })
        ));
    }
}
