//! Scene blob (`scene.blob`): `str0` + `scn0`
//!
//! The scene blob carries its own name table so it can be loaded without the
//! mesh blob. Names only match the mesh blob's by content.
//!
//! # Record layouts
//! ```text
//! compact (48 bytes)          with-scale (60 bytes)
//! 0x00: name_begin  u32       0x00: name_begin  u32
//! 0x04: name_end    u32       0x04: name_end    u32
//! 0x08: translation [f32; 3]  0x08: translation [f32; 3]
//! 0x14: rotation    [f32; 4]  0x14: rotation    [f32; 4] (x, y, z, w)
//! 0x24: dimensions  [f32; 3]  0x24: scale       [f32; 3]
//!                             0x30: dimensions  [f32; 3]
//! ```

use std::io::Read;

use super::chunk::{Chunk, TAG_SCENE, TAG_STRINGS, read_chunks};
use super::records::{NameRange, NameTable, read_f32, read_u32};
use super::take_unique;
use crate::error::{BlobError, ChunkError};

/// Width of a `scn0` record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SceneLayout {
    /// Scale is not stored; it only shows through the dimensions
    #[default]
    Compact,
    /// Scale stored between rotation and dimensions
    WithScale,
}

impl SceneLayout {
    pub const fn record_size(self) -> usize {
        match self {
            SceneLayout::Compact => 48,
            SceneLayout::WithScale => 60,
        }
    }
}

/// One placed mesh instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRecord {
    pub name: NameRange,
    pub translation: [f32; 3],
    /// Unit quaternion, x, y, z, w
    pub rotation: [f32; 4],
    /// Only persisted with [`SceneLayout::WithScale`]; decodes as `[1.0; 3]` otherwise
    pub scale: [f32; 3],
    /// World-space axis-aligned extent
    pub dimensions: [f32; 3],
}

impl SceneRecord {
    /// Append the record in the given layout.
    pub fn write_to(&self, layout: SceneLayout, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.name.begin.to_le_bytes());
        out.extend_from_slice(&self.name.end.to_le_bytes());
        extend_f32(out, &self.translation);
        extend_f32(out, &self.rotation);
        if layout == SceneLayout::WithScale {
            extend_f32(out, &self.scale);
        }
        extend_f32(out, &self.dimensions);
    }

    /// Read a record in the given layout. Returns `None` if `bytes` is too short.
    pub fn from_bytes(bytes: &[u8], layout: SceneLayout) -> Option<Self> {
        if bytes.len() < layout.record_size() {
            return None;
        }

        let vec3 = |offset: usize| {
            [
                read_f32(bytes, offset),
                read_f32(bytes, offset + 4),
                read_f32(bytes, offset + 8),
            ]
        };
        let (scale, dimensions) = match layout {
            SceneLayout::Compact => ([1.0; 3], vec3(36)),
            SceneLayout::WithScale => (vec3(36), vec3(48)),
        };

        Some(Self {
            name: NameRange::new(read_u32(bytes, 0), read_u32(bytes, 4)),
            translation: vec3(8),
            rotation: [
                read_f32(bytes, 20),
                read_f32(bytes, 24),
                read_f32(bytes, 28),
                read_f32(bytes, 32),
            ],
            scale,
            dimensions,
        })
    }
}

fn extend_f32(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_ne_bytes());
    }
}

/// Decoded scene blob
#[derive(Debug, Clone)]
pub struct SceneBlob {
    strings: NameTable,
    records: Vec<SceneRecord>,
    names: Vec<String>,
    layout: SceneLayout,
}

impl SceneBlob {
    /// Read and validate a scene blob whose records use `layout`.
    pub fn read<R: Read>(reader: R, layout: SceneLayout) -> Result<Self, BlobError> {
        Self::from_chunks(read_chunks(reader), layout)
    }

    /// Assemble a scene blob from already-framed chunks, in any order.
    pub fn from_chunks<I>(chunks: I, layout: SceneLayout) -> Result<Self, BlobError>
    where
        I: IntoIterator<Item = Result<Chunk, ChunkError>>,
    {
        let mut string_data = None;
        let mut scene_data = None;

        for chunk in chunks {
            let Chunk { tag, payload } = chunk?;
            match tag {
                TAG_STRINGS => take_unique(&mut string_data, tag, payload)?,
                TAG_SCENE => take_unique(&mut scene_data, tag, payload)?,
                _ => {}
            }
        }

        let string_data = string_data.ok_or(BlobError::MissingChunk(TAG_STRINGS))?;
        let strings = NameTable::from_bytes(string_data);
        let scene_data = scene_data.ok_or(BlobError::MissingChunk(TAG_SCENE))?;

        let record_size = layout.record_size();
        if scene_data.len() % record_size != 0 {
            return Err(BlobError::MalformedPayload {
                tag: TAG_SCENE,
                len: scene_data.len(),
                record_size,
            });
        }

        let records: Vec<SceneRecord> = scene_data
            .chunks_exact(record_size)
            .filter_map(|bytes| SceneRecord::from_bytes(bytes, layout))
            .collect();

        let names = records
            .iter()
            .enumerate()
            .map(|(i, record)| strings.resolve(i, record.name).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            strings,
            records,
            names,
            layout,
        })
    }

    /// Instances in file order, with their resolved mesh names.
    pub fn instances(&self) -> impl Iterator<Item = (&str, &SceneRecord)> + '_ {
        self.names.iter().map(String::as_str).zip(self.records.iter())
    }

    pub fn records(&self) -> &[SceneRecord] {
        &self.records
    }

    pub fn strings(&self) -> &NameTable {
        &self.strings
    }

    pub fn layout(&self) -> SceneLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
