//! Scene exporter (placed objects -> `scene.blob`)
//!
//! The scene blob has its own name table. It is never shared with the mesh
//! blob, so a renderer can resolve scene names without loading `meshes.blob`.

use std::io::Write;

use blob_common::{ChunkError, NameRange, NameTable, SceneLayout, SceneRecord};
use hashbrown::HashMap;

use crate::error::ExportError;
use crate::formats::write_scene_blob;
use crate::source::{ContentSource, SourceObject};

/// An exported object and the mesh data it was exported from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedMesh {
    /// Name written to the mesh blob
    pub name: String,
    /// Mesh reference that scene objects are matched on
    pub mesh: String,
}

impl ExportedMesh {
    pub fn new(name: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: mesh.into(),
        }
    }
}

/// A scene blob ready to be framed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedSceneBlob {
    pub strings: NameTable,
    pub records: Vec<SceneRecord>,
    pub layout: SceneLayout,
}

impl EncodedSceneBlob {
    pub fn record_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.records.len() * self.layout.record_size());
        for record in &self.records {
            record.write_to(self.layout, &mut bytes);
        }
        bytes
    }

    /// Frame the blob as `str0`, `scn0`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), ChunkError> {
        write_scene_blob(w, self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ChunkError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Result of a scene export
#[derive(Debug)]
pub struct SceneExport {
    pub blob: EncodedSceneBlob,
    /// Objects dropped because their mesh was not exported (all recoverable)
    pub skipped: Vec<ExportError>,
}

/// Build a scene blob from the exported meshes and the scene's objects.
///
/// Every exported name goes into the scene's string table in export order.
/// When several exported objects share one mesh reference, the last one names
/// that mesh. Objects whose mesh is not among the exported set are dropped with
/// a warning and reported in [`SceneExport::skipped`].
pub fn build_scene_blob<'a, I>(
    exported: &[ExportedMesh],
    objects: I,
    layout: SceneLayout,
) -> SceneExport
where
    I: IntoIterator<Item = &'a SourceObject>,
{
    let mut strings = NameTable::new();
    let mut names: HashMap<&str, NameRange> = HashMap::with_capacity(exported.len());
    for entry in exported {
        let range = strings.push(&entry.name);
        names.insert(entry.mesh.as_str(), range);
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for object in objects {
        let range = object
            .mesh
            .as_deref()
            .and_then(|mesh| names.get(mesh).copied());

        let Some(name) = range else {
            let err = ExportError::UnresolvedSceneReference {
                object: object.name.clone(),
                mesh: object.mesh.clone(),
            };
            tracing::warn!("{}", err);
            skipped.push(err);
            continue;
        };

        let t = &object.transform;
        records.push(SceneRecord {
            name,
            translation: t.translation.to_array(),
            rotation: t.rotation.to_array(),
            scale: t.scale.to_array(),
            dimensions: object.dimensions.to_array(),
        });
    }

    tracing::info!(
        "Built scene blob: {} instances, {} skipped, {} name bytes",
        records.len(),
        skipped.len(),
        strings.len()
    );

    SceneExport {
        blob: EncodedSceneBlob {
            strings,
            records,
            layout,
        },
        skipped,
    }
}

/// Export the scene placements of `source`, matching objects against the
/// meshes of the named (exported) objects.
///
/// A name missing from the source is fatal ([`ExportError::MeshNotFound`]);
/// unmatched scene objects are not.
pub fn export_scene<S, N>(
    source: &S,
    names: &[N],
    layout: SceneLayout,
) -> Result<SceneExport, ExportError>
where
    S: ContentSource + ?Sized,
    N: AsRef<str>,
{
    let exported = names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            source
                .object(name)
                .and_then(|object| object.mesh.as_deref())
                .map(|mesh| ExportedMesh::new(name, mesh))
                .ok_or_else(|| ExportError::MeshNotFound(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(build_scene_blob(&exported, source.scene_objects(), layout))
}
