//! In-memory content source

use blob_common::Triangle;
use hashbrown::HashMap;

use super::{world_dimensions, ContentSource, SourceObject, Transform};

/// Content held directly in memory.
///
/// Every object added is placed in the scene, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    objects: Vec<SourceObject>,
    meshes: HashMap<String, Vec<Triangle>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a mesh data block.
    pub fn add_mesh(&mut self, mesh: impl Into<String>, triangles: Vec<Triangle>) -> &mut Self {
        self.meshes.insert(mesh.into(), triangles);
        self
    }

    pub fn add_object(&mut self, object: SourceObject) -> &mut Self {
        self.objects.push(object);
        self
    }

    /// Add a mesh and an object of the same name instancing it.
    ///
    /// Dimensions are computed from the geometry under `transform`.
    pub fn place(
        &mut self,
        name: &str,
        triangles: Vec<Triangle>,
        transform: Transform,
    ) -> &mut Self {
        let dimensions = world_dimensions(&triangles, transform.to_matrix());
        self.add_mesh(name, triangles);
        self.add_object(
            SourceObject::new(name, Some(name))
                .with_transform(transform)
                .with_dimensions(dimensions),
        )
    }
}

impl ContentSource for MemorySource {
    fn object(&self, name: &str) -> Option<&SourceObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn geometry(&self, mesh: &str) -> Option<&[Triangle]> {
        self.meshes.get(mesh).map(Vec::as_slice)
    }

    fn scene_objects(&self) -> Vec<&SourceObject> {
        self.objects.iter().collect()
    }
}
