//! Content sources: where named geometry and object placements come from
//!
//! The exporters never touch authoring-tool state. A source hands them
//! pre-triangulated, pre-normaled triangle soup per mesh and a decomposed
//! transform per object.

mod gltf;
mod memory;

pub use self::gltf::GltfSource;
pub use memory::MemorySource;

use blob_common::Triangle;
use glam::{Mat4, Quat, Vec3};

/// Decomposed object transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Not necessarily uniform
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Decompose an affine world matrix.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A named object in the authored scene
#[derive(Debug, Clone, PartialEq)]
pub struct SourceObject {
    /// Object name; this is the name written to the blobs
    pub name: String,
    /// Mesh data the object instances, if any (lights, cameras and helpers have none)
    pub mesh: Option<String>,
    pub transform: Transform,
    /// World-space axis-aligned extent of the object
    pub dimensions: Vec3,
}

impl SourceObject {
    pub fn new(name: impl Into<String>, mesh: Option<&str>) -> Self {
        Self {
            name: name.into(),
            mesh: mesh.map(str::to_string),
            transform: Transform::IDENTITY,
            dimensions: Vec3::ZERO,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_dimensions(mut self, dimensions: Vec3) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// Read-only access to authored content.
pub trait ContentSource {
    /// Look up any object by name, whether or not it is placed in the scene.
    fn object(&self, name: &str) -> Option<&SourceObject>;

    /// Triangle soup of a mesh data block.
    fn geometry(&self, mesh: &str) -> Option<&[Triangle]>;

    /// Objects placed in the exported scene, in source order.
    fn scene_objects(&self) -> Vec<&SourceObject>;

    /// Resolve an object name to its mesh reference and geometry.
    fn object_geometry(&self, name: &str) -> Option<(&str, &[Triangle])> {
        let mesh = self.object(name)?.mesh.as_deref()?;
        Some((mesh, self.geometry(mesh)?))
    }
}

/// World-space AABB extent of `triangles` under `matrix`.
pub fn world_dimensions(triangles: &[Triangle], matrix: Mat4) -> Vec3 {
    let mut positions = triangles
        .iter()
        .flatten()
        .map(|v| Vec3::from_array(v.position));

    let Some(first) = positions.next() else {
        return Vec3::ZERO;
    };
    let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

    // Transform the local box corners; rotation can grow the world box
    let corners = (0..8).map(|i| {
        let corner = Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        );
        matrix.transform_point3(corner)
    });
    let (world_min, world_max) = corners.fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(p), hi.max(p)),
    );

    world_max - world_min
}
