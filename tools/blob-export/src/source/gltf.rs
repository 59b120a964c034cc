//! glTF/GLB content source

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use blob_common::{Triangle, Vertex};
use glam::Mat4;
use gltf::mesh::Mode;
use hashbrown::HashMap;

use super::{world_dimensions, ContentSource, SourceObject, Transform};

/// Default normal when a primitive has none
const MISSING_NORMAL: [f32; 3] = [0.0, 0.0, 0.0];
/// Default texture coordinate when a primitive has no TEXCOORD_0
const MISSING_UV: [f32; 2] = [0.0, 0.0];

/// Content loaded from a glTF/GLB file.
///
/// Every node is an object. Only nodes reachable from the default scene (or the
/// first scene, if none is marked default) are placed; the rest can still be
/// requested for mesh export.
#[derive(Debug)]
pub struct GltfSource {
    path: PathBuf,
    objects: Vec<SourceObject>,
    /// Indices into `objects`, depth-first scene order
    scene: Vec<usize>,
    meshes: HashMap<String, Vec<Triangle>>,
}

impl GltfSource {
    pub fn open(path: &Path) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;

        // Mesh data, keyed by (deduplicated) mesh name
        let mut mesh_ids = Vec::with_capacity(document.meshes().len());
        let mut meshes = HashMap::new();
        for mesh in document.meshes() {
            let mut id = mesh
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("mesh.{:03}", mesh.index()));
            if meshes.contains_key(&id) {
                id = format!("{}.{:03}", id, mesh.index());
            }

            let triangles = read_triangles(&mesh, &buffers)
                .with_context(|| format!("Failed to read mesh '{}'", id))?;
            tracing::debug!("Loaded mesh '{}': {} triangles", id, triangles.len());

            meshes.insert(id.clone(), triangles);
            mesh_ids.push(id);
        }

        // World matrices for every node reachable from the exported scene
        let mut world: Vec<Option<Mat4>> = vec![None; document.nodes().len()];
        let mut scene = Vec::new();
        if let Some(root_scene) = document.default_scene().or_else(|| document.scenes().next()) {
            for node in root_scene.nodes() {
                visit_node(&node, Mat4::IDENTITY, &mut world, &mut scene);
            }
        }

        let objects = document
            .nodes()
            .map(|node| {
                let matrix = world[node.index()].unwrap_or_else(|| local_matrix(&node));
                let mesh = node.mesh().map(|m| mesh_ids[m.index()].clone());
                let dimensions = mesh
                    .as_ref()
                    .and_then(|id| meshes.get(id))
                    .map(|triangles| world_dimensions(triangles, matrix))
                    .unwrap_or_default();

                SourceObject {
                    name: node
                        .name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("node.{:03}", node.index())),
                    mesh,
                    transform: Transform::from_matrix(matrix),
                    dimensions,
                }
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            objects,
            scene,
            meshes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for GltfSource {
    fn object(&self, name: &str) -> Option<&SourceObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn geometry(&self, mesh: &str) -> Option<&[Triangle]> {
        self.meshes.get(mesh).map(Vec::as_slice)
    }

    fn scene_objects(&self) -> Vec<&SourceObject> {
        self.scene.iter().map(|&i| &self.objects[i]).collect()
    }
}

fn local_matrix(node: &gltf::Node) -> Mat4 {
    Mat4::from_cols_array_2d(&node.transform().matrix())
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    world: &mut [Option<Mat4>],
    scene: &mut Vec<usize>,
) {
    // Malformed files can list a node twice; the first path wins
    if world[node.index()].is_some() {
        return;
    }

    let matrix = parent * local_matrix(node);
    world[node.index()] = Some(matrix);
    scene.push(node.index());

    for child in node.children() {
        visit_node(&child, matrix, world, scene);
    }
}

/// Expand every triangle primitive of `mesh` into triangle soup.
fn read_triangles(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Vec<Triangle>> {
    let mut triangles = Vec::new();

    for primitive in mesh.primitives() {
        if !matches!(primitive.mode(), Mode::Triangles) {
            tracing::warn!(
                "Skipping primitive {} of mesh {:?}: mode {:?} is not a triangle list",
                primitive.index(),
                mesh.name(),
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        // Positions (required)
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("No positions in primitive")?
            .collect();

        // Normals (expected from the content pipeline)
        let normals: Option<Vec<[f32; 3]>> = match reader.read_normals() {
            Some(iter) => {
                let normals: Vec<[f32; 3]> = iter.collect();
                if normals.len() == positions.len() {
                    Some(normals)
                } else {
                    tracing::warn!(
                        "Mesh {:?} has mismatched normal count ({} vs {} vertices), ignoring normals",
                        mesh.name(),
                        normals.len(),
                        positions.len()
                    );
                    None
                }
            }
            None => {
                tracing::warn!("Mesh {:?} has no normals, writing zero normals", mesh.name());
                None
            }
        };

        // UVs (expected, like normals)
        let uvs: Option<Vec<[f32; 2]>> = match reader.read_tex_coords(0) {
            Some(iter) => {
                let uvs: Vec<[f32; 2]> = iter.into_f32().collect();
                if uvs.len() == positions.len() {
                    Some(uvs)
                } else {
                    tracing::warn!(
                        "Mesh {:?} has mismatched UV count ({} vs {} vertices), ignoring UVs",
                        mesh.name(),
                        uvs.len(),
                        positions.len()
                    );
                    None
                }
            }
            None => {
                tracing::warn!("Mesh {:?} has no TEXCOORD_0, writing zero UVs", mesh.name());
                None
            }
        };

        // Indices (optional) - non-indexed primitives are already soup
        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        if indices.len() % 3 != 0 {
            bail!(
                "Primitive {} has {} indices, not a whole number of triangles",
                primitive.index(),
                indices.len()
            );
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            bail!(
                "Index {} exceeds vertex count {} in primitive {}",
                bad,
                positions.len(),
                primitive.index()
            );
        }

        let vertex = |i: u32| {
            let i = i as usize;
            Vertex::new(
                positions[i],
                normals.as_ref().map(|n| n[i]).unwrap_or(MISSING_NORMAL),
                uvs.as_ref().map(|u| u[i]).unwrap_or(MISSING_UV),
            )
        };

        triangles.extend(
            indices
                .chunks_exact(3)
                .map(|tri| [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])]),
        );
    }

    Ok(triangles)
}
