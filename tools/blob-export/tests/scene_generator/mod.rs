//! Programmatic GLB generation for integration tests.
//!
//! The generated scene contains:
//! - `Crate`: indexed quad mesh (`CrateMesh`), translated and scaled
//! - `Ghost`: a single unindexed triangle (`GhostMesh`) with no normals or UVs
//! - `Lamp`: no mesh, parent of `Balloon`
//! - `Balloon`: a second placement of `CrateMesh`, under `Lamp`
//! - `Offstage`: a node with a mesh that the scene never references

mod binary_packing;

use gltf_json as json;
use json::validation::Checked::{self, Valid};
use std::collections::BTreeMap;

use binary_packing::BufferBuilder;

pub const CRATE_TRANSLATION: [f32; 3] = [1.0, 2.0, 3.0];
pub const CRATE_SCALE: [f32; 3] = [2.0, 2.0, 2.0];
pub const LAMP_TRANSLATION: [f32; 3] = [10.0, 0.0, 0.0];
pub const BALLOON_TRANSLATION: [f32; 3] = [0.0, 1.0, 0.0];
pub const GHOST_TRANSLATION: [f32; 3] = [0.0, 0.0, 5.0];

/// Unit quad in the XY plane
pub const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, 0.5, 0.0],
];
pub const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub const GHOST_POSITIONS: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// Generate the test scene as GLB bytes.
pub fn generate_scene_glb() -> Vec<u8> {
    let mut buffer = BufferBuilder::default();

    let quad_pos = buffer.push_f32(&QUAD_POSITIONS, true);
    let quad_nrm = buffer.push_f32(&[[0.0f32, 0.0, 1.0]; 4], false);
    let quad_uv = buffer.push_f32(&QUAD_UVS, false);
    let quad_idx = buffer.push_indices(&QUAD_INDICES);
    let ghost_pos = buffer.push_f32(&GHOST_POSITIONS, true);

    let mut quad_attributes = BTreeMap::new();
    quad_attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(quad_pos),
    );
    quad_attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(quad_nrm),
    );
    quad_attributes.insert(
        Valid(json::mesh::Semantic::TexCoords(0)),
        json::Index::new(quad_uv),
    );

    let mut ghost_attributes = BTreeMap::new();
    ghost_attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(ghost_pos),
    );

    let meshes = vec![
        mesh("CrateMesh", quad_attributes, Some(quad_idx)),
        mesh("GhostMesh", ghost_attributes, None),
    ];

    let nodes = vec![
        // 0
        json::Node {
            mesh: Some(json::Index::new(0)),
            translation: Some(CRATE_TRANSLATION),
            scale: Some(CRATE_SCALE),
            ..node("Crate")
        },
        // 1
        json::Node {
            mesh: Some(json::Index::new(1)),
            translation: Some(GHOST_TRANSLATION),
            ..node("Ghost")
        },
        // 2
        json::Node {
            children: Some(vec![json::Index::new(3)]),
            translation: Some(LAMP_TRANSLATION),
            ..node("Lamp")
        },
        // 3
        json::Node {
            mesh: Some(json::Index::new(0)),
            translation: Some(BALLOON_TRANSLATION),
            ..node("Balloon")
        },
        // 4: not reachable from the scene
        json::Node {
            mesh: Some(json::Index::new(0)),
            ..node("Offstage")
        },
    ];

    let scenes = vec![json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some("Level".to_string()),
        nodes: vec![
            json::Index::new(0),
            json::Index::new(1),
            json::Index::new(2),
        ],
    }];

    let buffers = vec![json::Buffer {
        byte_length: buffer.data.len().into(),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    }];

    let root = json::Root {
        accessors: buffer.accessors,
        animations: Vec::new(),
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some("blob-export-test".to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers,
        buffer_views: buffer.views,
        cameras: Vec::new(),
        extensions: Default::default(),
        extras: Default::default(),
        extensions_required: Vec::new(),
        extensions_used: Vec::new(),
        images: Vec::new(),
        materials: Vec::new(),
        meshes,
        nodes,
        samplers: Vec::new(),
        scene: Some(json::Index::new(0)),
        scenes,
        skins: Vec::new(),
        textures: Vec::new(),
    };

    let document = json::serialize::to_string(&root).expect("Failed to serialize JSON");
    into_glb(document.into_bytes(), buffer.data)
}

/// Frame a JSON document and its binary buffer as a GLB container.
fn into_glb(document: Vec<u8>, bin: Vec<u8>) -> Vec<u8> {
    // Chunk payloads are 4-byte aligned: JSON padded with spaces, BIN with zeros
    let chunks = [(*b"JSON", document, b' '), (*b"BIN\0", bin, 0u8)];
    let body_len: usize = chunks
        .iter()
        .map(|(_, data, _)| 8 + data.len().next_multiple_of(4))
        .sum();

    let mut glb = Vec::with_capacity(12 + body_len);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&((12 + body_len) as u32).to_le_bytes());

    for (kind, mut data, pad) in chunks {
        data.resize(data.len().next_multiple_of(4), pad);
        glb.extend_from_slice(&(data.len() as u32).to_le_bytes());
        glb.extend_from_slice(&kind);
        glb.extend_from_slice(&data);
    }
    glb
}

/// Write the test scene to `path`.
pub fn write_scene_glb(path: &std::path::Path) {
    std::fs::write(path, generate_scene_glb()).expect("Failed to write GLB");
}

fn node(name: &str) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

fn mesh(
    name: &str,
    attributes: BTreeMap<Checked<json::mesh::Semantic>, json::Index<json::Accessor>>,
    indices: Option<u32>,
) -> json::Mesh {
    json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some(name.to_string()),
        primitives: vec![json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: indices.map(json::Index::new),
            material: None,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        }],
        weights: None,
    }
}
