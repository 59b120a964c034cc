//! assets.toml manifest parsing and the full build
//!
//! ```toml
//! [source]
//! path = "robot.glb"
//!
//! [meshes]
//! output = "dist/meshes.blob"
//! objects = ["Crate", "Balloon1"]
//!
//! [scene]
//! output = "dist/scene.blob"
//! layout = "compact"
//! ```

use anyhow::{bail, Context, Result};
use blob_common::SceneLayout;
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::formats::write_blob_file;
use crate::mesh::export_meshes;
use crate::scene::export_scene;
use crate::source::GltfSource;

/// assets.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct ExportManifest {
    pub source: SourceSection,
    pub meshes: MeshesSection,
    /// No scene blob is written without this section
    #[serde(default)]
    pub scene: Option<SceneSection>,

    /// Directory relative paths resolve against (the manifest's directory)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Content source section
#[derive(Debug, Deserialize)]
pub struct SourceSection {
    /// glTF/GLB file holding the authored content
    pub path: PathBuf,
}

/// Mesh blob section
#[derive(Debug, Deserialize)]
pub struct MeshesSection {
    #[serde(default = "default_mesh_output")]
    pub output: PathBuf,
    /// Names of the objects whose meshes to write (not the mesh names)
    pub objects: Vec<String>,
}

/// Scene blob section
#[derive(Debug, Deserialize)]
pub struct SceneSection {
    #[serde(default = "default_scene_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Scene record layout as spelled in the manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutConfig {
    /// 48-byte records, no scale
    #[default]
    Compact,
    /// 60-byte records with scale
    WithScale,
}

impl From<LayoutConfig> for SceneLayout {
    fn from(value: LayoutConfig) -> Self {
        match value {
            LayoutConfig::Compact => SceneLayout::Compact,
            LayoutConfig::WithScale => SceneLayout::WithScale,
        }
    }
}

fn default_mesh_output() -> PathBuf {
    PathBuf::from("meshes.blob")
}

fn default_scene_output() -> PathBuf {
    PathBuf::from("scene.blob")
}

impl ExportManifest {
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.source.path)
    }

    /// Mesh blob path, optionally redirected into `output_dir`
    pub fn mesh_output(&self, output_dir: Option<&Path>) -> PathBuf {
        self.resolve_output(&self.meshes.output, output_dir)
    }

    /// Scene blob path, if a scene is configured
    pub fn scene_output(&self, output_dir: Option<&Path>) -> Option<PathBuf> {
        self.scene
            .as_ref()
            .map(|scene| self.resolve_output(&scene.output, output_dir))
    }

    fn resolve_output(&self, output: &Path, output_dir: Option<&Path>) -> PathBuf {
        match (output_dir, output.file_name()) {
            (Some(dir), Some(file_name)) => dir.join(file_name),
            _ => self.base_dir.join(output),
        }
    }
}

/// Parse a manifest from TOML text, resolving relative paths against `base_dir`.
pub fn parse_manifest(text: &str, base_dir: &Path) -> Result<ExportManifest> {
    let mut manifest: ExportManifest = toml::from_str(text).context("Failed to parse manifest")?;
    manifest.base_dir = base_dir.to_path_buf();
    Ok(manifest)
}

/// Load a manifest file.
pub fn load_manifest(path: &Path) -> Result<ExportManifest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_manifest(&text, base_dir).with_context(|| format!("Invalid manifest: {:?}", path))
}

/// Validate a manifest without building anything.
///
/// Output collisions are checked on the paths a build with `output_dir` would
/// actually write.
pub fn validate(manifest: &ExportManifest, output_dir: Option<&Path>) -> Result<()> {
    if manifest.meshes.objects.is_empty() {
        bail!("[meshes] objects is empty; nothing to export");
    }

    let mut seen = HashSet::new();
    for name in &manifest.meshes.objects {
        if name.is_empty() {
            bail!("[meshes] objects contains an empty name");
        }
        if !seen.insert(name.as_str()) {
            tracing::warn!("Object '{}' is listed more than once", name);
        }
    }

    if let Some(scene_output) = manifest.scene_output(output_dir) {
        if scene_output == manifest.mesh_output(output_dir) {
            bail!(
                "Mesh and scene blobs would both be written to {:?}",
                scene_output
            );
        }
    }

    let source = manifest.source_path();
    if !source.is_file() {
        bail!("Source file not found: {:?}", source);
    }
    match source
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("gltf") | Some("glb") => {}
        _ => bail!(
            "Unsupported source format: {:?} (use .gltf or .glb)",
            source
        ),
    }

    Ok(())
}

/// Sizes of what a build wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub mesh_bytes: u64,
    pub scene_bytes: Option<u64>,
    pub skipped_instances: usize,
}

/// Build every blob the manifest configures.
///
/// The mesh pass runs to completion before the scene pass starts. The scene
/// pass re-opens the source, so it never sees state left by the mesh pass.
pub fn build_all(manifest: &ExportManifest, output_dir: Option<&Path>) -> Result<BuildSummary> {
    validate(manifest, output_dir)?;

    let source_path = manifest.source_path();
    let objects = manifest.meshes.objects.as_slice();

    let mesh_output = manifest.mesh_output(output_dir);
    let source = GltfSource::open(&source_path)?;
    let meshes = export_meshes(&source, objects)?;
    drop(source);
    let mesh_bytes = write_blob_file(&mesh_output, |w| meshes.write_to(w))?;
    tracing::info!("Wrote {} bytes to {:?}", mesh_bytes, mesh_output);

    let mut summary = BuildSummary {
        mesh_bytes,
        ..Default::default()
    };

    if let (Some(scene), Some(scene_output)) = (&manifest.scene, manifest.scene_output(output_dir))
    {
        // Re-open fresh for the scene pass
        let source = GltfSource::open(&source_path)?;
        let export = export_scene(&source, objects, scene.layout.into())?;
        let scene_bytes = write_blob_file(&scene_output, |w| export.blob.write_to(w))?;
        tracing::info!("Wrote {} bytes to {:?}", scene_bytes, scene_output);

        summary.scene_bytes = Some(scene_bytes);
        summary.skipped_instances = export.skipped.len();
    }

    Ok(summary)
}
