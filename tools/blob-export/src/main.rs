//! blob-export - chunked mesh and scene blob exporter
//!
//! Converts glTF/GLB content to `meshes.blob` (v3n3/str0/idx0) and
//! `scene.blob` (str0/scn0)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use blob_export::formats::write_blob_file;
use blob_export::{export_meshes, export_scene, inspect, manifest, GltfSource, SceneLayout};

#[derive(Parser)]
#[command(name = "blob-export")]
#[command(about = "Chunked mesh and scene blob exporter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build blobs from a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },

    /// Export the meshes of the named objects
    Meshes {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Object names, in export order
        #[arg(required = true)]
        objects: Vec<String>,

        /// Output blob
        #[arg(short, long, default_value = "meshes.blob")]
        output: PathBuf,
    },

    /// Export scene placements of the named objects' meshes
    Scene {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Exported object names, in export order
        #[arg(required = true)]
        objects: Vec<String>,

        /// Output blob
        #[arg(short, long, default_value = "scene.blob")]
        output: PathBuf,

        /// Write 60-byte records that include scale
        #[arg(long)]
        with_scale: bool,
    },

    /// Print the chunks and contents of a blob
    Inspect {
        /// Blob file
        blob: PathBuf,

        /// Decode scene records as 60-byte records
        #[arg(long)]
        with_scale: bool,
    },
}

fn layout(with_scale: bool) -> SceneLayout {
    if with_scale {
        SceneLayout::WithScale
    } else {
        SceneLayout::Compact
    }
}

fn open_source(input: &Path) -> Result<GltfSource> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "gltf" | "glb" => GltfSource::open(input),
        _ => anyhow::bail!("Unsupported source format: {:?} (use .gltf or .glb)", input),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building blobs from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let summary = manifest::build_all(&config, output.as_deref())?;
            if summary.skipped_instances > 0 {
                tracing::warn!(
                    "{} scene objects skipped (mesh not exported)",
                    summary.skipped_instances
                );
            }
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config, None)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Meshes {
            input,
            objects,
            output,
        } => {
            tracing::info!("Exporting meshes {:?} -> {:?}", input, output);
            let source = open_source(&input)?;
            let blob = export_meshes(&source, &objects)?;
            let bytes = write_blob_file(&output, |w| blob.write_to(w))?;
            tracing::info!("Wrote {} bytes", bytes);
        }

        Commands::Scene {
            input,
            objects,
            output,
            with_scale,
        } => {
            tracing::info!("Exporting scene {:?} -> {:?}", input, output);
            let source = open_source(&input)?;
            let export = export_scene(&source, &objects, layout(with_scale))?;
            let bytes = write_blob_file(&output, |w| export.blob.write_to(w))?;
            tracing::info!(
                "Wrote {} bytes ({} objects skipped)",
                bytes,
                export.skipped.len()
            );
        }

        Commands::Inspect { blob, with_scale } => {
            let report = inspect::inspect_blob(&blob, layout(with_scale))?;
            print!("{}", report);
        }
    }

    Ok(())
}
