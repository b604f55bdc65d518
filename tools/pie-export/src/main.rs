//! pie-export - PIE model export tool
//!
//! Converts scene manifests (TOML + OBJ meshes) into PIE text model files
//! for the engine.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use pie_export::manifest;

#[derive(Parser)]
#[command(name = "pie-export")]
#[command(about = "PIE model export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every root object declared in a manifest
    Build {
        /// Path to scene.toml manifest
        #[arg(default_value = "scene.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a manifest without writing any files
    Check {
        /// Path to scene.toml manifest
        #[arg(default_value = "scene.toml")]
        manifest: PathBuf,
    },

    /// Export a single root object by name
    Object {
        /// Object name as declared in the manifest
        name: String,

        /// Path to scene.toml manifest
        #[arg(default_value = "scene.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest: path,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building models from {:?}", path);
            }
            let config = manifest::load_manifest(&path)?;
            let written = manifest::build_all(&config, manifest_dir(&path), output.as_deref())?;
            tracing::info!("Exported {} model(s)", written.len());
        }

        Commands::Check { manifest: path } => {
            tracing::info!("Checking manifest {:?}", path);
            let config = manifest::load_manifest(&path)?;
            manifest::validate(&config, manifest_dir(&path))?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Object {
            name,
            manifest: path,
            output,
        } => {
            let config = manifest::load_manifest(&path)?;
            let written =
                manifest::export_object(&config, manifest_dir(&path), &name, output.as_deref())?;
            tracing::info!("Exported {:?}", written);
        }
    }

    Ok(())
}

/// Directory the manifest lives in; mesh and output paths resolve against
/// it.
fn manifest_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
