//! fetch-assets CLI - manifest-driven build asset fetcher
//!
//! Usage:
//!   fetch-assets                       Fetch every artifact in the manifest
//!   fetch-assets kernel_firmware       Fetch only artifacts of that type
//!   fetch-assets mt7996_dsp bl31       Fetch only the named artifacts

use anyhow::{Context, Result};
use clap::Parser;
use fetch_assets::manifest::Manifest;
use fetch_assets::{FetchContext, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fetch-assets")]
#[command(about = "Fetch and verify external build artifacts from a manifest")]
#[command(version)]
struct Cli {
    /// Case-insensitive filters matched against artifact name or type
    filters: Vec<String>,

    /// Path to the assets manifest
    #[arg(short, long, default_value = "assets-manifest.json")]
    manifest: PathBuf,

    /// Directory artifact destinations are resolved against
    /// (defaults to the manifest's directory)
    #[arg(short, long)]
    root: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manifest = Manifest::load(&cli.manifest)
        .with_context(|| format!("cannot load manifest {}", cli.manifest.display()))?;

    let root = match cli.root {
        Some(root) => root,
        None => cli
            .manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let ctx = FetchContext::new(root);
    run(&ctx, &manifest, &cli.filters).context("asset acquisition failed")?;
    Ok(())
}
