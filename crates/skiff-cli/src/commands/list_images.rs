//! `skiff list-images` — List container images referenced by Kubernetes manifests.

use anyhow::Context;
use clap::Args;

/// Arguments for the `list-images` command.
#[derive(Args, Debug)]
pub struct ListImagesArgs {
    /// Manifest files to scan; `-` reads from standard input.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,
}

/// Executes the `list-images` command.
///
/// # Errors
///
/// Returns an error if a file cannot be read or a manifest fails to parse.
pub fn execute(args: ListImagesArgs) -> anyhow::Result<()> {
    for file in &args.files {
        let text = if file == "-" {
            std::io::read_to_string(std::io::stdin())?
        } else {
            std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?
        };
        let images = skiff_manifest::images_from_manifests(&text)
            .with_context(|| format!("extracting images from {file}"))?;
        tracing::debug!(file, count = images.len(), "extracted images");
        for image in images {
            println!("{image}");
        }
    }
    Ok(())
}
