//! `skiff inspect` — Show low-level information about an image.

use std::io::Write;

use clap::Args;

use crate::opts::{self, GlobalOpts, ImageOpts, NoPrefix, SharedImageOpts};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Authentication options shared across the invocation.
    #[command(flatten)]
    pub shared: SharedImageOpts,

    /// Per-image transport options.
    #[command(flatten)]
    pub image: ImageOpts<NoPrefix>,

    /// Output the raw manifest instead of a summary.
    #[arg(long)]
    pub raw: bool,

    /// Image reference, for example `docker://busybox` or `dir:/path/to/layout`.
    #[arg(value_name = "IMAGE")]
    pub name: String,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if the reference is invalid, the options conflict, or
/// the image cannot be opened.
pub fn execute(global: &GlobalOpts, args: InspectArgs) -> anyhow::Result<()> {
    tracing::debug!(image = args.name, "inspecting image");
    let image = opts::parse_image(global, &args.shared, &args.image, &args.name)?;

    if args.raw {
        std::io::stdout().write_all(image.manifest())?;
        return Ok(());
    }
    println!("Name:   {}", image.reference());
    println!("Digest: {}", image.digest());
    println!("Size:   {}", image.size());
    Ok(())
}
