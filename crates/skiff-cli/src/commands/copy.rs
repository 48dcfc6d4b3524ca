//! `skiff copy` — Copy an image between local layouts.

use clap::Args;
use skiff_image::transport::{self, parse_image_name};

use crate::opts::{DestPrefix, GlobalOpts, ImageDestOpts, ImageOpts, SharedImageOpts, SrcPrefix};

/// Arguments for the `copy` command.
#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Authentication options shared by both ends.
    #[command(flatten)]
    pub shared: SharedImageOpts,

    /// Source image options (`--src-*` flags).
    #[command(flatten)]
    pub src: ImageOpts<SrcPrefix>,

    /// Destination image options (`--dest-*` flags).
    #[command(flatten)]
    pub dest: ImageDestOpts<DestPrefix>,

    /// Source image reference.
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Destination image reference.
    #[arg(value_name = "DESTINATION")]
    pub destination: String,
}

/// Executes the `copy` command.
///
/// # Errors
///
/// Returns an error if either reference is invalid, either option set
/// conflicts, or the transfer fails.
pub fn execute(global: &GlobalOpts, args: CopyArgs) -> anyhow::Result<()> {
    let src_ref = parse_image_name(&args.source)?;
    let dest_ref = parse_image_name(&args.destination)?;
    let src_sys = args.src.to_system_context(global, &args.shared)?;
    let dest_sys = args.dest.to_system_context(global, &args.shared)?;

    tracing::info!(from = %src_ref, to = %dest_ref, "copying image");
    let source = src_ref.new_image_source(&src_sys)?;
    transport::copy_image(&source, &dest_ref, &dest_sys)?;
    Ok(())
}
