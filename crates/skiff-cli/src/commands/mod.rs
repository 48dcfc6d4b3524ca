//! CLI command definitions and dispatch.

pub mod copy;
pub mod inspect;
pub mod list_images;

use clap::{Parser, Subcommand};

use crate::opts::GlobalOpts;

/// skiff — Work with container images and the manifests that reference them.
#[derive(Parser, Debug)]
#[command(name = "skiff", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show low-level information about an image.
    Inspect(inspect::InspectArgs),
    /// Copy an image between local layouts.
    Copy(copy::CopyArgs),
    /// List container images referenced by Kubernetes manifests.
    ListImages(list_images::ListImagesArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => inspect::execute(&cli.global, args),
        Command::Copy(args) => copy::execute(&cli.global, args),
        Command::ListImages(args) => list_images::execute(args),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;
    use clap::Parser;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn copy_parses_prefixed_flag_pairs() {
        let cli = Cli::try_parse_from([
            "skiff",
            "copy",
            "--src-creds",
            "alice:secret",
            "--dest-no-creds",
            "--dest-compress-format",
            "gzip",
            "dir:/a",
            "dir:/b",
        ])
        .unwrap();
        let Command::Copy(args) = cli.command else {
            panic!("expected copy");
        };
        assert_eq!(args.src.docker.creds.as_deref(), Some("alice:secret"));
        assert!(args.dest.image.docker.no_creds);
        assert_eq!(args.dest.compression_format.as_deref(), Some("gzip"));
        assert_eq!(args.source, "dir:/a");
        assert_eq!(args.destination, "dir:/b");
    }

    #[test]
    fn copy_accepts_prefixed_authfile_overrides() {
        let cli = Cli::try_parse_from([
            "skiff",
            "copy",
            "--authfile",
            "/shared.json",
            "--src-authfile",
            "/src.json",
            "dir:/a",
            "dir:/b",
        ])
        .unwrap();
        let Command::Copy(args) = cli.command else {
            panic!("expected copy");
        };
        assert_eq!(args.shared.auth_file.as_deref().unwrap().to_str(), Some("/shared.json"));
        assert_eq!(
            args.src.docker.auth_file.as_deref().unwrap().to_str(),
            Some("/src.json")
        );
        assert_eq!(args.dest.image.docker.auth_file, None);
    }

    #[test]
    fn tls_verify_is_tri_state() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["skiff", "inspect"];
            argv.extend_from_slice(extra);
            argv.push("dir:/a");
            Cli::try_parse_from(argv).unwrap()
        };

        let Command::Inspect(args) = parse(&[]).command else {
            panic!("expected inspect");
        };
        assert_eq!(args.image.docker.tls_verify, None);

        let Command::Inspect(args) = parse(&["--tls-verify"]).command else {
            panic!("expected inspect");
        };
        assert_eq!(args.image.docker.tls_verify, Some(true));

        let Command::Inspect(args) = parse(&["--tls-verify=false"]).command else {
            panic!("expected inspect");
        };
        assert_eq!(args.image.docker.tls_verify, Some(false));
    }

    #[test]
    fn deprecated_global_tls_verify_parses_before_subcommand() {
        let cli =
            Cli::try_parse_from(["skiff", "--tls-verify=false", "inspect", "dir:/a"]).unwrap();
        assert_eq!(cli.global.tls_verify, Some(false));
    }

    #[test]
    fn compress_level_parses_as_integer() {
        let cli = Cli::try_parse_from([
            "skiff",
            "copy",
            "--dest-compress-level",
            "11",
            "dir:/a",
            "dir:/b",
        ])
        .unwrap();
        let Command::Copy(args) = cli.command else {
            panic!("expected copy");
        };
        assert_eq!(args.dest.compression_level, Some(11));

        assert!(Cli::try_parse_from([
            "skiff",
            "copy",
            "--dest-compress-level",
            "fast",
            "dir:/a",
            "dir:/b",
        ])
        .is_err());
    }
}
