//! Layered image option structures and their `SystemContext` builders.
//!
//! Flags compose hierarchically: [`SharedImageOpts`] holds the one
//! `--authfile` shared across a whole invocation, [`DockerImageOpts`] adds
//! registry-transport flags, [`ImageOpts`] adds directory and daemon flags,
//! and [`ImageDestOpts`] adds destination-only compression flags.
//!
//! The per-image sets are generic over a [`FlagPrefix`] marker so one
//! definition yields `--creds`, `--src-creds`, and `--dest-creds`; a command
//! that handles two images flattens one set per prefix and never registers
//! the same flag name twice.

use std::marker::PhantomData;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};
use skiff_common::constants::DEFAULT_AUTH_FILE;
use skiff_common::error::{Result, SkiffError};
use skiff_image::auth::registry_auth;
use skiff_image::compression::algorithm_by_name;
use skiff_image::context::{RegistryAuth, SystemContext};
use skiff_image::transport::{parse_image_name, Image, ImageSource};

/// Namespace applied to a set of per-image flags.
pub trait FlagPrefix: 'static {
    /// Literal prefix prepended to every flag name, for example `"src-"`.
    const PREFIX: &'static str;
}

/// No prefix; used by commands that handle a single image.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrefix;

impl FlagPrefix for NoPrefix {
    const PREFIX: &'static str = "";
}

/// `src-` prefix for the source image of a two-image command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrcPrefix;

impl FlagPrefix for SrcPrefix {
    const PREFIX: &'static str = "src-";
}

/// `dest-` prefix for the destination image of a two-image command.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestPrefix;

impl FlagPrefix for DestPrefix {
    const PREFIX: &'static str = "dest-";
}

/// Options affecting every command before the subcommand name.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalOpts {
    /// Enable debug output.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Directory containing registries.d lookaside configuration.
    #[arg(long = "registries-dir", global = true, value_name = "DIR")]
    pub registries_dir: Option<PathBuf>,

    /// Architecture to use instead of the host architecture when choosing images.
    #[arg(long = "override-arch", global = true, value_name = "ARCH")]
    pub override_arch: Option<String>,

    /// OS to use instead of the host OS when choosing images.
    #[arg(long = "override-os", global = true, value_name = "OS")]
    pub override_os: Option<String>,

    /// Path to a registries.conf file.
    #[arg(long = "registries-conf", global = true, value_name = "FILE")]
    pub registries_conf: Option<PathBuf>,

    /// Deprecated; use the per-image --tls-verify instead.
    #[arg(
        long = "tls-verify",
        hide = true,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub tls_verify: Option<bool>,
}

/// Image-related options that do not change across images.
///
/// Kept separate from [`GlobalOpts`] so `--authfile` stays usable after the
/// subcommand name.
#[derive(Args, Debug, Default, Clone)]
pub struct SharedImageOpts {
    /// Path of the authentication file. Default is ${XDG_RUNTIME_DIR}/containers/auth.json.
    #[arg(long = "authfile", value_name = "PATH")]
    pub auth_file: Option<PathBuf>,
}

/// Registry-transport options that may differ per image.
#[derive(Debug, Clone, Default)]
pub struct DockerImageOpts<P: FlagPrefix> {
    /// Prefixed override of the shared `--authfile`.
    pub auth_file: Option<PathBuf>,
    /// `USERNAME[:PASSWORD]` for accessing the registry.
    pub creds: Option<String>,
    /// Directory with *.crt, *.cert, *.key files for registry or daemon TLS.
    pub cert_dir: Option<PathBuf>,
    /// Require HTTPS and verify certificates; absent means transport default.
    pub tls_verify: Option<bool>,
    /// Access the registry anonymously.
    pub no_creds: bool,
    prefix: PhantomData<P>,
}

impl<P: FlagPrefix> FromArgMatches for DockerImageOpts<P> {
    fn from_arg_matches(matches: &ArgMatches) -> std::result::Result<Self, clap::Error> {
        let id = |suffix: &str| format!("{}{suffix}", P::PREFIX);
        // The unprefixed authfile belongs to SharedImageOpts.
        let auth_file = if P::PREFIX.is_empty() {
            None
        } else {
            matches.get_one::<PathBuf>(&id("authfile")).cloned()
        };
        Ok(Self {
            auth_file,
            creds: matches.get_one::<String>(&id("creds")).cloned(),
            cert_dir: matches.get_one::<PathBuf>(&id("cert-dir")).cloned(),
            tls_verify: matches.get_one::<bool>(&id("tls-verify")).copied(),
            no_creds: matches.get_flag(&id("no-creds")),
            prefix: PhantomData,
        })
    }

    fn update_from_arg_matches(
        &mut self,
        matches: &ArgMatches,
    ) -> std::result::Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl<P: FlagPrefix> Args for DockerImageOpts<P> {
    fn augment_args(cmd: Command) -> Command {
        let name = |suffix: &str| format!("{}{suffix}", P::PREFIX);
        let mut cmd = cmd;
        if !P::PREFIX.is_empty() {
            cmd = cmd.arg(
                Arg::new(name("authfile"))
                    .long(name("authfile"))
                    .value_name("PATH")
                    .value_parser(value_parser!(PathBuf))
                    .help(format!(
                        "Path of the authentication file for this image. Default is {DEFAULT_AUTH_FILE}"
                    )),
            );
        }
        cmd.arg(
            Arg::new(name("creds"))
                .long(name("creds"))
                .value_name("USERNAME[:PASSWORD]")
                .help("Use USERNAME[:PASSWORD] for accessing the registry"),
        )
        .arg(
            Arg::new(name("cert-dir"))
                .long(name("cert-dir"))
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Use certificates at PATH (*.crt, *.cert, *.key) to connect to the registry or daemon"),
        )
        .arg(
            Arg::new(name("tls-verify"))
                .long(name("tls-verify"))
                .value_name("BOOL")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(value_parser!(bool))
                .help("Require HTTPS and verify certificates when talking to the container registry or daemon (defaults to true)"),
        )
        .arg(
            Arg::new(name("no-creds"))
                .long(name("no-creds"))
                .action(ArgAction::SetTrue)
                .help("Access the registry anonymously"),
        )
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        Self::augment_args(cmd)
    }
}

/// Per-image options shared across subcommands; a copy-style command holds
/// one instance per prefix.
#[derive(Debug, Clone, Default)]
pub struct ImageOpts<P: FlagPrefix> {
    /// Registry-transport options.
    pub docker: DockerImageOpts<P>,
    /// Directory shared across OCI repositories for blob storage.
    pub shared_blob_dir: Option<PathBuf>,
    /// Host to use for the `docker-daemon:` transport.
    pub daemon_host: Option<String>,
}

impl<P: FlagPrefix> FromArgMatches for ImageOpts<P> {
    fn from_arg_matches(matches: &ArgMatches) -> std::result::Result<Self, clap::Error> {
        let id = |suffix: &str| format!("{}{suffix}", P::PREFIX);
        Ok(Self {
            docker: DockerImageOpts::from_arg_matches(matches)?,
            shared_blob_dir: matches.get_one::<PathBuf>(&id("shared-blob-dir")).cloned(),
            daemon_host: matches.get_one::<String>(&id("daemon-host")).cloned(),
        })
    }

    fn update_from_arg_matches(
        &mut self,
        matches: &ArgMatches,
    ) -> std::result::Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl<P: FlagPrefix> Args for ImageOpts<P> {
    fn augment_args(cmd: Command) -> Command {
        let name = |suffix: &str| format!("{}{suffix}", P::PREFIX);
        DockerImageOpts::<P>::augment_args(cmd)
            .arg(
                Arg::new(name("shared-blob-dir"))
                    .long(name("shared-blob-dir"))
                    .value_name("DIRECTORY")
                    .value_parser(value_parser!(PathBuf))
                    .help("DIRECTORY to use to share blobs across OCI repositories"),
            )
            .arg(
                Arg::new(name("daemon-host"))
                    .long(name("daemon-host"))
                    .value_name("HOST")
                    .help("Use docker daemon host at HOST (docker-daemon: only)"),
            )
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        Self::augment_args(cmd)
    }
}

impl<P: FlagPrefix> ImageOpts<P> {
    /// Builds a fresh [`SystemContext`] from these options.
    ///
    /// Every call returns a new instance, so callers may mutate the result
    /// freely. The per-image `--tls-verify` overrides the deprecated global
    /// one even when both are present.
    ///
    /// # Errors
    ///
    /// Returns `SkiffError::ConflictingOptions` if credentials and
    /// `--no-creds` are both set, and `SkiffError::Credentials` for a
    /// malformed credential string.
    pub fn to_system_context(
        &self,
        global: &GlobalOpts,
        shared: &SharedImageOpts,
    ) -> Result<SystemContext> {
        let mut sys = SystemContext {
            registries_dir_path: global.registries_dir.clone(),
            architecture_choice: global.override_arch.clone(),
            os_choice: global.override_os.clone(),
            docker_cert_path: self.docker.cert_dir.clone(),
            oci_shared_blob_dir_path: self.shared_blob_dir.clone(),
            auth_file_path: shared.auth_file.clone(),
            docker_daemon_host: self.daemon_host.clone(),
            docker_daemon_cert_path: self.docker.cert_dir.clone(),
            registries_conf_path: global.registries_conf.clone(),
            ..SystemContext::default()
        };
        if let Some(auth_file) = &self.docker.auth_file {
            sys.auth_file_path = Some(auth_file.clone());
        }
        if let Some(verify) = self.docker.tls_verify {
            sys.docker_daemon_insecure_skip_tls_verify = !verify;
        }
        // Deprecated global flag first, then the per-image flag so it wins
        // when both are present.
        if let Some(verify) = global.tls_verify {
            sys.docker_insecure_skip_tls_verify = Some(!verify);
        }
        if let Some(verify) = self.docker.tls_verify {
            sys.docker_insecure_skip_tls_verify = Some(!verify);
        }
        if self.docker.creds.is_some() && self.docker.no_creds {
            return Err(SkiffError::ConflictingOptions {
                message: "creds and no-creds cannot be specified at the same time".into(),
            });
        }
        if let Some(creds) = &self.docker.creds {
            sys.registry_auth = Some(registry_auth(creds)?);
        }
        if self.docker.no_creds {
            sys.registry_auth = Some(RegistryAuth::default());
        }
        Ok(sys)
    }
}

/// Superset of [`ImageOpts`] for image destinations.
#[derive(Debug, Clone, Default)]
pub struct ImageDestOpts<P: FlagPrefix> {
    /// The generic per-image options.
    pub image: ImageOpts<P>,
    /// Compress layers when saving via the `dir:` transport.
    pub compress: bool,
    /// Accept uncompressed layers when saving via the `oci:` transport.
    pub oci_accept_uncompressed_layers: bool,
    /// Compression format name, resolved at context-build time.
    pub compression_format: Option<String>,
    /// Compression level; only attached when explicitly set.
    pub compression_level: Option<i32>,
}

impl<P: FlagPrefix> FromArgMatches for ImageDestOpts<P> {
    fn from_arg_matches(matches: &ArgMatches) -> std::result::Result<Self, clap::Error> {
        let id = |suffix: &str| format!("{}{suffix}", P::PREFIX);
        Ok(Self {
            image: ImageOpts::from_arg_matches(matches)?,
            compress: matches.get_flag(&id("compress")),
            oci_accept_uncompressed_layers: matches
                .get_flag(&id("oci-accept-uncompressed-layers")),
            compression_format: matches.get_one::<String>(&id("compress-format")).cloned(),
            compression_level: matches.get_one::<i32>(&id("compress-level")).copied(),
        })
    }

    fn update_from_arg_matches(
        &mut self,
        matches: &ArgMatches,
    ) -> std::result::Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl<P: FlagPrefix> Args for ImageDestOpts<P> {
    fn augment_args(cmd: Command) -> Command {
        let name = |suffix: &str| format!("{}{suffix}", P::PREFIX);
        ImageOpts::<P>::augment_args(cmd)
            .arg(
                Arg::new(name("compress"))
                    .long(name("compress"))
                    .action(ArgAction::SetTrue)
                    .help("Compress tarball image layers when saving to a directory using the 'dir' transport (default is same compression type as source)"),
            )
            .arg(
                Arg::new(name("oci-accept-uncompressed-layers"))
                    .long(name("oci-accept-uncompressed-layers"))
                    .action(ArgAction::SetTrue)
                    .help("Allow uncompressed image layers when saving to an OCI image using the 'oci' transport (default is to compress things that aren't compressed)"),
            )
            .arg(
                Arg::new(name("compress-format"))
                    .long(name("compress-format"))
                    .value_name("FORMAT")
                    .help("FORMAT to use for the compression"),
            )
            .arg(
                Arg::new(name("compress-level"))
                    .long(name("compress-level"))
                    .value_name("LEVEL")
                    .value_parser(value_parser!(i32))
                    .help("LEVEL to use for the compression"),
            )
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        Self::augment_args(cmd)
    }
}

impl<P: FlagPrefix> ImageDestOpts<P> {
    /// Builds a fresh [`SystemContext`], adding destination-only compression
    /// settings on top of [`ImageOpts::to_system_context`].
    ///
    /// # Errors
    ///
    /// Returns the parent builder's errors, plus
    /// `SkiffError::UnknownCompressionFormat` for an unrecognized format
    /// name.
    pub fn to_system_context(
        &self,
        global: &GlobalOpts,
        shared: &SharedImageOpts,
    ) -> Result<SystemContext> {
        let mut sys = self.image.to_system_context(global, shared)?;
        sys.dir_force_compress = self.compress;
        sys.oci_accept_uncompressed_layers = self.oci_accept_uncompressed_layers;
        if let Some(format) = &self.compression_format {
            sys.compression_format = Some(algorithm_by_name(format)?);
        }
        sys.compression_level = self.compression_level;
        Ok(sys)
    }
}

/// Resolves an image URL-like string into an opened [`Image`].
///
/// # Errors
///
/// Returns reference-parsing, context-building, or transport errors.
pub fn parse_image<P: FlagPrefix>(
    global: &GlobalOpts,
    shared: &SharedImageOpts,
    opts: &ImageOpts<P>,
    name: &str,
) -> Result<Image> {
    let reference = parse_image_name(name)?;
    let sys = opts.to_system_context(global, shared)?;
    reference.new_image(&sys)
}

/// Resolves an image URL-like string into an opened [`ImageSource`].
///
/// # Errors
///
/// Returns reference-parsing, context-building, or transport errors.
pub fn parse_image_source<P: FlagPrefix>(
    global: &GlobalOpts,
    shared: &SharedImageOpts,
    opts: &ImageOpts<P>,
    name: &str,
) -> Result<ImageSource> {
    let reference = parse_image_name(name)?;
    let sys = opts.to_system_context(global, shared)?;
    reference.new_image_source(&sys)
}
