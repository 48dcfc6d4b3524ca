//! Transport configuration for a single resolution or transfer operation.

use std::path::PathBuf;

use crate::compression::Algorithm;

/// Registry credentials attached to a [`SystemContext`].
///
/// `RegistryAuth::default()` (empty username and password) encodes explicit
/// anonymous access, which is distinct from leaving
/// [`SystemContext::registry_auth`] unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryAuth {
    /// Registry account name.
    pub username: String,
    /// Registry account password or token.
    pub password: String,
}

/// Configuration record controlling how an image operation talks to its
/// transport.
///
/// Built from CLI options once per image and consumed by the transport
/// layer; every builder call produces a fresh, independently mutable value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemContext {
    /// Directory containing registries.d lookaside configuration.
    pub registries_dir_path: Option<PathBuf>,
    /// Architecture to request instead of the host architecture.
    pub architecture_choice: Option<String>,
    /// Operating system to request instead of the host OS.
    pub os_choice: Option<String>,
    /// Directory with *.crt, *.cert, *.key files for registry TLS.
    pub docker_cert_path: Option<PathBuf>,
    /// Directory shared across OCI repositories for blob storage.
    pub oci_shared_blob_dir_path: Option<PathBuf>,
    /// Path to the registry authentication file.
    pub auth_file_path: Option<PathBuf>,
    /// Host to use for the `docker-daemon:` transport.
    pub docker_daemon_host: Option<String>,
    /// Certificate directory for the `docker-daemon:` transport.
    pub docker_daemon_cert_path: Option<PathBuf>,
    /// Path to a registries.conf file.
    pub registries_conf_path: Option<PathBuf>,
    /// Skip TLS verification when talking to a local daemon.
    pub docker_daemon_insecure_skip_tls_verify: bool,
    /// Skip TLS verification when talking to a registry.
    ///
    /// Tri-state: `None` leaves the transport default in effect.
    pub docker_insecure_skip_tls_verify: Option<bool>,
    /// Registry credentials; `Some(RegistryAuth::default())` forces
    /// anonymous access.
    pub registry_auth: Option<RegistryAuth>,
    /// Compress layers when writing to the `dir:` transport.
    pub dir_force_compress: bool,
    /// Accept uncompressed layers when writing to the `oci:` transport.
    pub oci_accept_uncompressed_layers: bool,
    /// Compression algorithm to use when writing layers.
    pub compression_format: Option<Algorithm>,
    /// Compression level, meaningful only alongside a format.
    pub compression_level: Option<i32>,
}
