//! Well-known names and default paths.

/// Annotation key carrying a comma-separated list of extra image references
/// on a Kubernetes resource.
pub const EXTRA_IMAGES_ANNOTATION: &str = "skopeo.io/extraimages";

/// Default location of the registry authentication file, shown in CLI help.
pub const DEFAULT_AUTH_FILE: &str = "${XDG_RUNTIME_DIR}/containers/auth.json";

/// Manifest file name inside a `dir:` image layout.
pub const DIR_MANIFEST_FILE: &str = "manifest.json";

/// Index file name inside an `oci:` image layout.
pub const OCI_INDEX_FILE: &str = "index.json";

/// OCI annotation naming the tag a manifest descriptor refers to.
pub const OCI_REF_NAME_ANNOTATION: &str = "org.opencontainers.image.ref.name";
