//! Unified error types for the skiff workspace.
//!
//! Every fallible library operation returns [`SkiffError`]; the CLI binary
//! maps it through `anyhow` for user-facing formatting and exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum SkiffError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A registry credential string is malformed.
    #[error("invalid credentials: {message}")]
    Credentials {
        /// Description of the malformed credential.
        message: String,
    },

    /// Two options that exclude each other were both set.
    #[error("conflicting options: {message}")]
    ConflictingOptions {
        /// Description of the conflict.
        message: String,
    },

    /// A compression format name is not known to the algorithm registry.
    #[error("unknown compression format: {name}")]
    UnknownCompressionFormat {
        /// The unrecognized format name.
        name: String,
    },

    /// An image reference string could not be parsed.
    #[error("invalid image reference {reference:?}: {message}")]
    InvalidReference {
        /// The offending reference string.
        reference: String,
        /// Description of what is wrong with it.
        message: String,
    },

    /// The requested operation is not available for this transport.
    #[error("{operation} is not supported for the {transport} transport")]
    TransportUnsupported {
        /// Transport name (for example `docker`).
        transport: String,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// A manifest document fragment failed to parse as YAML.
    #[error("manifest parse error: {source}")]
    ManifestParse {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SkiffError>;
