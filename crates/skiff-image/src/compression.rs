//! Compression-algorithm name lookup.
//!
//! Only the name-to-identifier mapping lives here; the codecs themselves are
//! owned by whatever writes the layers.

use std::fmt;

use skiff_common::error::{Result, SkiffError};

/// Layer compression algorithms the destination transports understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// DEFLATE with a gzip wrapper.
    Gzip,
    /// Zstandard.
    Zstd,
    /// XZ / LZMA2.
    Xz,
    /// Bzip2.
    Bzip2,
}

impl Algorithm {
    /// Canonical lowercase name of the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
            Self::Xz => "xz",
            Self::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves a compression-format name to its [`Algorithm`].
///
/// Matching is exact and case-sensitive, mirroring the names accepted on
/// the wire.
///
/// # Errors
///
/// Returns `SkiffError::UnknownCompressionFormat` for unrecognized names.
pub fn algorithm_by_name(name: &str) -> Result<Algorithm> {
    match name {
        "gzip" => Ok(Algorithm::Gzip),
        "zstd" => Ok(Algorithm::Zstd),
        "xz" => Ok(Algorithm::Xz),
        "bzip2" => Ok(Algorithm::Bzip2),
        _ => Err(SkiffError::UnknownCompressionFormat {
            name: name.to_owned(),
        }),
    }
}
