//! Image-reference parsing and local layout access.
//!
//! A reference string is `transport:name`, for example
//! `docker://quay.io/example/image:tag` or `dir:/path/to/layout`. The local
//! transports (`dir:`, `oci:`) can be opened directly; the network
//! transports parse but report [`SkiffError::TransportUnsupported`] when
//! opened, since registry and daemon protocols live outside this workspace.

use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha2::{Digest, Sha256};
use skiff_common::constants::{DIR_MANIFEST_FILE, OCI_INDEX_FILE, OCI_REF_NAME_ANNOTATION};
use skiff_common::error::{Result, SkiffError};

use crate::context::SystemContext;

/// Identifier scheme locating a container image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// A remote Docker/OCI registry (`docker://`).
    Docker,
    /// A local Docker daemon (`docker-daemon:`).
    DockerDaemon,
    /// A local directory layout (`dir:`).
    Dir,
    /// A local OCI image layout (`oci:`), optionally `path:tag`.
    Oci,
}

impl Transport {
    /// Short transport name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::DockerDaemon => "docker-daemon",
            Self::Dir => "dir",
            Self::Oci => "oci",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docker => f.write_str("docker://"),
            Self::DockerDaemon => f.write_str("docker-daemon:"),
            Self::Dir => f.write_str("dir:"),
            Self::Oci => f.write_str("oci:"),
        }
    }
}

/// A parsed image reference: transport plus transport-specific name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// The scheme locating the image.
    pub transport: Transport,
    /// The image name; format depends on the transport.
    pub name: String,
}

impl ImageReference {
    /// Opens this reference as an image source.
    ///
    /// # Errors
    ///
    /// Returns `SkiffError::TransportUnsupported` for network transports and
    /// I/O or layout errors for local ones.
    pub fn new_image_source(&self, sys: &SystemContext) -> Result<ImageSource> {
        match self.transport {
            Transport::Dir => self.open_dir(),
            Transport::Oci => self.open_oci(sys),
            Transport::Docker | Transport::DockerDaemon => {
                Err(SkiffError::TransportUnsupported {
                    transport: self.transport.name().to_owned(),
                    operation: "opening an image source",
                })
            }
        }
    }

    /// Opens this reference as an image, computing its manifest digest.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ImageReference::new_image_source`].
    pub fn new_image(&self, sys: &SystemContext) -> Result<Image> {
        let source = self.new_image_source(sys)?;
        Ok(Image::from_source(source))
    }

    fn open_dir(&self) -> Result<ImageSource> {
        let layout_dir = PathBuf::from(&self.name);
        let manifest_path = layout_dir.join(DIR_MANIFEST_FILE);
        let manifest = read_file(&manifest_path)?;
        tracing::debug!(path = %layout_dir.display(), "opened dir: image source");
        Ok(ImageSource {
            reference: self.clone(),
            layout_dir,
            manifest,
        })
    }

    fn open_oci(&self, sys: &SystemContext) -> Result<ImageSource> {
        let (dir, tag) = match self.name.split_once(':') {
            Some((dir, tag)) => (dir, Some(tag)),
            None => (self.name.as_str(), None),
        };
        let layout_dir = PathBuf::from(dir);
        let raw = read_file(&layout_dir.join(OCI_INDEX_FILE))?;
        let index: serde_json::Value = serde_json::from_slice(&raw)?;
        let digest = self.descriptor_digest(&index, tag)?;

        let Some((algorithm, hex)) = digest.split_once(':') else {
            return Err(self.invalid(format!("malformed digest {digest:?} in image index")));
        };
        // With a shared blob directory the per-layout blobs/ level is absent.
        let blob_path = sys.oci_shared_blob_dir_path.as_ref().map_or_else(
            || layout_dir.join("blobs").join(algorithm).join(hex),
            |shared| shared.join(algorithm).join(hex),
        );
        let manifest = read_file(&blob_path)?;
        tracing::debug!(path = %layout_dir.display(), digest, "opened oci: image source");
        Ok(ImageSource {
            reference: self.clone(),
            layout_dir,
            manifest,
        })
    }

    fn descriptor_digest<'a>(
        &self,
        index: &'a serde_json::Value,
        tag: Option<&str>,
    ) -> Result<&'a str> {
        let Some(manifests) = index.get("manifests").and_then(|m| m.as_array()) else {
            return Err(self.invalid("image index has no manifests list".into()));
        };
        let descriptor = match tag {
            Some(tag) => manifests
                .iter()
                .find(|descriptor| {
                    descriptor
                        .get("annotations")
                        .and_then(|a| a.get(OCI_REF_NAME_ANNOTATION))
                        .and_then(|v| v.as_str())
                        == Some(tag)
                })
                .ok_or_else(|| self.invalid(format!("no manifest tagged {tag:?} in image index")))?,
            None => manifests
                .first()
                .ok_or_else(|| self.invalid("image index is empty".into()))?,
        };
        descriptor
            .get("digest")
            .and_then(|d| d.as_str())
            .ok_or_else(|| self.invalid("manifest descriptor has no digest".into()))
    }

    fn invalid(&self, message: String) -> SkiffError {
        SkiffError::InvalidReference {
            reference: self.to_string(),
            message,
        }
    }
}

impl FromStr for ImageReference {
    type Err = SkiffError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = |message: String| SkiffError::InvalidReference {
            reference: value.to_owned(),
            message,
        };
        let Some((transport_name, rest)) = value.split_once(':') else {
            return Err(invalid(
                "no transport prefix; expected docker://, docker-daemon:, dir:, or oci:".into(),
            ));
        };
        let (transport, name) = match transport_name {
            "docker" => {
                let Some(name) = rest.strip_prefix("//") else {
                    return Err(invalid("docker references must start with docker://".into()));
                };
                (Transport::Docker, name)
            }
            "docker-daemon" => (Transport::DockerDaemon, rest),
            "dir" => (Transport::Dir, rest),
            "oci" => (Transport::Oci, rest),
            other => return Err(invalid(format!("unknown transport {other:?}"))),
        };
        if name.is_empty() {
            return Err(invalid("empty image name".into()));
        }
        Ok(Self {
            transport,
            name: name.to_owned(),
        })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.transport, self.name)
    }
}

/// Parses an image URL-like string into an [`ImageReference`].
///
/// # Errors
///
/// Returns `SkiffError::InvalidReference` for unknown transports, malformed
/// `docker://` prefixes, and empty names.
pub fn parse_image_name(name: &str) -> Result<ImageReference> {
    name.parse()
}

/// An opened image source: the reference plus its raw manifest bytes.
#[derive(Debug, Clone)]
pub struct ImageSource {
    reference: ImageReference,
    layout_dir: PathBuf,
    manifest: Vec<u8>,
}

impl ImageSource {
    /// The reference this source was opened from.
    #[must_use]
    pub fn reference(&self) -> &ImageReference {
        &self.reference
    }

    /// The local directory backing this source.
    #[must_use]
    pub fn layout_dir(&self) -> &Path {
        &self.layout_dir
    }

    /// The raw manifest bytes.
    #[must_use]
    pub fn manifest(&self) -> &[u8] {
        &self.manifest
    }
}

/// An opened image: a source plus its computed manifest digest.
#[derive(Debug, Clone)]
pub struct Image {
    source: ImageSource,
    digest: String,
}

impl Image {
    fn from_source(source: ImageSource) -> Self {
        let digest = sha256_digest(source.manifest());
        Self { source, digest }
    }

    /// The reference this image was opened from.
    #[must_use]
    pub fn reference(&self) -> &ImageReference {
        self.source.reference()
    }

    /// The raw manifest bytes.
    #[must_use]
    pub fn manifest(&self) -> &[u8] {
        self.source.manifest()
    }

    /// The `sha256:`-prefixed digest of the manifest.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The manifest size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.source.manifest().len() as u64
    }
}

/// Copies an opened local image source to a local destination reference.
///
/// Blobs are copied verbatim; recompression is owned by the transports that
/// write layers, not by this fragment.
///
/// # Errors
///
/// Returns `SkiffError::TransportUnsupported` unless both ends use the
/// `dir:` transport, and I/O errors if the copy fails.
pub fn copy_image(
    source: &ImageSource,
    destination: &ImageReference,
    dest_sys: &SystemContext,
) -> Result<()> {
    if source.reference().transport != Transport::Dir || destination.transport != Transport::Dir {
        let blocking = if source.reference().transport == Transport::Dir {
            destination.transport
        } else {
            source.reference().transport
        };
        return Err(SkiffError::TransportUnsupported {
            transport: blocking.name().to_owned(),
            operation: "copying",
        });
    }
    if dest_sys.dir_force_compress || dest_sys.compression_format.is_some() {
        tracing::debug!("layer recompression is delegated; copying blobs verbatim");
    }

    let dest_dir = PathBuf::from(&destination.name);
    fs::create_dir_all(&dest_dir).map_err(|source| SkiffError::Io {
        path: dest_dir.clone(),
        source,
    })?;
    let entries = fs::read_dir(source.layout_dir()).map_err(|e| SkiffError::Io {
        path: source.layout_dir().to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| SkiffError::Io {
            path: source.layout_dir().to_path_buf(),
            source: e,
        })?;
        let from = entry.path();
        if !from.is_file() {
            continue;
        }
        let to = dest_dir.join(entry.file_name());
        let _ = fs::copy(&from, &to).map_err(|e| SkiffError::Io { path: to, source: e })?;
    }
    tracing::info!(
        from = %source.reference(),
        to = %destination,
        "copied image layout"
    );
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| SkiffError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn sha256_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(7 + 2 * digest.len());
    out.push_str("sha256:");
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_references() {
        let cases: &[(&str, Transport, &str)] = &[
            (
                "docker://quay.io/example/image:tag",
                Transport::Docker,
                "quay.io/example/image:tag",
            ),
            (
                "docker-daemon:myimage:latest",
                Transport::DockerDaemon,
                "myimage:latest",
            ),
            ("dir:/some/dir", Transport::Dir, "/some/dir"),
            ("oci:/layout:v1", Transport::Oci, "/layout:v1"),
        ];
        for (input, transport, name) in cases {
            let reference: ImageReference = input.parse().expect(input);
            assert_eq!(reference.transport, *transport, "transport for {input}");
            assert_eq!(reference.name, *name, "name for {input}");
        }
    }

    #[test]
    fn parse_invalid_references() {
        let cases: &[&str] = &[
            "",
            "nocolon",
            "docker:missing-slashes",
            "docker://",
            "dir:",
            "ftp:/somewhere",
        ];
        for input in cases {
            assert!(
                parse_image_name(input).is_err(),
                "should reject: {input:?}"
            );
        }
    }

    #[test]
    fn references_round_trip_through_display() {
        for input in [
            "docker://quay.io/example/image",
            "docker-daemon:myimage:latest",
            "dir:/some/dir",
            "oci:/layout:v1",
        ] {
            let reference: ImageReference = input.parse().expect(input);
            assert_eq!(reference.to_string(), input);
        }
    }

    #[test]
    fn sha256_digest_matches_known_vector() {
        assert_eq!(
            sha256_digest(b"hello"),
            "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn dir_source_reads_manifest() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        std::fs::write(dir.path().join("manifest.json"), b"{\"layers\":[]}")
            .expect("failed to write");

        let reference = parse_image_name(&format!("dir:{}", dir.path().display()))
            .expect("parse failed");
        let source = reference
            .new_image_source(&SystemContext::default())
            .expect("open failed");
        assert_eq!(source.manifest(), b"{\"layers\":[]}");
    }

    #[test]
    fn dir_image_computes_digest_and_size() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        std::fs::write(dir.path().join("manifest.json"), b"hello").expect("failed to write");

        let reference = parse_image_name(&format!("dir:{}", dir.path().display()))
            .expect("parse failed");
        let image = reference
            .new_image(&SystemContext::default())
            .expect("open failed");
        assert_eq!(image.size(), 5);
        assert_eq!(
            image.digest(),
            "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn dir_source_missing_manifest_is_error() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let reference = parse_image_name(&format!("dir:{}", dir.path().display()))
            .expect("parse failed");
        assert!(reference.new_image_source(&SystemContext::default()).is_err());
    }

    fn write_oci_layout(root: &Path, tag: Option<&str>, manifest: &[u8]) -> String {
        let digest = sha256_digest(manifest);
        let (algorithm, hex) = digest.split_once(':').expect("digest format");
        let blob_dir = root.join("blobs").join(algorithm);
        std::fs::create_dir_all(&blob_dir).expect("failed to create blob dir");
        std::fs::write(blob_dir.join(hex), manifest).expect("failed to write blob");

        let mut descriptor = serde_json::json!({
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "digest": digest,
            "size": manifest.len(),
        });
        if let Some(tag) = tag {
            descriptor["annotations"] =
                serde_json::json!({ "org.opencontainers.image.ref.name": tag });
        }
        let index = serde_json::json!({ "schemaVersion": 2, "manifests": [descriptor] });
        std::fs::write(root.join("index.json"), index.to_string()).expect("failed to write index");
        digest
    }

    #[test]
    fn oci_source_resolves_first_manifest_without_tag() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let _ = write_oci_layout(dir.path(), None, b"oci-manifest");

        let reference = parse_image_name(&format!("oci:{}", dir.path().display()))
            .expect("parse failed");
        let source = reference
            .new_image_source(&SystemContext::default())
            .expect("open failed");
        assert_eq!(source.manifest(), b"oci-manifest");
    }

    #[test]
    fn oci_source_resolves_by_tag() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let _ = write_oci_layout(dir.path(), Some("v1"), b"tagged-manifest");

        let reference = parse_image_name(&format!("oci:{}:v1", dir.path().display()))
            .expect("parse failed");
        let source = reference
            .new_image_source(&SystemContext::default())
            .expect("open failed");
        assert_eq!(source.manifest(), b"tagged-manifest");
    }

    #[test]
    fn oci_source_missing_tag_is_error() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let _ = write_oci_layout(dir.path(), Some("v1"), b"tagged-manifest");

        let reference = parse_image_name(&format!("oci:{}:v2", dir.path().display()))
            .expect("parse failed");
        assert!(reference.new_image_source(&SystemContext::default()).is_err());
    }

    #[test]
    fn oci_source_honors_shared_blob_dir() {
        let layout = tempfile::tempdir().expect("failed to create tempdir");
        let shared = tempfile::tempdir().expect("failed to create tempdir");

        let manifest = b"shared-manifest";
        let digest = sha256_digest(manifest);
        let (algorithm, hex) = digest.split_once(':').expect("digest format");
        let blob_dir = shared.path().join(algorithm);
        std::fs::create_dir_all(&blob_dir).expect("failed to create blob dir");
        std::fs::write(blob_dir.join(hex), manifest).expect("failed to write blob");
        let index = serde_json::json!({
            "schemaVersion": 2,
            "manifests": [{ "digest": digest, "size": manifest.len() }],
        });
        std::fs::write(layout.path().join("index.json"), index.to_string())
            .expect("failed to write index");

        let sys = SystemContext {
            oci_shared_blob_dir_path: Some(shared.path().to_path_buf()),
            ..SystemContext::default()
        };
        let reference = parse_image_name(&format!("oci:{}", layout.path().display()))
            .expect("parse failed");
        let source = reference.new_image_source(&sys).expect("open failed");
        assert_eq!(source.manifest(), manifest);
    }

    #[test]
    fn docker_source_is_unsupported() {
        let reference = parse_image_name("docker://busybox").expect("parse failed");
        assert!(matches!(
            reference.new_image_source(&SystemContext::default()),
            Err(SkiffError::TransportUnsupported { .. })
        ));
    }

    #[test]
    fn copy_dir_to_dir_copies_files() {
        let src = tempfile::tempdir().expect("failed to create tempdir");
        let dest = tempfile::tempdir().expect("failed to create tempdir");
        std::fs::write(src.path().join("manifest.json"), b"{}").expect("failed to write");
        std::fs::write(src.path().join("version"), b"Directory Transport Version: 1.1\n")
            .expect("failed to write");

        let src_ref = parse_image_name(&format!("dir:{}", src.path().display()))
            .expect("parse failed");
        let dest_ref = parse_image_name(&format!("dir:{}", dest.path().display()))
            .expect("parse failed");
        let source = src_ref
            .new_image_source(&SystemContext::default())
            .expect("open failed");
        copy_image(&source, &dest_ref, &SystemContext::default()).expect("copy failed");

        assert_eq!(
            std::fs::read(dest.path().join("manifest.json")).expect("read failed"),
            b"{}"
        );
        assert!(dest.path().join("version").exists());
    }

    #[test]
    fn copy_to_network_destination_is_unsupported() {
        let src = tempfile::tempdir().expect("failed to create tempdir");
        std::fs::write(src.path().join("manifest.json"), b"{}").expect("failed to write");

        let src_ref = parse_image_name(&format!("dir:{}", src.path().display()))
            .expect("parse failed");
        let dest_ref = parse_image_name("docker://example.com/image").expect("parse failed");
        let source = src_ref
            .new_image_source(&SystemContext::default())
            .expect("open failed");
        assert!(matches!(
            copy_image(&source, &dest_ref, &SystemContext::default()),
            Err(SkiffError::TransportUnsupported { .. })
        ));
    }
}
