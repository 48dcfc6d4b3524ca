//! # skiff-manifest
//!
//! Extracts container image references from multi-document Kubernetes
//! manifests.
//!
//! Documents are split on the YAML separator, parsed as schema-less values
//! (resource kinds are deliberately not modeled), and walked recursively:
//! any `containers` or `initContainers` sequence contributes the `image`
//! field of each of its entries. A document may also carry extra image
//! references in a comma-separated well-known annotation
//! ([`skiff_common::constants::EXTRA_IMAGES_ANNOTATION`]).

use serde_yaml::Value;
use skiff_common::constants::EXTRA_IMAGES_ANNOTATION;
use skiff_common::error::Result;

/// Parses multi-document YAML text into schema-less documents.
///
/// Documents are separated by a line starting with `---`. Empty fragments
/// (for example from a trailing separator) are skipped.
///
/// # Errors
///
/// Returns `SkiffError::ManifestParse` if any non-empty fragment is not
/// valid YAML. The whole extraction fails; no partial result is returned.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for fragment in text.split("\n---") {
        if fragment.is_empty() {
            tracing::debug!("skipping empty manifest fragment");
            continue;
        }
        documents.push(serde_yaml::from_str(fragment)?);
    }
    Ok(documents)
}

/// Extracts every container image reference from multi-document YAML text.
///
/// Images appear in document order; within one document, walked container
/// images come first and annotation-derived extras are appended after them.
/// Annotation values are comma-split verbatim, without trimming.
///
/// # Errors
///
/// Returns `SkiffError::ManifestParse` if any non-empty fragment is not
/// valid YAML.
pub fn images_from_manifests(text: &str) -> Result<Vec<String>> {
    let mut images = Vec::new();
    for document in parse_documents(text)? {
        collect_images(&document, &mut images);
        if let Some(extra) = extra_images(&document) {
            images.extend(extra.split(',').map(str::to_owned));
        }
    }
    Ok(images)
}

/// Recursively walks a document, appending images found in `containers` and
/// `initContainers` sequences.
///
/// Other sequence values are not descended into; only container lists hold
/// images. Mapping values are walked at arbitrary depth.
fn collect_images(value: &Value, images: &mut Vec<String>) {
    let Some(mapping) = value.as_mapping() else {
        return;
    };
    for (key, value) in mapping {
        match value {
            Value::Sequence(entries) if is_container_key(key) => {
                for entry in entries {
                    if let Some(image) = entry.get("image").and_then(scalar_to_string) {
                        images.push(image);
                    }
                }
            }
            Value::Mapping(_) => collect_images(value, images),
            _ => {}
        }
    }
}

fn is_container_key(key: &Value) -> bool {
    matches!(key.as_str(), Some("containers" | "initContainers"))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns the extra-images annotation value of a document, if present.
fn extra_images(document: &Value) -> Option<&str> {
    document
        .get("metadata")
        .and_then(|metadata| metadata.get("annotations"))
        .and_then(|annotations| annotations.get(EXTRA_IMAGES_ANNOTATION))
        .and_then(Value::as_str)
}
