//! Physical key derivation
//!
//! Maps a logical resource path to the key used at the object store,
//! applying root prefixing, WebP variant segmentation, and
//! content-addressed key randomization. Derivation is pure: identical
//! (path, policy) inputs always produce the identical key.

use crate::config::StoragePolicy;
use sha1::{Digest, Sha1};

/// Companion artifact kinds stored next to a primary resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarKind {
    /// Per-image security key (`.txt`)
    Crypto,

    /// Serialized detector metadata (`.detectors.txt`)
    DetectorData,
}

/// Derive the physical storage key for a logical path
///
/// Segment order is the compatibility contract: root path first, then
/// the stripped logical path, then the `webp` variant segment. The
/// randomization digest is computed over that final list and prepended,
/// so it never covers itself. Keys never end in `/`; directory-like
/// paths are rewritten to reference the configured root image name.
///
/// # Examples
///
/// ```rust
/// use aperture_s3::{derive_key, StoragePolicy};
///
/// let policy = StoragePolicy {
///     root_path: Some("prod".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(derive_key("/images/cat.jpg", &policy), "prod/images/cat.jpg");
/// ```
pub fn derive_key(path: &str, policy: &StoragePolicy) -> String {
    let path = path.trim_start_matches('/');

    let mut segments: Vec<String> = vec![path.to_string()];

    if let Some(root) = policy.root_path.as_deref() {
        if !root.is_empty() {
            segments.insert(0, root.to_string());
        }
    }

    if policy.auto_webp {
        segments.push("webp".to_string());
    }

    if policy.randomize_keys {
        let digest = segment_digest(&segments);
        segments.insert(0, digest);
    }

    let joined = join_segments(&segments);
    let mut key = joined.trim_start_matches('/').to_string();

    if key.ends_with('/') {
        key.push_str(&policy.root_image_name);
    }

    key
}

/// Derive the companion key for a sidecar artifact
///
/// Replaces the primary key's extension with the sidecar suffix. A key
/// without an extension is used as the base unchanged.
///
/// # Examples
///
/// ```rust
/// use aperture_s3::{sidecar_key, SidecarKind};
///
/// assert_eq!(sidecar_key("a/b.jpg", SidecarKind::Crypto), "a/b.txt");
/// assert_eq!(
///     sidecar_key("a/b.jpg", SidecarKind::DetectorData),
///     "a/b.detectors.txt"
/// );
/// ```
pub fn sidecar_key(primary: &str, kind: SidecarKind) -> String {
    let base = strip_extension(primary);
    match kind {
        SidecarKind::Crypto => format!("{base}.txt"),
        SidecarKind::DetectorData => format!("{base}.detectors.txt"),
    }
}

/// Hex-encoded SHA-1 over the segment list joined with `.`
fn segment_digest(segments: &[String]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(segments.join(".").as_bytes());
    hex::encode(hasher.finalize())
}

/// Join segments with `/` without doubling separators
fn join_segments(segments: &[String]) -> String {
    let mut joined = String::new();
    for segment in segments {
        if joined.is_empty() {
            joined.push_str(segment);
            continue;
        }
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(segment.trim_start_matches('/'));
    }
    joined
}

/// Drop the extension of the final path component, if any
///
/// Only a dot inside the last component counts; a leading dot
/// (".profile" style names) does not start an extension.
fn strip_extension(key: &str) -> &str {
    let basename_start = key.rfind('/').map_or(0, |slash| slash + 1);
    match key[basename_start..].rfind('.') {
        Some(0) | None => key,
        Some(dot) => &key[..basename_start + dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StoragePolicy {
        StoragePolicy {
            root_image_name: "image.jpg".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_path_passthrough() {
        assert_eq!(derive_key("images/cat.jpg", &policy()), "images/cat.jpg");
    }

    #[test]
    fn test_leading_slashes_stripped() {
        assert_eq!(derive_key("//images/cat.jpg", &policy()), "images/cat.jpg");
    }

    #[test]
    fn test_root_path_prefix() {
        let policy = StoragePolicy {
            root_path: Some("prod".to_string()),
            ..policy()
        };
        assert_eq!(derive_key("/images/cat.jpg", &policy), "prod/images/cat.jpg");
    }

    #[test]
    fn test_empty_root_path_ignored() {
        let policy = StoragePolicy {
            root_path: Some(String::new()),
            ..policy()
        };
        assert_eq!(derive_key("/images/cat.jpg", &policy), "images/cat.jpg");
    }

    #[test]
    fn test_webp_variant_segment() {
        let policy = StoragePolicy {
            root_path: Some("prod".to_string()),
            auto_webp: true,
            ..policy()
        };
        assert_eq!(
            derive_key("/images/cat.jpg", &policy),
            "prod/images/cat.jpg/webp"
        );
    }

    #[test]
    fn test_trailing_slash_substitution() {
        let policy = StoragePolicy {
            root_path: Some("prod".to_string()),
            ..policy()
        };
        assert_eq!(derive_key("a/b/", &policy), "prod/a/b/image.jpg");
    }

    #[test]
    fn test_root_path_trailing_slash_not_doubled() {
        let policy = StoragePolicy {
            root_path: Some("prod/".to_string()),
            ..policy()
        };
        assert_eq!(derive_key("images/cat.jpg", &policy), "prod/images/cat.jpg");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let policy = StoragePolicy {
            root_path: Some("prod".to_string()),
            randomize_keys: true,
            auto_webp: true,
            ..policy()
        };
        assert_eq!(
            derive_key("/images/cat.jpg", &policy),
            derive_key("/images/cat.jpg", &policy)
        );
    }

    #[test]
    fn test_randomized_digest_covers_final_segments() {
        let policy = StoragePolicy {
            root_path: Some("prod".to_string()),
            randomize_keys: true,
            auto_webp: true,
            ..policy()
        };

        // Digest over "prod.images/cat.jpg.webp", prepended as its own
        // segment; the rest of the key is unchanged.
        let expected_digest = {
            let mut hasher = Sha1::new();
            hasher.update(b"prod.images/cat.jpg.webp");
            hex::encode(hasher.finalize())
        };

        assert_eq!(
            derive_key("/images/cat.jpg", &policy),
            format!("{expected_digest}/prod/images/cat.jpg/webp")
        );
    }

    #[test]
    fn test_randomization_inserts_exactly_one_segment() {
        let randomized = StoragePolicy {
            root_path: Some("prod".to_string()),
            randomize_keys: true,
            ..policy()
        };
        let plain = StoragePolicy {
            randomize_keys: false,
            ..randomized.clone()
        };

        let with_digest = derive_key("/images/cat.jpg", &randomized);
        let without_digest = derive_key("/images/cat.jpg", &plain);

        let (digest, rest) = with_digest.split_once('/').unwrap();
        assert_eq!(digest.len(), 40);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, without_digest);
    }

    #[test]
    fn test_digest_changes_with_path() {
        let policy = StoragePolicy {
            randomize_keys: true,
            ..policy()
        };

        let first = derive_key("/images/cat.jpg", &policy);
        let second = derive_key("/images/dog.jpg", &policy);
        assert_ne!(first.split('/').next(), second.split('/').next());
    }

    #[test]
    fn test_sidecar_crypto() {
        assert_eq!(sidecar_key("a/b.jpg", SidecarKind::Crypto), "a/b.txt");
    }

    #[test]
    fn test_sidecar_detector_data() {
        assert_eq!(
            sidecar_key("a/b.jpg", SidecarKind::DetectorData),
            "a/b.detectors.txt"
        );
    }

    #[test]
    fn test_sidecar_without_extension() {
        assert_eq!(sidecar_key("a/b", SidecarKind::Crypto), "a/b.txt");
        assert_eq!(
            sidecar_key("a/b", SidecarKind::DetectorData),
            "a/b.detectors.txt"
        );
    }

    #[test]
    fn test_sidecar_dotted_directory() {
        // Only the final component's extension is replaced
        assert_eq!(
            sidecar_key("a.dir/b.jpg", SidecarKind::Crypto),
            "a.dir/b.txt"
        );
        assert_eq!(sidecar_key("a.dir/b", SidecarKind::Crypto), "a.dir/b.txt");
    }

    #[test]
    fn test_sidecar_hidden_file() {
        assert_eq!(
            sidecar_key("images/.hidden", SidecarKind::Crypto),
            "images/.hidden.txt"
        );
    }
}
