//! Content-addressed thumbnail cache.
//!
//! Decoding a full-size illustration and resampling it with Lanczos3 is the
//! slow part of a build. The thumbs stage asks this module whether a variant
//! with the same source bytes and the same parameters was already rendered.
//!
//! A variant is identified by a [`CacheKey`]: the SHA-256 of the source file
//! plus the SHA-256 of the variant parameters. The large variant hashes
//! (long edge, quality); the small one hashes (edge, anchor, quality,
//! sharpening). Editing a crop hint in `project.toml` changes the anchor and
//! re-renders only that image's small thumbnail. Keys are content-based, so
//! they survive `git checkout` resetting modification times, and renaming a
//! project folder costs a copy instead of a re-encode.
//!
//! The manifest lives at `<thumbs_dir>/.thumbs-cache.json`. It is a dot-file
//! so the generate stage leaves it behind when copying thumbnails.

use crate::imaging::Anchor;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const MANIFEST_FILENAME: &str = ".thumbs-cache.json";

/// Bumped whenever key computation changes; older manifests are discarded.
const MANIFEST_VERSION: u32 = 2;

/// Source hash and parameter hash of one rendered variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CacheKey {
    pub source: String,
    pub params: String,
}

impl CacheKey {
    pub fn new(source: &str, params: &str) -> Self {
        Self {
            source: source.to_string(),
            params: params.to_string(),
        }
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> String {
        format!("{}:{}", key.source, key.params)
    }
}

impl TryFrom<String> for CacheKey {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.split_once(':') {
            Some((source, params)) if !source.is_empty() && !params.is_empty() => {
                Ok(Self::new(source, params))
            }
            _ => Err(format!("malformed cache key '{raw}'")),
        }
    }
}

/// Rendered variants by key, each pointing at a path relative to the
/// thumbs directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    version: u32,
    thumbnails: BTreeMap<CacheKey, String>,
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            thumbnails: BTreeMap::new(),
        }
    }

    /// Read the manifest from `thumbs_dir`.
    ///
    /// A missing, unreadable or outdated manifest starts an empty cache.
    pub fn load(thumbs_dir: &Path) -> Self {
        let path = manifest_path(thumbs_dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::empty();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(manifest) if manifest.version == MANIFEST_VERSION => manifest,
            Ok(manifest) => {
                tracing::debug!(found = manifest.version, "discarding outdated thumbnail cache");
                Self::empty()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable thumbnail cache");
                Self::empty()
            }
        }
    }

    pub fn save(&self, thumbs_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(thumbs_dir)?;
        std::fs::write(manifest_path(thumbs_dir), serde_json::to_string_pretty(self)?)
    }

    /// Path of a previous render of this variant, if its file is still on
    /// disk. It may differ from the caller's target after a folder rename.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        thumbs_dir: &Path,
    ) -> Option<String> {
        self.thumbnails
            .get(&CacheKey::new(source_hash, params_hash))
            .filter(|stored| thumbs_dir.join(stored).is_file())
            .cloned()
    }

    /// Record that `output_path` holds the render for these hashes.
    ///
    /// Any other key still claiming `output_path` is dropped, since the file
    /// on disk now belongs to the new key.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        self.thumbnails.retain(|_, stored| *stored != output_path);
        self.thumbnails.insert(
            CacheKey {
                source: source_hash,
                params: params_hash,
            },
            output_path,
        );
    }

    pub fn len(&self) -> usize {
        self.thumbnails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnails.is_empty()
    }
}

/// Hex SHA-256 of a file's bytes.
pub fn hash_file(path: &Path) -> io::Result<String> {
    Ok(hex_digest(&std::fs::read(path)?))
}

/// Parameter hash for the large variant.
pub fn hash_large_params(long_edge: u32, quality: u32) -> String {
    let mut buf = b"large\0".to_vec();
    buf.extend(long_edge.to_le_bytes());
    buf.extend(quality.to_le_bytes());
    hex_digest(&buf)
}

/// Parameter hash for the small variant.
pub fn hash_small_params(
    edge: u32,
    anchor: Anchor,
    quality: u32,
    sharpening: Option<(f32, i32)>,
) -> String {
    let mut buf = b"small\0".to_vec();
    buf.extend(edge.to_le_bytes());
    buf.extend_from_slice(match anchor {
        Anchor::Top => b"top",
        Anchor::Center => b"ctr",
    });
    buf.extend(quality.to_le_bytes());
    if let Some((sigma, threshold)) = sharpening {
        buf.push(1);
        buf.extend(sigma.to_le_bytes());
        buf.extend(threshold.to_le_bytes());
    } else {
        buf.push(0);
    }
    hex_digest(&buf)
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Per-run tally of cache outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    /// `"3 encoded"` on a cold run, otherwise
    /// `"5 cached[, 1 copied], 2 encoded (8 total)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits == 0 && self.copies == 0 {
            return write!(f, "{} encoded", self.misses);
        }
        write!(f, "{} cached, ", self.hits)?;
        if self.copies > 0 {
            write!(f, "{} copied, ", self.copies)?;
        }
        write!(f, "{} encoded ({} total)", self.misses, self.total())
    }
}

pub fn manifest_path(thumbs_dir: &Path) -> PathBuf {
    thumbs_dir.join(MANIFEST_FILENAME)
}
