//! Thumbnail naming convention and fallback resolution.
//!
//! For a base image `name.ext` the thumbs stage writes two JPEG variants
//! next to it in the output tree:
//!
//! ```text
//! cover.png  →  cover_thumb_large.jpg   (long edge ≤ thumbnails.large)
//!            →  cover_thumb_small.jpg   (square cover crop, thumbnails.small)
//! ```
//!
//! Vector (`.svg`) and animated (`.gif`) sources are never thumbnailed and
//! are always shown at full resolution. Rendering code goes through
//! [`resolve_url`], which falls back to the original path whenever the
//! thumbnail file does not exist.

use crate::index::ProjectFile;
use std::path::{Path, PathBuf};

const LARGE_SUFFIX: &str = "_thumb_large.jpg";
const SMALL_SUFFIX: &str = "_thumb_small.jpg";

/// Extensions that are shown as-is.
const PASSTHROUGH_EXTENSIONS: &[&str] = &[".svg", ".gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Large,
    Small,
}

impl Variant {
    fn suffix(self) -> &'static str {
        match self {
            Variant::Large => LARGE_SUFFIX,
            Variant::Small => SMALL_SUFFIX,
        }
    }
}

/// Whether a filename is itself a generated thumbnail.
pub fn is_thumbnail_name(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(LARGE_SUFFIX) || lower.ends_with(SMALL_SUFFIX)
}

/// Whether an image with this (lowercase, dotted) extension gets thumbnails.
pub fn supports_thumbnails(extension: &str) -> bool {
    !PASSTHROUGH_EXTENSIONS.contains(&extension)
}

/// Replace the extension of a path or URL with the variant suffix.
///
/// `/assets/character/x/cover.png` → `/assets/character/x/cover_thumb_large.jpg`
pub fn thumbnail_path(path: &str, variant: Variant) -> String {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let base = match path[file_start..].rfind('.') {
        Some(dot) => &path[..file_start + dot],
        None => path,
    };
    format!("{base}{}", variant.suffix())
}

/// Filesystem location of a thumbnail under `thumbs_root` for a site URL.
///
/// URLs are rooted at `/`, so `/assets/a/b.png` maps to
/// `thumbs_root/assets/a/b_thumb_large.jpg`.
pub fn thumbnail_file(thumbs_root: &Path, url: &str, variant: Variant) -> PathBuf {
    let thumb = thumbnail_path(url, variant);
    thumbs_root.join(thumb.trim_start_matches('/'))
}

/// URL to render for an image: the thumbnail when it exists, else the original.
pub fn resolve_url(file: &ProjectFile, variant: Variant, thumbs_root: &Path) -> String {
    if supports_thumbnails(&file.extension)
        && thumbnail_file(thumbs_root, &file.path, variant).is_file()
    {
        thumbnail_path(&file.path, variant)
    } else {
        file.path.clone()
    }
}
