//! Centralized filename parsing for the asset tree conventions.
//!
//! Every project lives in its own folder under `assets/character/`, and the
//! folder name carries the project metadata:
//!
//! - `20250505_Author_Some_Title` → date `20250505`, author `Author`, title `Some Title`
//! - `20250326_廢墟桌布` → date `20250326`, default author, title `廢墟桌布`
//! - `Sketches` → no date, default author, title `Sketches`
//!
//! Files inside a folder are classified by extension, and images whose stem
//! ends with the adult-content marker (`_r18` by default, case-insensitive)
//! are flagged for the age gate.

use crate::index::FileKind;

/// Extensions (lowercase, with dot) rendered as gallery images.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp"];

/// Extensions (lowercase, with dot) offered as download buttons.
pub const DOWNLOAD_EXTENSIONS: &[&str] = &[".psd", ".ai", ".sketch", ".fig", ".zip", ".rar"];

/// Result of parsing a project folder name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFolder {
    /// Raw date part (`YYYYMMDD` by convention). Empty when the folder has no `_`.
    pub date: String,
    pub author: String,
    pub title: String,
}

/// Parse a project folder name following the `DATE_AUTHOR_TITLE` convention.
///
/// - `"20250505_涼風千秋_眼睛條"` → date="20250505", author="涼風千秋", title="眼睛條"
/// - `"20240101_Friend_Big_Poster"` → title="Big Poster" (remaining parts joined with spaces)
/// - `"20250326_廢墟桌布"` → author=`default_author`
/// - `"Sketches"` → date="", author=`default_author`, title="Sketches"
pub fn parse_folder_name(name: &str, default_author: &str) -> ParsedFolder {
    let parts: Vec<&str> = name.split('_').collect();
    match parts.as_slice() {
        [date, author, title @ ..] if !title.is_empty() => ParsedFolder {
            date: date.to_string(),
            author: author.to_string(),
            title: title.join(" "),
        },
        [date, title] => ParsedFolder {
            date: date.to_string(),
            author: default_author.to_string(),
            title: title.to_string(),
        },
        _ => ParsedFolder {
            date: String::new(),
            author: default_author.to_string(),
            title: name.to_string(),
        },
    }
}

/// Format an 8-digit `YYYYMMDD` date as `YYYY/MM/DD`. Anything else is returned as-is.
pub fn format_date(date: &str) -> String {
    if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        format!("{}/{}/{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    }
}

/// Lowercased extension including the leading dot, or empty if there is none.
///
/// `"Cover.PNG"` → `".png"`, `"archive.tar.gz"` → `".gz"`, `"README"` → `""`.
pub fn extension_of(filename: &str) -> String {
    filename
        .rfind('.')
        .map(|pos| filename[pos..].to_lowercase())
        .unwrap_or_default()
}

/// Filename with the final extension removed.
pub fn stem_of(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(pos) => &filename[..pos],
        None => filename,
    }
}

/// Classify a file as image, download, or ignored (`None`).
///
/// Dot-files are always ignored, as are generated thumbnails so that a
/// re-index after a thumbs run does not pick them up as artwork.
pub fn classify_file(filename: &str) -> Option<FileKind> {
    if filename.starts_with('.') || crate::thumbnail::is_thumbnail_name(filename) {
        return None;
    }
    let ext = extension_of(filename);
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Image)
    } else if DOWNLOAD_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Download)
    } else {
        None
    }
}

/// Whether an image filename carries the adult-content marker.
///
/// The marker is matched against the stem, case-insensitively:
/// `pinup_R18.png` is flagged, `r18_sketch.png` is not.
pub fn is_adult_marked(filename: &str, marker: &str) -> bool {
    stem_of(filename)
        .to_lowercase()
        .ends_with(&marker.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "涼風千秋";

    #[test]
    fn folder_with_author_and_title() {
        let p = parse_folder_name("20250505_Friend_眼睛條", DEFAULT);
        assert_eq!(p.date, "20250505");
        assert_eq!(p.author, "Friend");
        assert_eq!(p.title, "眼睛條");
    }

    #[test]
    fn folder_title_parts_joined_with_spaces() {
        let p = parse_folder_name("20240101_Friend_Big_Summer_Poster", DEFAULT);
        assert_eq!(p.author, "Friend");
        assert_eq!(p.title, "Big Summer Poster");
    }

    #[test]
    fn folder_without_author_uses_default() {
        let p = parse_folder_name("20250326_廢墟桌布", DEFAULT);
        assert_eq!(p.date, "20250326");
        assert_eq!(p.author, DEFAULT);
        assert_eq!(p.title, "廢墟桌布");
    }

    #[test]
    fn folder_without_underscore_falls_back() {
        let p = parse_folder_name("Sketches", DEFAULT);
        assert_eq!(p.date, "");
        assert_eq!(p.author, DEFAULT);
        assert_eq!(p.title, "Sketches");
    }

    #[test]
    fn official_art_folder() {
        let p = parse_folder_name("0_亞莓官方圖", DEFAULT);
        assert_eq!(p.date, "0");
        assert_eq!(p.title, "亞莓官方圖");
    }

    #[test]
    fn date_formatting() {
        assert_eq!(format_date("20250505"), "2025/05/05");
        assert_eq!(format_date("0"), "0");
        assert_eq!(format_date("2025050a"), "2025050a");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(extension_of("Cover.PNG"), ".png");
        assert_eq!(extension_of("c49c(1).jpg"), ".jpg");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn classify_by_extension() {
        assert_eq!(classify_file("a.jpg"), Some(FileKind::Image));
        assert_eq!(classify_file("a.SVG"), Some(FileKind::Image));
        assert_eq!(classify_file("source.psd"), Some(FileKind::Download));
        assert_eq!(classify_file("bundle.zip"), Some(FileKind::Download));
        assert_eq!(classify_file("notes.txt"), None);
        assert_eq!(classify_file("project.toml"), None);
    }

    #[test]
    fn classify_ignores_dotfiles_and_thumbnails() {
        assert_eq!(classify_file(".DS_Store"), None);
        assert_eq!(classify_file(".hidden.png"), None);
        assert_eq!(classify_file("cover_thumb_large.jpg"), None);
        assert_eq!(classify_file("cover_thumb_small.jpg"), None);
    }

    #[test]
    fn adult_marker_is_case_insensitive_on_stem() {
        assert!(is_adult_marked("pinup_r18.png", "_r18"));
        assert!(is_adult_marked("pinup_R18.JPG", "_r18"));
        assert!(!is_adult_marked("r18_pinup.png", "_r18"));
        assert!(!is_adult_marked("pinup.png", "_r18"));
    }
}
