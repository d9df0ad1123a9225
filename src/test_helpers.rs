//! Shared test utilities for the chiaki-site test suite.
//!
//! Provides record builders for index types, a synthetic content tree with
//! real (tiny) image files, and lookup helpers that panic with a clear
//! message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! let index = scan(tmp.path(), &SiteConfig::default()).unwrap();
//!
//! let project = find_project(&index, "20250505_Friend_Big_Poster");
//! assert_eq!(image_names(project), vec!["a.png", "b_r18.png", "c.jpg"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::index::{FileKind, Project, ProjectFile, ProjectIndex};
use crate::naming::extension_of;

// =========================================================================
// Record builders
// =========================================================================

/// An image record under a fixed test folder.
pub fn image(name: &str, r18: bool) -> ProjectFile {
    ProjectFile {
        name: name.to_string(),
        path: format!("/assets/character/test/{name}"),
        kind: FileKind::Image,
        extension: extension_of(name),
        r18,
        crop_position: None,
        width: None,
        height: None,
    }
}

/// A download record under a fixed test folder.
pub fn download(name: &str) -> ProjectFile {
    ProjectFile {
        kind: FileKind::Download,
        ..image(name, false)
    }
}

/// A project with the given id and images, default author and no layout hint.
pub fn project(id: &str, images: Vec<ProjectFile>) -> Project {
    Project {
        id: id.to_string(),
        title: id.to_string(),
        author: "涼風千秋".to_string(),
        date: String::new(),
        folder_name: id.to_string(),
        images,
        download_files: Vec::new(),
        layout: None,
    }
}

/// `n` non-adult images named `0.png`, `1.png`, ...
pub fn images(n: usize) -> Vec<ProjectFile> {
    (0..n).map(|i| image(&format!("{i}.png"), false)).collect()
}

/// Images from a pattern of adult flags, named by position.
pub fn images_flagged(flags: &[bool]) -> Vec<ProjectFile> {
    flags
        .iter()
        .enumerate()
        .map(|(i, &r18)| image(&format!("{i}.png"), r18))
        .collect()
}

// =========================================================================
// Content fixture
// =========================================================================

/// Write a small solid PNG (or JPEG, by extension) of the given size.
pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = ::image::RgbImage::from_fn(width, height, |x, y| {
        ::image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Build a content root in a temp directory:
///
/// ```text
/// content/
/// ├── landing.md
/// ├── character.md
/// └── assets/character/
///     ├── 20250505_Friend_Big_Poster/   a.png, b_r18.png, c.jpg, source.psd, notes.txt
///     ├── 20250326_廢墟桌布/              wallpaper.png, project.toml (layout = vertical)
///     ├── Sketches/                      logo.svg, .DS_Store
///     └── 20240101_Empty/                (no files)
/// ```
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    std::fs::write(root.join("landing.md"), "## 千秋稲荷社とは\n\n庇佑所有人生活富饒快樂。\n")
        .unwrap();
    std::fs::write(root.join("character.md"), "はおーっ！涼風千秋です！\n").unwrap();

    let assets = root.join("assets/character");

    let poster = assets.join("20250505_Friend_Big_Poster");
    write_image(&poster.join("a.png"), 64, 48);
    write_image(&poster.join("b_r18.png"), 48, 64);
    write_image(&poster.join("c.jpg"), 32, 32);
    std::fs::write(poster.join("source.psd"), "psd").unwrap();
    std::fs::write(poster.join("notes.txt"), "ignored").unwrap();

    let wallpaper = assets.join("20250326_廢墟桌布");
    write_image(&wallpaper.join("wallpaper.png"), 80, 40);
    std::fs::write(
        wallpaper.join("project.toml"),
        "layout = \"vertical\"\n\n[crop]\n\"wallpaper.png\" = \"top\"\n",
    )
    .unwrap();

    let sketches = assets.join("Sketches");
    std::fs::create_dir_all(&sketches).unwrap();
    std::fs::write(
        sketches.join("logo.svg"),
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#,
    )
    .unwrap();
    std::fs::write(sketches.join(".DS_Store"), "").unwrap();

    std::fs::create_dir_all(assets.join("20240101_Empty")).unwrap();
    tmp
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a project by id. Panics if not found.
pub fn find_project<'a>(index: &'a ProjectIndex, id: &str) -> &'a Project {
    index.project_by_id(id).unwrap_or_else(|| {
        let ids: Vec<&str> = index.projects.iter().map(|p| p.id.as_str()).collect();
        panic!("project '{id}' not found. Available: {ids:?}")
    })
}

/// Image filenames in project order.
pub fn image_names(project: &Project) -> Vec<&str> {
    project.images.iter().map(|i| i.name.as_str()).collect()
}
