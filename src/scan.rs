//! Filesystem scanning and index generation.
//!
//! Stage 1 of the build pipeline. Walks the project folders under the
//! configured assets directory and produces the [`ProjectIndex`] that the
//! thumbs and generate stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                                 # Content root
//! ├── config.toml                          # Site configuration (optional)
//! ├── landing.md                           # Landing page body (optional)
//! ├── character.md                         # Character introduction (optional)
//! └── assets/character/                    # gallery.assets_dir
//!     ├── 20250505_Friend_Big_Poster/      # DATE_AUTHOR_TITLE
//!     │   ├── project.toml                 # Overrides (optional)
//!     │   ├── cover.png                    # Image, hero (sorts first)
//!     │   ├── pinup_r18.png                # Adult content
//!     │   └── source.psd                   # Download
//!     ├── 20250326_廢墟桌布/                 # DATE_TITLE → default author
//!     └── Sketches/                        # No underscore → no date
//! ```
//!
//! Only first-level folders are projects and only files directly inside a
//! project folder are considered; dot-folders are skipped.
//!
//! ## Overrides
//!
//! A `project.toml` inside a project folder may set:
//!
//! ```toml
//! title = "Big Summer Poster"
//! author = "Friend"
//! layout = "vertical"          # vertical | horizontal | all
//!
//! [crop]
//! "cover.png" = "top"          # top | center
//! ```

use crate::config::SiteConfig;
use crate::index::{CropPosition, FileKind, Layout, Project, ProjectFile, ProjectIndex};
use crate::naming::{self, classify_file, extension_of, format_date, parse_folder_name};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Assets directory not found: {0}")]
    MissingAssetsDir(PathBuf),
    #[error("Invalid project.toml in {path}: {source}")]
    Overrides {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Crop hint for unknown image '{file}' in {folder}")]
    UnknownCropTarget { folder: String, file: String },
}

/// Per-project overrides read from `project.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProjectOverrides {
    title: Option<String>,
    author: Option<String>,
    layout: Option<Layout>,
    crop: BTreeMap<String, CropPosition>,
}

const OVERRIDES_FILE: &str = "project.toml";

/// Scan `content_root` for projects.
///
/// Returns the projects sorted by id, descending. Any filesystem or
/// override error aborts the scan.
pub fn scan(content_root: &Path, config: &SiteConfig) -> Result<ProjectIndex, ScanError> {
    let assets = content_root.join(&config.gallery.assets_dir);
    if !assets.is_dir() {
        return Err(ScanError::MissingAssetsDir(assets));
    }

    let mut projects = Vec::new();
    for folder in collect_folders(&assets)? {
        projects.push(build_project(&folder, config)?);
    }
    projects.sort_by(|a, b| b.id.cmp(&a.id));

    tracing::debug!(
        projects = projects.len(),
        assets = %assets.display(),
        "scanned asset folders"
    );
    Ok(ProjectIndex::new(projects))
}

/// Like [`scan`], but a failure is logged and yields an empty index.
///
/// The build keeps going with an empty gallery rather than aborting.
pub fn scan_or_empty(content_root: &Path, config: &SiteConfig) -> ProjectIndex {
    match scan(content_root, config) {
        Ok(index) => index,
        Err(e) => {
            tracing::error!(error = %e, "error scanning assets directory");
            ProjectIndex::default()
        }
    }
}

fn collect_folders(assets: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(assets)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type()?.is_dir() && !name.starts_with('.') {
            folders.push(entry.path());
        }
    }
    folders.sort();
    Ok(folders)
}

fn collect_files(folder: &Path) -> Result<Vec<String>, ScanError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    files.sort();
    Ok(files)
}

fn read_overrides(folder: &Path) -> Result<ProjectOverrides, ScanError> {
    let path = folder.join(OVERRIDES_FILE);
    if !path.exists() {
        return Ok(ProjectOverrides::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|source| ScanError::Overrides { path, source })
}

fn build_project(folder: &Path, config: &SiteConfig) -> Result<Project, ScanError> {
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_folder_name(&folder_name, &config.gallery.default_author);
    let overrides = read_overrides(folder)?;
    let url_base = format!(
        "/{}/{}",
        config.gallery.assets_dir.trim_matches('/'),
        folder_name
    );

    let mut images = Vec::new();
    let mut download_files = Vec::new();

    for name in collect_files(folder)? {
        let Some(kind) = classify_file(&name) else {
            continue;
        };
        let mut file = ProjectFile {
            path: format!("{url_base}/{name}"),
            kind,
            extension: extension_of(&name),
            r18: false,
            crop_position: None,
            width: None,
            height: None,
            name,
        };
        match kind {
            FileKind::Image => {
                file.r18 = naming::is_adult_marked(&file.name, &config.gallery.r18_suffix);
                file.crop_position = overrides.crop.get(&file.name).copied();
                images.push(file);
            }
            FileKind::Download => download_files.push(file),
        }
    }

    if let Some(file) = overrides
        .crop
        .keys()
        .find(|k| !images.iter().any(|i| &i.name == *k))
    {
        return Err(ScanError::UnknownCropTarget {
            folder: folder_name,
            file: file.clone(),
        });
    }

    Ok(Project {
        id: folder_name.clone(),
        title: overrides.title.unwrap_or(parsed.title),
        author: overrides.author.unwrap_or(parsed.author),
        date: format_date(&parsed.date),
        folder_name,
        images,
        download_files,
        layout: overrides.layout,
    })
}
