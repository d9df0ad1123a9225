//! The asset index: project records shared by every pipeline stage.
//!
//! These types are serialized to JSON between stages (index → thumbs →
//! generate) and are never mutated after the thumbs stage fills in image
//! dimensions.

use serde::{Deserialize, Serialize};

/// Whether a file is shown in the gallery or offered as a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Download,
}

/// Which part of an image stays visible when a tile crops it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropPosition {
    Top,
    #[default]
    Center,
}

impl CropPosition {
    /// CSS `object-position` value.
    pub fn as_css(self) -> &'static str {
        match self {
            CropPosition::Top => "top",
            CropPosition::Center => "center",
        }
    }
}

/// Card layout hint for a project with several images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Vertical,
    #[default]
    Horizontal,
    All,
}

/// A single file inside a project folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    /// Static URL, e.g. `/assets/character/20250505_眼睛條/cover.jpg`.
    pub path: String,
    pub kind: FileKind,
    /// Lowercased extension with leading dot.
    pub extension: String,
    /// Adult content: blurred, badged and gated behind the age confirmation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub r18: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_position: Option<CropPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ProjectFile {
    pub fn crop(&self) -> CropPosition {
        self.crop_position.unwrap_or_default()
    }
}

/// One artwork project, generated from one folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique id; the folder name. Also the sort key.
    pub id: String,
    pub title: String,
    pub author: String,
    /// Display date (`YYYY/MM/DD` when the folder carried a full date).
    pub date: String,
    pub folder_name: String,
    /// Ordered; index 0 is the hero image.
    pub images: Vec<ProjectFile>,
    pub download_files: Vec<ProjectFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl Project {
    pub fn layout(&self) -> Layout {
        self.layout.unwrap_or_default()
    }

    pub fn r18_count(&self) -> usize {
        self.images.iter().filter(|i| i.r18).count()
    }

    /// Handle shown next to the author name: lowercased, whitespace removed.
    pub fn author_handle(&self) -> String {
        self.author
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

/// The full set of projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectIndex {
    pub projects: Vec<Project>,
}

impl ProjectIndex {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// All projects sorted by id, descending.
    ///
    /// Plain string comparison, not date parsing, so the order is identical
    /// wherever the index is rendered.
    pub fn all_projects(&self) -> Vec<&Project> {
        let mut sorted: Vec<&Project> = self.projects.iter().collect();
        sorted.sort_by(|a, b| b.id.cmp(&a.id));
        sorted
    }

    pub fn project_by_id(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn image_count(&self) -> usize {
        self.projects.iter().map(|p| p.images.len()).sum()
    }

    pub fn download_count(&self) -> usize {
        self.projects.iter().map(|p| p.download_files.len()).sum()
    }
}
