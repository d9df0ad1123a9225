//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (project, image, page) is its semantic identity: title
//! and positional index. Filesystem paths are secondary context on indented
//! `Source:` lines, so the output reads as a content inventory while still
//! letting users trace data back to specific files.
//!
//! # Output Format
//!
//! ## Index
//!
//! ```text
//! Projects
//! 001 Big Poster (3 images, 1 R18)
//!     Source: assets/character/20250505_Friend_Big_Poster/
//!     By Friend, 2025/05/05
//!     001 a.png
//!     002 b_r18.png [R18]
//!     Download: source.psd
//!
//! Config
//!     config.toml
//!
//! 4 projects, 5 images, 1 download
//! ```
//!
//! ## Thumbs
//!
//! ```text
//! Big Poster (3 images)
//!     001 a.png
//!         Source: /assets/character/20250505_Friend_Big_Poster/a.png
//!         large: cached
//!         small: encoded
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! Character → character/index.html
//!     Art → character/art/index.html
//!         001 Big Poster (3 images)
//! Fonts → fonts/index.html
//!     台鐵客貨車字體 → fonts/akitra/index.html
//! Links → links/index.html
//!
//! Generated 8 pages, 4 project cards, 12 files copied
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::GenerateResult;
use crate::index::ProjectIndex;
use crate::process::{ProcessEvent, VariantStatus};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 image`, `3 images`.
fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Project header: positional index + title + image count.
///
/// ```text
/// 001 Big Poster (3 images)
/// 001 Big Poster (3 images, 1 R18)
/// ```
fn project_header(index: usize, title: &str, images: usize, r18: usize) -> String {
    let detail = if r18 > 0 {
        format!("{}, {} R18", plural(images, "image"), r18)
    } else {
        plural(images, "image")
    };
    format!("{} {} ({})", format_index(index), title, detail)
}

// ============================================================================
// Stage 1: Index output
// ============================================================================

/// Format the index stage output: every project in page order.
///
/// `has_config` tells whether a `config.toml` was found at the content root.
pub fn format_index_output(
    index: &ProjectIndex,
    assets_dir: &str,
    has_config: bool,
) -> Vec<String> {
    let mut lines = vec!["Projects".to_string()];

    for (i, project) in index.all_projects().iter().enumerate() {
        lines.push(project_header(
            i + 1,
            &project.title,
            project.images.len(),
            project.r18_count(),
        ));
        lines.push(format!(
            "{}Source: {}/{}/",
            indent(1),
            assets_dir,
            project.folder_name
        ));
        if project.date.is_empty() {
            lines.push(format!("{}By {}", indent(1), project.author));
        } else {
            lines.push(format!("{}By {}, {}", indent(1), project.author, project.date));
        }
        for (j, image) in project.images.iter().enumerate() {
            let marker = if image.r18 { " [R18]" } else { "" };
            lines.push(format!(
                "{}{} {}{}",
                indent(1),
                format_index(j + 1),
                image.name,
                marker
            ));
        }
        for file in &project.download_files {
            lines.push(format!("{}Download: {}", indent(1), file.name));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if has_config {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }

    lines.push(String::new());
    lines.push(format_totals(index));
    lines
}

/// `4 projects, 5 images, 1 download`.
pub fn format_totals(index: &ProjectIndex) -> String {
    format!(
        "{}, {}, {}",
        plural(index.projects.len(), "project"),
        plural(index.image_count(), "image"),
        plural(index.download_count(), "download"),
    )
}

/// Print index output to stdout.
pub fn print_index_output(index: &ProjectIndex, assets_dir: &str, has_config: bool) {
    for line in format_index_output(index, assets_dir, has_config) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Thumbs output
// ============================================================================

/// Format a single thumbs progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::ProjectStarted { title, image_count } => {
            vec![format!("{} ({})", title, plural(*image_count, "image"))]
        }
        ProcessEvent::ImageProcessed {
            index,
            name,
            source_path,
            variants,
        } => {
            let mut lines = vec![
                format!("{}{} {}", indent(1), format_index(*index), name),
                format!("{}Source: {}", indent(2), source_path),
            ];
            for variant in variants {
                let status = match variant.status {
                    VariantStatus::Cached => "cached",
                    VariantStatus::Copied => "copied",
                    VariantStatus::Encoded => "encoded",
                };
                lines.push(format!("{}{}: {}", indent(2), variant.label, status));
            }
            lines
        }
        ProcessEvent::ImagePassthrough {
            index,
            name,
            source_path,
        } => vec![
            format!("{}{} {}", indent(1), format_index(*index), name),
            format!("{}Source: {}", indent(2), source_path),
            format!("{}original (no thumbnails)", indent(2)),
        ],
        ProcessEvent::ImageFailed {
            index,
            name,
            source_path,
            error,
        } => vec![
            format!("{}{} {}", indent(1), format_index(*index), name),
            format!("{}Source: {}", indent(2), source_path),
            format!("{}failed: {}", indent(2), error),
        ],
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

/// Format generate stage output: each page with its output file, project
/// cards listed under the art page.
pub fn format_generate_output(result: &GenerateResult) -> Vec<String> {
    let mut lines = Vec::new();

    for page in &result.pages {
        lines.push(format!(
            "{}{} \u{2192} {}",
            indent(page.depth),
            page.title,
            page.file()
        ));
        if page.route == "/character/art/" {
            for (i, (title, count)) in result.cards.iter().enumerate() {
                lines.push(format!(
                    "{}{} {} ({})",
                    indent(page.depth + 1),
                    format_index(i + 1),
                    title,
                    plural(*count, "image")
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {} copied",
        plural(result.pages.len(), "page"),
        plural(result.cards.len(), "project card"),
        plural(result.copied_files, "file"),
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(result: &GenerateResult) {
    for line in format_generate_output(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
