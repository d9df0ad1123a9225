//! Thumbnail generation.
//!
//! Stage 2 of the build pipeline. Reads the index from the scan stage, writes
//! two JPEG thumbnails per raster image and fills in each image's original
//! dimensions.
//!
//! ## Output Structure
//!
//! Thumbnails mirror the asset URLs under the thumbs directory, so the
//! generate stage can copy the tree into `dist/` as-is:
//!
//! ```text
//! .chiaki-site-temp/thumbs/
//! ├── .thumbs-cache.json
//! └── assets/character/20250505_Friend_Big_Poster/
//!     ├── a_thumb_large.jpg       # long edge ≤ thumbnails.large
//!     └── a_thumb_small.jpg       # square cover crop at the crop hint
//! ```
//!
//! ## Failure Handling
//!
//! A single image that cannot be decoded or encoded is logged with
//! `tracing::warn!` and left without thumbnails; the page then shows the
//! original file. Only I/O on the index or the thumbs directory itself
//! aborts the stage.
//!
//! ## Parallel Processing
//!
//! Images within a project are processed in parallel using
//! [rayon](https://docs.rs/rayon). Progress events are sent in image order
//! once a project completes, so CLI output stays stable.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::SiteConfig;
use crate::imaging::{
    Anchor, BackendError, ImageBackend, RustBackend, ThumbnailConfig, create_large, create_small,
    get_dimensions,
};
use crate::index::{ProjectFile, ProjectIndex};
use crate::thumbnail::{self, Variant};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a thumbnail variant was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Already on disk from a previous run.
    Cached,
    /// Same content found under another path (folder rename) and copied.
    Copied,
    /// Rendered by the backend.
    Encoded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub label: String,
    pub status: VariantStatus,
}

/// Progress events for CLI output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    ProjectStarted {
        title: String,
        image_count: usize,
    },
    ImageProcessed {
        /// 1-based position within the project.
        index: usize,
        name: String,
        source_path: String,
        variants: Vec<VariantInfo>,
    },
    /// Vector or animated image, shown at full resolution.
    ImagePassthrough {
        index: usize,
        name: String,
        source_path: String,
    },
    ImageFailed {
        index: usize,
        name: String,
        source_path: String,
        error: String,
    },
}

/// Result of the thumbs stage.
#[derive(Debug)]
pub struct ProcessResult {
    /// The input index with `width`/`height` filled in.
    pub index: ProjectIndex,
    pub cache_stats: CacheStats,
    /// Images left without thumbnails.
    pub failures: usize,
}

/// Delete the thumbs directory so the next run renders everything.
pub fn clean(thumbs_dir: &Path) -> std::io::Result<()> {
    if thumbs_dir.exists() {
        std::fs::remove_dir_all(thumbs_dir)?;
        tracing::info!(dir = %thumbs_dir.display(), "removed thumbnails");
    }
    Ok(())
}

pub fn read_index(index_path: &Path) -> Result<ProjectIndex, ProcessError> {
    let content = std::fs::read_to_string(index_path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_index(index: &ProjectIndex, index_path: &Path) -> Result<(), ProcessError> {
    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(index_path, serde_json::to_string_pretty(index)?)?;
    Ok(())
}

/// Run the thumbs stage with the production backend.
pub fn process(
    index_path: &Path,
    content_root: &Path,
    thumbs_dir: &Path,
    config: &SiteConfig,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let index = read_index(index_path)?;
    process_with_backend(
        &RustBackend::new(),
        index,
        content_root,
        thumbs_dir,
        config,
        use_cache,
        progress,
    )
}

/// Outcome of one image, collected from the worker threads.
enum ImageOutcome {
    Processed {
        dims: (u32, u32),
        variants: Vec<VariantInfo>,
    },
    Passthrough {
        dims: Option<(u32, u32)>,
    },
    Failed(String),
}

/// Run the thumbs stage against any backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    mut index: ProjectIndex,
    content_root: &Path,
    thumbs_dir: &Path,
    config: &SiteConfig,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    std::fs::create_dir_all(thumbs_dir)?;

    let manifest = Mutex::new(if use_cache {
        CacheManifest::load(thumbs_dir)
    } else {
        CacheManifest::empty()
    });
    let stats = Mutex::new(CacheStats::default());
    let thumb_config = ThumbnailConfig::from(&config.thumbnails);
    let mut failures = 0;

    for project in &mut index.projects {
        if project.images.is_empty() {
            continue;
        }
        if let Some(tx) = &progress {
            tx.send(ProcessEvent::ProjectStarted {
                title: project.title.clone(),
                image_count: project.images.len(),
            })
            .ok();
        }

        let outcomes: Vec<ImageOutcome> = project
            .images
            .par_iter()
            .map(|file| {
                process_image(
                    backend,
                    file,
                    content_root,
                    thumbs_dir,
                    &thumb_config,
                    &manifest,
                    &stats,
                )
            })
            .collect();

        for (position, (file, outcome)) in project.images.iter_mut().zip(outcomes).enumerate() {
            let index = position + 1;
            let name = file.name.clone();
            let source_path = file.path.clone();
            let event = match outcome {
                ImageOutcome::Processed { dims, variants } => {
                    (file.width, file.height) = (Some(dims.0), Some(dims.1));
                    ProcessEvent::ImageProcessed {
                        index,
                        name,
                        source_path,
                        variants,
                    }
                }
                ImageOutcome::Passthrough { dims } => {
                    if let Some((w, h)) = dims {
                        (file.width, file.height) = (Some(w), Some(h));
                    }
                    ProcessEvent::ImagePassthrough {
                        index,
                        name,
                        source_path,
                    }
                }
                ImageOutcome::Failed(error) => {
                    failures += 1;
                    ProcessEvent::ImageFailed {
                        index,
                        name,
                        source_path,
                        error,
                    }
                }
            };
            if let Some(tx) = &progress {
                tx.send(event).ok();
            }
        }
    }

    let manifest = manifest.into_inner().unwrap_or_else(|e| e.into_inner());
    manifest.save(thumbs_dir)?;
    let cache_stats = stats.into_inner().unwrap_or_else(|e| e.into_inner());
    tracing::debug!(%cache_stats, failures, "thumbnail stage finished");

    Ok(ProcessResult {
        index,
        cache_stats,
        failures,
    })
}

fn source_file(content_root: &Path, file: &ProjectFile) -> PathBuf {
    content_root.join(file.path.trim_start_matches('/'))
}

fn process_image(
    backend: &impl ImageBackend,
    file: &ProjectFile,
    content_root: &Path,
    thumbs_dir: &Path,
    config: &ThumbnailConfig,
    manifest: &Mutex<CacheManifest>,
    stats: &Mutex<CacheStats>,
) -> ImageOutcome {
    let source = source_file(content_root, file);

    if !thumbnail::supports_thumbnails(&file.extension) {
        // SVG has no raster size; GIF dimensions are still useful.
        let dims = get_dimensions(backend, &source).ok();
        return ImageOutcome::Passthrough { dims };
    }

    match render_variants(backend, file, &source, thumbs_dir, config, manifest, stats) {
        Ok((dims, variants)) => ImageOutcome::Processed { dims, variants },
        Err(e) => {
            tracing::warn!(image = %file.path, error = %e, "thumbnail generation failed");
            ImageOutcome::Failed(e.to_string())
        }
    }
}

fn render_variants(
    backend: &impl ImageBackend,
    file: &ProjectFile,
    source: &Path,
    thumbs_dir: &Path,
    config: &ThumbnailConfig,
    manifest: &Mutex<CacheManifest>,
    stats: &Mutex<CacheStats>,
) -> Result<((u32, u32), Vec<VariantInfo>), BackendError> {
    let dims = get_dimensions(backend, source)?;
    let source_hash = cache::hash_file(source)?;
    let anchor = Anchor::from(file.crop());

    let small_edge = config.small_edge(dims);
    let sharpening = config.sharpening.map(|s| (s.sigma, s.threshold));
    let quality = config.quality.value();

    let mut variants = Vec::with_capacity(2);
    for variant in [Variant::Large, Variant::Small] {
        let params_hash = match variant {
            Variant::Large => cache::hash_large_params(config.large, quality),
            Variant::Small => cache::hash_small_params(small_edge, anchor, quality, sharpening),
        };
        let relative = thumbnail::thumbnail_path(&file.path, variant)
            .trim_start_matches('/')
            .to_string();
        let output = thumbs_dir.join(&relative);

        let status = cached_variant(manifest, &source_hash, &params_hash, &relative, thumbs_dir)?;
        let status = match status {
            Some(status) => status,
            None => {
                if let Some(parent) = output.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                match variant {
                    Variant::Large => create_large(backend, source, &output, dims, config)?,
                    Variant::Small => create_small(backend, source, &output, dims, anchor, config)?,
                }
                VariantStatus::Encoded
            }
        };

        lock(manifest).insert(relative, source_hash.clone(), params_hash);
        let mut stats = lock(stats);
        match status {
            VariantStatus::Cached => stats.hit(),
            VariantStatus::Copied => stats.copy(),
            VariantStatus::Encoded => stats.miss(),
        }
        variants.push(VariantInfo {
            label: match variant {
                Variant::Large => "large".to_string(),
                Variant::Small => "small".to_string(),
            },
            status,
        });
    }
    Ok((dims, variants))
}

/// Check the cache for a variant, copying a moved file into place.
/// `None` means the variant must be rendered.
fn cached_variant(
    manifest: &Mutex<CacheManifest>,
    source_hash: &str,
    params_hash: &str,
    relative: &str,
    thumbs_dir: &Path,
) -> Result<Option<VariantStatus>, BackendError> {
    let stored = lock(manifest).find_cached(source_hash, params_hash, thumbs_dir);
    match stored {
        Some(stored) if stored == relative => Ok(Some(VariantStatus::Cached)),
        Some(stored) => {
            let target = thumbs_dir.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(thumbs_dir.join(&stored), &target)?;
            Ok(Some(VariantStatus::Copied))
        }
        None => Ok(None),
    }
}

/// A poisoned lock only means another image panicked; the data is intact.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::scan::scan;
    use crate::test_helpers::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    /// Dimensions for every raster image in `setup_content`.
    fn fixture_backend() -> MockBackend {
        MockBackend::with_dimensions(&[
            ("a.png", 64, 48),
            ("b_r18.png", 48, 64),
            ("c.jpg", 32, 32),
            ("wallpaper.png", 80, 40),
        ])
    }

    fn run(
        backend: &MockBackend,
        content: &Path,
        thumbs: &Path,
        use_cache: bool,
    ) -> ProcessResult {
        let config = SiteConfig::default();
        let index = scan(content, &config).unwrap();
        process_with_backend(backend, index, content, thumbs, &config, use_cache, None).unwrap()
    }

    fn thumbnail_ops(backend: &MockBackend) -> Vec<RecordedOp> {
        backend
            .get_operations()
            .into_iter()
            .filter(|op| !matches!(op, RecordedOp::Identify(_)))
            .collect()
    }

    #[test]
    fn renders_two_variants_per_raster_image() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let backend = fixture_backend();

        let result = run(&backend, content.path(), thumbs.path(), true);

        // 4 raster images × (large + small); logo.svg is passed through
        assert_eq!(thumbnail_ops(&backend).len(), 8);
        assert_eq!(result.cache_stats.misses, 8);
        assert_eq!(result.failures, 0);
    }

    #[test]
    fn fills_in_dimensions() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let result = run(&fixture_backend(), content.path(), thumbs.path(), true);

        let poster = find_project(&result.index, "20250505_Friend_Big_Poster");
        assert_eq!(poster.images[0].width, Some(64));
        assert_eq!(poster.images[0].height, Some(48));
        assert_eq!(poster.images[1].width, Some(48));

        let sketches = find_project(&result.index, "Sketches");
        assert_eq!(sketches.images[0].width, None);
    }

    #[test]
    fn outputs_mirror_asset_urls() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let backend = fixture_backend();
        run(&backend, content.path(), thumbs.path(), true);

        let expected = thumbs
            .path()
            .join("assets/character/20250505_Friend_Big_Poster/a_thumb_large.jpg");
        let outputs: Vec<String> = thumbnail_ops(&backend)
            .into_iter()
            .map(|op| match op {
                RecordedOp::Resize { output, .. } | RecordedOp::Thumbnail { output, .. } => output,
                RecordedOp::Identify(_) => unreachable!(),
            })
            .collect();
        assert!(outputs.contains(&expected.to_string_lossy().to_string()));
    }

    #[test]
    fn small_variant_uses_crop_hint() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let backend = fixture_backend();
        run(&backend, content.path(), thumbs.path(), true);

        let anchors: Vec<(String, Anchor)> = thumbnail_ops(&backend)
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Thumbnail { source, anchor, .. } => Some((source, anchor)),
                _ => None,
            })
            .collect();
        let wallpaper = anchors
            .iter()
            .find(|(s, _)| s.ends_with("wallpaper.png"))
            .unwrap();
        assert_eq!(wallpaper.1, Anchor::Top);
        let cover = anchors.iter().find(|(s, _)| s.ends_with("a.png")).unwrap();
        assert_eq!(cover.1, Anchor::Center);
    }

    #[test]
    fn second_run_hits_cache() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let first = fixture_backend();
        run(&first, content.path(), thumbs.path(), true);

        // The mock writes nothing, so create the files it would have written
        for op in thumbnail_ops(&first) {
            if let RecordedOp::Resize { output, .. } | RecordedOp::Thumbnail { output, .. } = op {
                std::fs::create_dir_all(Path::new(&output).parent().unwrap()).unwrap();
                std::fs::write(&output, "jpeg").unwrap();
            }
        }

        let second = fixture_backend();
        let result = run(&second, content.path(), thumbs.path(), true);
        assert!(thumbnail_ops(&second).is_empty());
        assert_eq!(result.cache_stats.hits, 8);
    }

    #[test]
    fn no_cache_renders_everything_again() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let first = fixture_backend();
        run(&first, content.path(), thumbs.path(), true);
        for op in thumbnail_ops(&first) {
            if let RecordedOp::Resize { output, .. } | RecordedOp::Thumbnail { output, .. } = op {
                std::fs::create_dir_all(Path::new(&output).parent().unwrap()).unwrap();
                std::fs::write(&output, "jpeg").unwrap();
            }
        }

        let second = fixture_backend();
        let result = run(&second, content.path(), thumbs.path(), false);
        assert_eq!(thumbnail_ops(&second).len(), 8);
        assert_eq!(result.cache_stats.hits, 0);
    }

    #[test]
    fn failed_image_is_skipped_and_build_continues() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let backend = fixture_backend().fail_on("c.jpg");

        let result = run(&backend, content.path(), thumbs.path(), true);
        assert_eq!(result.failures, 1);
        // The other three images still get both variants
        assert_eq!(thumbnail_ops(&backend).len(), 6);
        let poster = find_project(&result.index, "20250505_Friend_Big_Poster");
        assert_eq!(poster.images[2].width, None);
    }

    #[test]
    fn unreadable_dimensions_count_as_failure() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(&[("a.png", 64, 48)]);

        let result = run(&backend, content.path(), thumbs.path(), true);
        assert_eq!(result.failures, 3);
    }

    #[test]
    fn events_arrive_in_image_order() {
        let content = setup_content();
        let thumbs = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let index = scan(content.path(), &config).unwrap();
        let (tx, rx) = mpsc::channel();

        process_with_backend(
            &fixture_backend(),
            index,
            content.path(),
            thumbs.path(),
            &config,
            true,
            Some(tx),
        )
        .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        // Empty project emits nothing: 3 projects + 5 images
        assert_eq!(events.len(), 8);
        assert!(matches!(
            &events[0],
            ProcessEvent::ProjectStarted { title, image_count: 1 } if title == "Sketches"
        ));
        assert!(matches!(&events[1], ProcessEvent::ImagePassthrough { name, .. } if name == "logo.svg"));
        let poster_indices: Vec<usize> = events[3..6]
            .iter()
            .map(|e| match e {
                ProcessEvent::ImageProcessed { index, .. } => *index,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(poster_indices, vec![1, 2, 3]);
    }

    #[test]
    fn index_round_trips_through_json_file() {
        let tmp = TempDir::new().unwrap();
        let index = ProjectIndex::new(vec![project("20250101_x", images(2))]);
        let path = tmp.path().join("nested/index.json");
        write_index(&index, &path).unwrap();
        assert_eq!(read_index(&path).unwrap(), index);
    }

    #[test]
    fn clean_removes_thumbs_dir() {
        let tmp = TempDir::new().unwrap();
        let thumbs = tmp.path().join("thumbs");
        std::fs::create_dir_all(thumbs.join("assets")).unwrap();
        clean(&thumbs).unwrap();
        assert!(!thumbs.exists());
        // Missing directory is fine
        clean(&thumbs).unwrap();
    }
}
