//! Thumbnail planning and execution.
//!
//! `plan_*` turn the thumbnail settings and source size into backend
//! parameters; `create_*` hand them to an [`ImageBackend`].

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_fit_dimensions, calculate_square_edge};
use super::params::{Anchor, Quality, ResizeParams, Sharpening, ThumbnailParams};
use crate::config::ThumbnailsConfig;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Long edge of the large variant.
    pub large: u32,
    /// Edge of the square small variant.
    pub small: u32,
    pub quality: Quality,
    /// Applied to the small variant only.
    pub sharpening: Option<Sharpening>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self::from(&ThumbnailsConfig::default())
    }
}

impl From<&ThumbnailsConfig> for ThumbnailConfig {
    fn from(config: &ThumbnailsConfig) -> Self {
        Self {
            large: config.large,
            small: config.small,
            quality: Quality::new(config.quality),
            sharpening: Some(Sharpening::light()),
        }
    }
}

impl ThumbnailConfig {
    /// Edge of the small variant for an image of `original_dims`.
    pub fn small_edge(&self, original_dims: (u32, u32)) -> u32 {
        calculate_square_edge(original_dims, self.small)
    }
}

/// Plan the large variant: the whole image, long edge capped at `config.large`.
pub fn plan_large(
    source: &Path,
    output_path: &Path,
    original_dims: (u32, u32),
    config: &ThumbnailConfig,
) -> ResizeParams {
    let (width, height) = calculate_fit_dimensions(original_dims, config.large);
    ResizeParams {
        source: source.to_path_buf(),
        output: output_path.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Plan the small variant: a square cover crop at `anchor`.
pub fn plan_small(
    source: &Path,
    output_path: &Path,
    original_dims: (u32, u32),
    anchor: Anchor,
    config: &ThumbnailConfig,
) -> ThumbnailParams {
    let edge = config.small_edge(original_dims);
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output_path.to_path_buf(),
        crop_width: edge,
        crop_height: edge,
        anchor,
        quality: config.quality,
        sharpening: config.sharpening,
    }
}

/// Write the large variant to `output_path`.
pub fn create_large(
    backend: &impl ImageBackend,
    source: &Path,
    output_path: &Path,
    original_dims: (u32, u32),
    config: &ThumbnailConfig,
) -> Result<()> {
    backend.resize(&plan_large(source, output_path, original_dims, config))
}

/// Write the small variant to `output_path`.
pub fn create_small(
    backend: &impl ImageBackend,
    source: &Path,
    output_path: &Path,
    original_dims: (u32, u32),
    anchor: Anchor,
    config: &ThumbnailConfig,
) -> Result<()> {
    backend.thumbnail(&plan_small(
        source,
        output_path,
        original_dims,
        anchor,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(&[("test.png", 1920, 1080)]);

        let dims = get_dimensions(&backend, Path::new("/test.png")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn default_config_matches_stock_thumbnails() {
        let config = ThumbnailConfig::default();
        assert_eq!(config.large, 1200);
        assert_eq!(config.small, 400);
        assert_eq!(config.quality.value(), 80);
        assert!(config.sharpening.is_some());
    }

    #[test]
    fn config_from_site_settings() {
        let config = ThumbnailConfig::from(&ThumbnailsConfig {
            large: 2000,
            small: 300,
            quality: 150,
        });
        assert_eq!(config.large, 2000);
        assert_eq!(config.small, 300);
        assert_eq!(config.quality.value(), 100);
    }

    #[test]
    fn plan_large_caps_long_edge() {
        let params = plan_large(
            Path::new("/a.png"),
            Path::new("/a_thumb_large.jpg"),
            (3000, 2000),
            &ThumbnailConfig::default(),
        );
        assert_eq!((params.width, params.height), (1200, 800));
        assert_eq!(params.quality.value(), 80);
    }

    #[test]
    fn plan_large_keeps_small_images() {
        let params = plan_large(
            Path::new("/a.png"),
            Path::new("/a_thumb_large.jpg"),
            (640, 480),
            &ThumbnailConfig::default(),
        );
        assert_eq!((params.width, params.height), (640, 480));
    }

    #[test]
    fn plan_small_is_square() {
        let params = plan_small(
            Path::new("/a.png"),
            Path::new("/a_thumb_small.jpg"),
            (1920, 1080),
            Anchor::Center,
            &ThumbnailConfig::default(),
        );
        assert_eq!(params.crop_width, 400);
        assert_eq!(params.crop_height, 400);
        assert_eq!(params.sharpening, Some(Sharpening::light()));
    }

    #[test]
    fn plan_small_limited_by_short_side() {
        let params = plan_small(
            Path::new("/a.png"),
            Path::new("/a_thumb_small.jpg"),
            (300, 120),
            Anchor::Top,
            &ThumbnailConfig::default(),
        );
        assert_eq!(params.crop_width, 120);
        assert_eq!(params.anchor, Anchor::Top);
    }

    #[test]
    fn create_large_and_small_call_backend() {
        let backend = MockBackend::new();
        let config = ThumbnailConfig::default();
        create_large(
            &backend,
            Path::new("/src/a.png"),
            Path::new("/out/a_thumb_large.jpg"),
            (2400, 1200),
            &config,
        )
        .unwrap();
        create_small(
            &backend,
            Path::new("/src/a.png"),
            Path::new("/out/a_thumb_small.jpg"),
            (2400, 1200),
            Anchor::Top,
            &config,
        )
        .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize { width: 1200, height: 600, output, .. }
                if output == "/out/a_thumb_large.jpg"
        ));
        assert!(matches!(
            &ops[1],
            RecordedOp::Thumbnail {
                crop_width: 400,
                anchor: Anchor::Top,
                ..
            }
        ));
    }
}
