//! The seam between thumbnail planning and pixel work.
//!
//! [`RustBackend`](super::rust_backend::RustBackend) is the only production
//! implementation. Tests use [`tests::MockBackend`].

use super::params::{ResizeParams, ThumbnailParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel size reported by [`ImageBackend::identify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Image operations used by the thumbs stage.
///
/// `Sync` because images are processed on the rayon pool.
pub trait ImageBackend: Sync {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resample to exactly `width`x`height` and encode (large thumbnail).
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Cover-resize, crop at the anchor and encode (small thumbnail).
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
