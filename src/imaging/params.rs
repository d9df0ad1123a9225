//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what thumbnails to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 80). Clamped on construction.
//! - [`Sharpening`]: Unsharp-mask parameters (sigma + threshold) for small-thumbnail crispness.
//! - [`Anchor`]: Which part of the image survives a cover crop.
//! - [`ResizeParams`]: A plain resize: source, output path, target dimensions, quality.
//! - [`ThumbnailParams`]: A cover crop: source, output, crop dimensions, anchor, quality, optional sharpening.

use crate::index::CropPosition;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening suitable for thumbnails.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// Vertical anchor of a cover crop. Horizontally the crop is always centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    Top,
    #[default]
    Center,
}

impl From<CropPosition> for Anchor {
    fn from(crop: CropPosition) -> Self {
        match crop {
            CropPosition::Top => Anchor::Top,
            CropPosition::Center => Anchor::Center,
        }
    }
}

/// Parameters for a simple resize operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// Parameters for a thumbnail operation (fill resize + anchored crop).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Final crop dimensions.
    pub crop_width: u32,
    pub crop_height: u32,
    pub anchor: Anchor,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}
