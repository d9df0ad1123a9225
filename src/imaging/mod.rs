//! Image processing: pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Large thumbnail** | Lanczos3 resize (long edge capped) → JPEG |
//! | **Small thumbnail** | fill resize + anchored square crop + `unsharpen` → JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use operations::{ThumbnailConfig, create_large, create_small, get_dimensions};
pub use params::{Anchor, Quality, Sharpening};
pub use rust_backend::RustBackend;
