//! The capability interface to the rendering engine.
//!
//! The avatar is drawn by an external rigging/rendering library. Everything
//! the controller needs from it goes through [`AvatarEngine`], and every
//! call reports failure as an [`EngineError`] instead of swallowing it.

use super::params::{Placement, Viewport};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("model failed to load: {0}")]
    Load(String),
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("expression '{0}' failed: {1}")]
    Expression(String, String),
    #[error("engine already disposed")]
    Disposed,
    #[error("renderer error: {0}")]
    Renderer(String),
}

/// Narrow interface over a loaded, rigged 2D model.
pub trait AvatarEngine {
    /// Write one model parameter, e.g. `PARAM_MOUTH_FORM`.
    fn set_parameter(&mut self, id: &str, value: f32) -> Result<(), EngineError>;

    /// Play a named expression; `None` clears the current one.
    fn play_expression(&mut self, name: Option<&str>) -> Result<(), EngineError>;

    /// Position the model and resize the renderer to `viewport`.
    fn place(&mut self, placement: &Placement, viewport: Viewport) -> Result<(), EngineError>;

    /// Destroy the renderer and release the canvas.
    fn dispose(&mut self) -> Result<(), EngineError>;
}
