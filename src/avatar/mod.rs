//! The interactive avatar on the character page.
//!
//! | Module | Role |
//! |---|---|
//! | [`engine`] | [`AvatarEngine`] capability trait over the rendering library |
//! | [`params`] | Parameter ids, mouth palette, smoothing, placement math |
//! | [`tasks`] | Timestamp-driven [`Interval`], [`Debouncer`], [`Schedule`] |
//! | [`controller`] | Mouth drift, expression cycle and gaze for one model |
//! | [`viewer`] | Mount/unmount lifecycle and debounced resizing |
//!
//! The generator embeds [`bootstrap_json`] on the page so `static/avatar.js`
//! animates the model with the same constants the controller is tested with.

pub mod controller;
pub mod engine;
pub mod params;
pub mod tasks;
pub mod viewer;

pub use controller::AvatarController;
pub use engine::{AvatarEngine, EngineError};
pub use params::{CanvasRect, MouthShape, Placement, Viewport, place_model};
pub use tasks::{Debouncer, Interval, Schedule};
pub use viewer::AvatarViewer;

use crate::config::AvatarConfig;
use serde::Serialize;

/// Everything the browser glue needs to drive the model.
#[derive(Debug, Serialize)]
pub struct Bootstrap<'a> {
    #[serde(flatten)]
    pub config: &'a AvatarConfig,
    pub idle_mouth: MouthShape,
    pub mouth_palette: &'static [MouthShape],
    pub mouth_threshold: f32,
    pub head_threshold: f32,
    pub head_angle_range: f32,
    pub eye_range: f32,
    pub initial_smile_ms: u64,
    pub expression_delay_ms: u64,
    pub mouth_reset_ms: u64,
    pub observer_debounce_ms: u64,
    pub model_size: Viewport,
    pub scale_factor: f32,
    pub padding_factor: f32,
    pub max_scale: f32,
    pub y_offset: f32,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a AvatarConfig) -> Self {
        Self {
            config,
            idle_mouth: params::IDLE_MOUTH,
            mouth_palette: &params::MOUTH_PALETTE,
            mouth_threshold: params::MOUTH_THRESHOLD,
            head_threshold: params::HEAD_THRESHOLD,
            head_angle_range: params::HEAD_ANGLE_RANGE,
            eye_range: params::EYE_RANGE,
            initial_smile_ms: controller::INITIAL_SMILE_DELAY.as_millis() as u64,
            expression_delay_ms: controller::EXPRESSION_DELAY.as_millis() as u64,
            mouth_reset_ms: controller::MOUTH_RESET_DELAY.as_millis() as u64,
            observer_debounce_ms: viewer::OBSERVER_DEBOUNCE.as_millis() as u64,
            model_size: params::MODEL_SIZE,
            scale_factor: params::SCALE_FACTOR,
            padding_factor: params::PADDING_FACTOR,
            max_scale: params::MAX_SCALE,
            y_offset: params::Y_OFFSET,
        }
    }
}

/// JSON for the avatar mount's `data-config` attribute.
pub fn bootstrap_json(config: &AvatarConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Bootstrap::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_carries_config_and_constants() {
        let json = bootstrap_json(&AvatarConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["model"],
            "/assets/about/chiakiL2Dv2/chiaki.model3.json"
        );
        assert_eq!(value["expressions"].as_array().unwrap().len(), 3);
        assert_eq!(value["mouth_check_ms"], 500);
        assert_eq!(value["mouth_palette"].as_array().unwrap().len(), 10);
        assert_eq!(value["initial_smile_ms"], 1000);
        assert_eq!(value["model_size"]["width"], 774.0);
        assert_eq!(value["y_offset"], 2300.0);
    }

    #[test]
    fn bootstrap_reflects_overrides() {
        let config = AvatarConfig {
            expressions: vec!["wave.exp3.json".into()],
            resize_debounce_ms: 300,
            ..AvatarConfig::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&bootstrap_json(&config).unwrap()).unwrap();
        assert_eq!(value["expressions"][0], "wave.exp3.json");
        assert_eq!(value["resize_debounce_ms"], 300);
    }
}
