//! Model parameters, the mouth palette, smoothing and placement math.
//!
//! All functions here are pure and testable without an engine.

use serde::Serialize;

pub const PARAM_MOUTH_FORM: &str = "PARAM_MOUTH_FORM";
pub const PARAM_MOUTH_OPEN_Y: &str = "PARAM_MOUTH_OPEN_Y";
pub const PARAM_ANGLE_X: &str = "PARAM_ANGLE_X";
pub const PARAM_ANGLE_Y: &str = "PARAM_ANGLE_Y";
pub const PARAM_EYE_BALL_X: &str = "PARAM_EYE_BALL_X";
pub const PARAM_EYE_BALL_Y: &str = "PARAM_EYE_BALL_Y";

/// Head angle in degrees per unit of normalized pointer offset.
pub const HEAD_ANGLE_RANGE: f32 = 25.0;
/// Eye ball travel per unit of normalized pointer offset.
pub const EYE_RANGE: f32 = 2.0;

/// Below these distances the smoothed value is considered arrived.
pub const MOUTH_THRESHOLD: f32 = 0.01;
pub const HEAD_THRESHOLD: f32 = 0.05;

/// A mouth shape: `(PARAM_MOUTH_FORM, PARAM_MOUTH_OPEN_Y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MouthShape {
    pub form: f32,
    pub open: f32,
}

impl MouthShape {
    pub const fn new(form: f32, open: f32) -> Self {
        Self { form, open }
    }
}

/// Resting smile, also the target after every expression.
pub const IDLE_MOUTH: MouthShape = MouthShape::new(0.3, 0.0);

/// Shapes the idle drift picks from.
pub const MOUTH_PALETTE: [MouthShape; 10] = [
    MouthShape::new(0.3, 0.0),
    MouthShape::new(0.6, 0.0),
    MouthShape::new(0.9, 0.2),
    MouthShape::new(0.2, 0.3),
    MouthShape::new(0.1, 0.5),
    MouthShape::new(0.0, 0.8),
    MouthShape::new(-0.2, 1.0),
    MouthShape::new(0.8, 0.6),
    MouthShape::new(0.0, 0.0),
    MouthShape::new(0.4, 0.1),
];

/// A 2D value moved a fixed fraction toward its target each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    pub current: (f32, f32),
    pub target: (f32, f32),
    factor: f32,
    threshold: f32,
}

impl Smoothed {
    pub fn new(start: (f32, f32), factor: f32, threshold: f32) -> Self {
        Self {
            current: start,
            target: start,
            factor,
            threshold,
        }
    }

    pub fn distance(&self) -> f32 {
        let dx = self.target.0 - self.current.0;
        let dy = self.target.1 - self.current.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Advance one frame. Returns the new value, or `None` when already
    /// within the threshold (nothing to write).
    pub fn step(&mut self) -> Option<(f32, f32)> {
        if self.distance() <= self.threshold {
            return None;
        }
        self.current.0 += (self.target.0 - self.current.0) * self.factor;
        self.current.1 += (self.target.1 - self.current.1) * self.factor;
        Some(self.current)
    }

    /// Jump to `value` and stop moving.
    pub fn snap(&mut self, value: (f32, f32)) {
        self.current = value;
        self.target = value;
    }
}

/// Canvas bounding rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Pointer position → offset from the canvas center, each axis in
/// `[-0.5, 0.5]` while inside the canvas.
pub fn normalize_pointer(x: f32, y: f32, rect: CanvasRect) -> (f32, f32) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return (0.0, 0.0);
    }
    (
        (x - rect.left) / rect.width - 0.5,
        (y - rect.top) / rect.height - 0.5,
    )
}

/// Eye parameters for a normalized offset. Y is inverted (screen y grows down).
pub fn eye_parameters(offset: (f32, f32)) -> (f32, f32) {
    (offset.0 * EYE_RANGE, -offset.1 * EYE_RANGE)
}

/// Head angle parameters for a smoothed offset.
pub fn head_parameters(offset: (f32, f32)) -> (f32, f32) {
    (offset.0 * HEAD_ANGLE_RANGE, -offset.1 * HEAD_ANGLE_RANGE)
}

/// Container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Native size of the model artwork.
pub const MODEL_SIZE: Viewport = Viewport {
    width: 774.0,
    height: 1593.0,
};
pub const SCALE_FACTOR: f32 = 0.3;
pub const PADDING_FACTOR: f32 = 0.8;
pub const MAX_SCALE: f32 = 0.25;
/// Vertical offset, in model units, that frames the upper body.
pub const Y_OFFSET: f32 = 2300.0;

/// Where and how large the model is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub scale: f32,
    pub anchor: (f32, f32),
    pub x: f32,
    pub y: f32,
}

/// Fit the model into `viewport`: horizontally centered, anchored at its top
/// edge, scaled by the tighter axis and capped at [`MAX_SCALE`].
///
/// Returns `None` for an empty viewport (not laid out yet).
pub fn place_model(viewport: Viewport) -> Option<Placement> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let by_width = viewport.width / MODEL_SIZE.width * SCALE_FACTOR;
    let by_height = viewport.height / MODEL_SIZE.height * SCALE_FACTOR;
    let scale = (by_width.min(by_height) * PADDING_FACTOR).min(MAX_SCALE);
    Some(Placement {
        scale,
        anchor: (0.5, 0.0),
        x: viewport.width / 2.0,
        y: -scale * Y_OFFSET,
    })
}
