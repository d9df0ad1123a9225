//! Expression, mouth and gaze animation for one mounted avatar.
//!
//! The controller owns its engine. Time is passed in as `now` (time since
//! mount) and each [`AvatarController::tick`] is one animation frame: due
//! one-shot events run first, then the two periodic checks, then one step
//! of mouth and head smoothing.

use super::engine::{AvatarEngine, EngineError};
use super::params::{
    CanvasRect, HEAD_THRESHOLD, IDLE_MOUTH, MOUTH_PALETTE, MOUTH_THRESHOLD, MouthShape,
    PARAM_ANGLE_X, PARAM_ANGLE_Y, PARAM_EYE_BALL_X, PARAM_EYE_BALL_Y, PARAM_MOUTH_FORM,
    PARAM_MOUTH_OPEN_Y, Placement, Smoothed, Viewport, eye_parameters, head_parameters,
    normalize_pointer, place_model,
};
use super::tasks::{Interval, Schedule};
use crate::config::AvatarConfig;
use rand::Rng;
use std::time::Duration;

pub const INITIAL_SMILE_DELAY: Duration = Duration::from_millis(1000);
/// Gap between clearing the old expression and playing the new one.
pub const EXPRESSION_DELAY: Duration = Duration::from_millis(100);
/// How long an expression holds before the mouth returns to idle.
pub const MOUTH_RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq)]
enum Event {
    IdleMouth,
    PlayExpression(String),
}

pub struct AvatarController<E: AvatarEngine, R: Rng> {
    engine: E,
    rng: R,
    config: AvatarConfig,
    mounted: bool,
    mouth: Smoothed,
    head: Smoothed,
    mouth_timer: Interval,
    expression_timer: Interval,
    last_mouth_change: Duration,
    last_expression: Duration,
    events: Schedule<Event>,
}

impl<E: AvatarEngine, R: Rng> AvatarController<E, R> {
    /// Start animating a freshly loaded model. Both periodic timers and the
    /// "last change" clocks start at `now`.
    pub fn start(engine: E, rng: R, config: AvatarConfig, now: Duration) -> Self {
        let idle = (IDLE_MOUTH.form, IDLE_MOUTH.open);
        let mut events = Schedule::new();
        events.after(now, INITIAL_SMILE_DELAY, Event::IdleMouth);
        Self {
            mouth: Smoothed::new(idle, config.mouth_lerp, MOUTH_THRESHOLD),
            head: Smoothed::new((0.0, 0.0), config.head_lerp, HEAD_THRESHOLD),
            mouth_timer: Interval::start(Duration::from_millis(config.mouth_check_ms), now),
            expression_timer: Interval::start(
                Duration::from_millis(config.expression_check_ms),
                now,
            ),
            last_mouth_change: now,
            last_expression: now,
            engine,
            rng,
            config,
            mounted: true,
            events,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current (smoothed) mouth shape.
    pub fn mouth(&self) -> MouthShape {
        MouthShape::new(self.mouth.current.0, self.mouth.current.1)
    }

    pub fn mouth_target(&self) -> MouthShape {
        MouthShape::new(self.mouth.target.0, self.mouth.target.1)
    }

    /// Current (smoothed) head offset.
    pub fn head(&self) -> (f32, f32) {
        self.head.current
    }

    /// One animation frame. Does nothing once stopped.
    pub fn tick(&mut self, now: Duration) -> Result<(), EngineError> {
        if !self.mounted {
            return Ok(());
        }

        for event in self.events.due(now) {
            self.run(event, now)?;
        }

        if self.mouth_timer.poll(now)
            && now.saturating_sub(self.last_mouth_change)
                > Duration::from_millis(self.config.mouth_change_after_ms)
        {
            let shape = MOUTH_PALETTE[self.rng.gen_range(0..MOUTH_PALETTE.len())];
            self.mouth.target = (shape.form, shape.open);
            self.last_mouth_change = now;
        }

        if self.expression_timer.poll(now)
            && now.saturating_sub(self.last_expression)
                > Duration::from_millis(self.config.expression_change_after_ms)
            && !self.config.expressions.is_empty()
        {
            self.last_expression = now;
            self.engine.play_expression(None)?;
            let pick = self.rng.gen_range(0..self.config.expressions.len());
            let name = self.config.expressions[pick].clone();
            self.events
                .after(now, EXPRESSION_DELAY, Event::PlayExpression(name));
        }

        if let Some((form, open)) = self.mouth.step() {
            self.write_mouth(form, open)?;
        }
        if let Some(offset) = self.head.step() {
            let (x, y) = head_parameters(offset);
            self.engine.set_parameter(PARAM_ANGLE_X, x)?;
            self.engine.set_parameter(PARAM_ANGLE_Y, y)?;
        }
        Ok(())
    }

    fn run(&mut self, event: Event, now: Duration) -> Result<(), EngineError> {
        match event {
            Event::IdleMouth => {
                // Target too, so the next frame's lerp does not drag the
                // mouth back toward the pre-expression drift shape.
                self.mouth.snap((IDLE_MOUTH.form, IDLE_MOUTH.open));
                self.write_mouth(IDLE_MOUTH.form, IDLE_MOUTH.open)
            }
            Event::PlayExpression(name) => {
                self.engine.play_expression(Some(&name))?;
                self.events.after(now, MOUTH_RESET_DELAY, Event::IdleMouth);
                Ok(())
            }
        }
    }

    fn write_mouth(&mut self, form: f32, open: f32) -> Result<(), EngineError> {
        self.engine.set_parameter(PARAM_MOUTH_FORM, form)?;
        self.engine.set_parameter(PARAM_MOUTH_OPEN_Y, open)
    }

    /// Pointer moved to a normalized offset. Eyes follow at once; the head
    /// eases toward it over the following frames.
    pub fn look_at(&mut self, offset: (f32, f32)) -> Result<(), EngineError> {
        if !self.mounted {
            return Ok(());
        }
        let (x, y) = eye_parameters(offset);
        self.engine.set_parameter(PARAM_EYE_BALL_X, x)?;
        self.engine.set_parameter(PARAM_EYE_BALL_Y, y)?;
        self.head.target = offset;
        Ok(())
    }

    /// Pointer moved to client coordinates `(x, y)` over `rect`.
    pub fn pointer(&mut self, x: f32, y: f32, rect: CanvasRect) -> Result<(), EngineError> {
        self.look_at(normalize_pointer(x, y, rect))
    }

    /// Fit the model into `viewport`. `Ok(None)` when stopped or the
    /// viewport has no area yet.
    pub fn place(&mut self, viewport: Viewport) -> Result<Option<Placement>, EngineError> {
        if !self.mounted {
            return Ok(None);
        }
        let Some(placement) = place_model(viewport) else {
            return Ok(None);
        };
        self.engine.place(&placement, viewport)?;
        Ok(Some(placement))
    }

    /// Stop every timer, drop pending events and dispose the engine.
    /// Calling it again is a no-op.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;
        self.mouth_timer.stop();
        self.expression_timer.stop();
        self.events.clear();
        self.engine.dispose()
    }
}
