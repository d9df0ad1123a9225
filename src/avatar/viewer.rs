//! Mount/unmount lifecycle around an [`AvatarController`].
//!
//! A viewer holds at most one live controller. Mounting again disposes the
//! previous engine before the new one takes over. Resize notifications from
//! the window and from the container observer share one debounce timer, so
//! a burst of them re-places the model once.

use super::controller::AvatarController;
use super::engine::{AvatarEngine, EngineError};
use super::params::{CanvasRect, Viewport};
use super::tasks::Debouncer;
use crate::config::AvatarConfig;
use rand::Rng;
use std::time::Duration;

/// Quiet period for container size changes.
pub const OBSERVER_DEBOUNCE: Duration = Duration::from_millis(100);

pub struct AvatarViewer<E: AvatarEngine, R: Rng> {
    config: AvatarConfig,
    controller: Option<AvatarController<E, R>>,
    viewport: Option<Viewport>,
    resize: Debouncer<Viewport>,
}

impl<E: AvatarEngine, R: Rng> AvatarViewer<E, R> {
    pub fn new(config: AvatarConfig) -> Self {
        Self {
            config,
            controller: None,
            viewport: None,
            resize: Debouncer::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.controller.is_some()
    }

    /// Viewport the model was last placed in.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn controller(&self) -> Option<&AvatarController<E, R>> {
        self.controller.as_ref()
    }

    /// Take over a loaded engine. Any previous instance is disposed first.
    /// A viewport without area leaves the model unplaced until a resize.
    pub fn mount(
        &mut self,
        engine: E,
        rng: R,
        viewport: Viewport,
        now: Duration,
    ) -> Result<(), EngineError> {
        self.unmount()?;
        let mut controller = AvatarController::start(engine, rng, self.config.clone(), now);
        let placed = controller.place(viewport);
        self.controller = Some(controller);
        if placed?.is_some() {
            self.viewport = Some(viewport);
        }
        tracing::debug!(width = viewport.width, height = viewport.height, "avatar mounted");
        Ok(())
    }

    /// Stop the controller and dispose its engine. Safe to call when
    /// nothing is mounted.
    pub fn unmount(&mut self) -> Result<(), EngineError> {
        self.resize.cancel();
        self.viewport = None;
        match self.controller.take() {
            Some(mut controller) => controller.stop(),
            None => Ok(()),
        }
    }

    /// Window resize: re-place after the configured quiet period.
    pub fn window_resized(&mut self, viewport: Viewport, now: Duration) {
        if self.is_mounted() {
            let quiet = Duration::from_millis(self.config.resize_debounce_ms);
            self.resize.push(viewport, now, quiet);
        }
    }

    /// Container size observed to change.
    pub fn container_resized(&mut self, viewport: Viewport, now: Duration) {
        if self.is_mounted() {
            self.resize.push(viewport, now, OBSERVER_DEBOUNCE);
        }
    }

    pub fn pointer(&mut self, x: f32, y: f32, rect: CanvasRect) -> Result<(), EngineError> {
        match self.controller.as_mut() {
            Some(controller) => controller.pointer(x, y, rect),
            None => Ok(()),
        }
    }

    /// One animation frame: apply a settled resize, then animate.
    pub fn tick(&mut self, now: Duration) -> Result<(), EngineError> {
        let Some(controller) = self.controller.as_mut() else {
            return Ok(());
        };
        if let Some(viewport) = self.resize.poll(now)
            && controller.place(viewport)?.is_some()
        {
            self.viewport = Some(viewport);
        }
        controller.tick(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::engine::tests::{EngineCall, RecordingEngine};
    use crate::avatar::params::PARAM_MOUTH_FORM;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn vp(width: f32, height: f32) -> Viewport {
        Viewport { width, height }
    }

    fn viewer() -> AvatarViewer<RecordingEngine, StdRng> {
        AvatarViewer::new(AvatarConfig::default())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn places(engine: &RecordingEngine) -> Vec<(f32, f32)> {
        engine
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Place { width, height, .. } => Some((width, height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn mount_places_model() {
        let mut v = viewer();
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(800.0, 600.0), ms(0)).unwrap();
        assert!(v.is_mounted());
        assert_eq!(v.viewport(), Some(vp(800.0, 600.0)));
        assert_eq!(places(&engine), vec![(800.0, 600.0)]);
    }

    #[test]
    fn mount_with_empty_viewport_waits_for_resize() {
        let mut v = viewer();
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(0.0, 0.0), ms(0)).unwrap();
        assert!(v.is_mounted());
        assert_eq!(v.viewport(), None);
        assert!(places(&engine).is_empty());

        v.container_resized(vp(640.0, 480.0), ms(50));
        v.tick(ms(150)).unwrap();
        assert_eq!(v.viewport(), Some(vp(640.0, 480.0)));
    }

    #[test]
    fn unmount_disposes_and_stops_ticks() {
        let mut v = viewer();
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(800.0, 600.0), ms(0)).unwrap();
        v.unmount().unwrap();
        assert!(!v.is_mounted());
        assert_eq!(engine.dispose_count(), 1);

        let before = engine.calls().len();
        v.tick(ms(1000)).unwrap();
        v.tick(ms(20_000)).unwrap();
        assert_eq!(engine.calls().len(), before);
        assert_eq!(engine.parameter(PARAM_MOUTH_FORM), None);
    }

    #[test]
    fn unmount_twice_is_harmless() {
        let mut v = viewer();
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(800.0, 600.0), ms(0)).unwrap();
        v.unmount().unwrap();
        v.unmount().unwrap();
        assert_eq!(engine.dispose_count(), 1);
    }

    #[test]
    fn remount_disposes_previous_engine_once() {
        let mut v = viewer();
        let first = RecordingEngine::new();
        let second = RecordingEngine::new();
        v.mount(first.clone(), rng(), vp(800.0, 600.0), ms(0)).unwrap();
        v.mount(second.clone(), rng(), vp(400.0, 300.0), ms(500)).unwrap();

        assert_eq!(first.dispose_count(), 1);
        assert_eq!(second.dispose_count(), 0);
        assert_eq!(v.viewport(), Some(vp(400.0, 300.0)));

        // Only the new engine animates
        let first_calls = first.calls().len();
        v.tick(ms(1500)).unwrap();
        assert_eq!(first.calls().len(), first_calls);
        assert_eq!(second.parameter(PARAM_MOUTH_FORM), Some(0.3));
    }

    #[test]
    fn resize_events_are_coalesced() {
        let mut v = viewer();
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(800.0, 600.0), ms(0)).unwrap();

        v.window_resized(vp(700.0, 600.0), ms(100));
        v.tick(ms(116)).unwrap();
        v.window_resized(vp(600.0, 600.0), ms(130));
        v.container_resized(vp(500.0, 600.0), ms(160));
        v.tick(ms(200)).unwrap();
        assert_eq!(places(&engine).len(), 1);

        v.tick(ms(260)).unwrap();
        assert_eq!(places(&engine), vec![(800.0, 600.0), (500.0, 600.0)]);
        assert_eq!(v.viewport(), Some(vp(500.0, 600.0)));
    }

    #[test]
    fn pending_resize_dropped_on_unmount() {
        let mut v = viewer();
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(800.0, 600.0), ms(0)).unwrap();
        v.window_resized(vp(300.0, 300.0), ms(10));
        v.unmount().unwrap();
        v.tick(ms(500)).unwrap();
        assert_eq!(places(&engine).len(), 1);
    }

    #[test]
    fn resize_before_mount_is_ignored() {
        let mut v = viewer();
        v.window_resized(vp(300.0, 300.0), ms(0));
        let engine = RecordingEngine::new();
        v.mount(engine.clone(), rng(), vp(800.0, 600.0), ms(10)).unwrap();
        v.tick(ms(1000)).unwrap();
        assert_eq!(places(&engine), vec![(800.0, 600.0)]);
    }

    #[test]
    fn pointer_without_mount_is_noop() {
        let mut v = viewer();
        let rect = CanvasRect {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
        };
        assert!(v.pointer(10.0, 10.0, rect).is_ok());
    }
}
