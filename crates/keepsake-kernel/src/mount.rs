//! Animator lifecycle: mounting onto a surface, resizing, and teardown.
//!
//! [`mount`] acquires a canvas sized to the surface fit, builds the
//! animator, and wires exactly one frame callback and one resize listener.
//! The returned [`AnimatorHandle`] is the only way to stop it again.
//!
//! When the canvas cannot be acquired the handle is inert: nothing is
//! registered and unmounting it is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keepsake_common::{AnimatorId, SurfaceError, SurfaceSize};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animator::{AnimatorConfig, AnimatorStats, ParticleAnimator};
use crate::canvas::Canvas;
use crate::rng::RandomSource;
use crate::schedule::{FrameScheduler, FrameToken, ListenerToken, ResizeSource};

/// How a backdrop surface is sized relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SurfaceFit {
    /// Cover the whole viewport.
    Viewport,
    /// Cover a fraction of the viewport, as a section container does.
    Container {
        /// Fraction of the viewport width.
        width_ratio: f32,
        /// Fraction of the viewport height.
        height_ratio: f32,
    },
}

impl Default for SurfaceFit {
    fn default() -> Self {
        Self::Viewport
    }
}

impl SurfaceFit {
    /// Surface size for the given viewport size.
    #[must_use]
    pub fn resolve(self, viewport: SurfaceSize) -> SurfaceSize {
        match self {
            Self::Viewport => viewport,
            Self::Container {
                width_ratio,
                height_ratio,
            } => viewport.scaled(width_ratio, height_ratio),
        }
    }
}

/// Animator state shared between its frame callback and its handle.
pub type SharedAnimator<C, R> = Arc<Mutex<ParticleAnimator<C, R>>>;

struct Mounted<C, R> {
    animator: SharedAnimator<C, R>,
    active: Arc<AtomicBool>,
    frame_token: FrameToken,
    listener_token: ListenerToken,
}

/// Handle to a mounted animator.
pub struct AnimatorHandle<C, R> {
    id: AnimatorId,
    mounted: Option<Mounted<C, R>>,
}

impl<C, R> std::fmt::Debug for AnimatorHandle<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatorHandle")
            .field("id", &self.id)
            .field("active", &self.mounted.is_some())
            .finish()
    }
}

/// Mount an animator.
///
/// `acquire` is called once with the fitted surface size. If it fails, the
/// returned handle is inert and nothing is scheduled.
pub fn mount<C, R, A>(
    config: AnimatorConfig,
    fit: SurfaceFit,
    acquire: A,
    rng: R,
    scheduler: &mut dyn FrameScheduler,
    resize_source: &mut dyn ResizeSource,
) -> AnimatorHandle<C, R>
where
    C: Canvas + 'static,
    R: RandomSource + 'static,
    A: FnOnce(SurfaceSize) -> Result<C, SurfaceError>,
{
    let id = AnimatorId::new();
    let size = fit.resolve(resize_source.size());
    let canvas = match acquire(size) {
        Ok(canvas) => canvas,
        Err(e) => {
            debug!("Animator {id:?} not started: {e}");
            return AnimatorHandle { id, mounted: None };
        },
    };

    let animator = Arc::new(Mutex::new(ParticleAnimator::new(config, canvas, rng)));
    let active = Arc::new(AtomicBool::new(true));

    let frame_animator = Arc::clone(&animator);
    let frame_active = Arc::clone(&active);
    let frame_token = scheduler.register(Box::new(move |timestamp_ms| {
        if frame_active.load(Ordering::Acquire) {
            frame_animator.lock().frame(timestamp_ms);
        }
    }));

    let resize_animator = Arc::clone(&animator);
    let resize_active = Arc::clone(&active);
    let listener_token = resize_source.subscribe(Box::new(move |viewport| {
        if resize_active.load(Ordering::Acquire) {
            resize_animator.lock().resize(fit.resolve(viewport));
        }
    }));

    debug!(
        "Mounted {:?} animator {id:?} at {size} ({fit:?})",
        config.variant
    );
    AnimatorHandle {
        id,
        mounted: Some(Mounted {
            animator,
            active,
            frame_token,
            listener_token,
        }),
    }
}

impl<C: Canvas, R: RandomSource> AnimatorHandle<C, R> {
    /// Handle identifier.
    #[must_use]
    pub fn id(&self) -> AnimatorId {
        self.id
    }

    /// True if the animator was started.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mounted.is_some()
    }

    /// Live particle count, zero for an inert handle.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.with_animator(|a| a.live_count()).unwrap_or(0)
    }

    /// History counters, `None` for an inert handle.
    #[must_use]
    pub fn stats(&self) -> Option<AnimatorStats> {
        self.with_animator(|a| a.stats())
    }

    /// Run `f` against the animator, if one is running.
    pub fn with_animator<T>(&self, f: impl FnOnce(&mut ParticleAnimator<C, R>) -> T) -> Option<T> {
        self.mounted.as_ref().map(|m| f(&mut m.animator.lock()))
    }

    /// Stop the animator.
    ///
    /// Cancels the frame callback and removes the resize listener. No
    /// callback of this animator runs after this returns. Returns the final
    /// counters, or `None` for an inert handle.
    pub fn unmount(
        self,
        scheduler: &mut dyn FrameScheduler,
        resize_source: &mut dyn ResizeSource,
    ) -> Option<AnimatorStats> {
        let mounted = self.mounted?;
        mounted.active.store(false, Ordering::Release);
        let cancelled = scheduler.unregister(mounted.frame_token);
        let unsubscribed = resize_source.unsubscribe(mounted.listener_token);
        let stats = mounted.animator.lock().stats();
        debug!(
            "Unmounted animator {:?} (callback {cancelled}, listener {unsubscribed}, spawned {})",
            self.id, stats.spawned
        );
        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::rng::FastRandSource;
    use crate::schedule::{FrameCallback, FrameLoop, Viewport};
    use glam::Vec2;
    use keepsake_common::Rgba;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    /// Scheduler that records every registration and keeps firing whatever
    /// is still registered.
    #[derive(Default)]
    struct SpyScheduler {
        callbacks: HashMap<u64, FrameCallback>,
        next: u64,
        registered: usize,
        unregistered: Vec<u64>,
        fired: usize,
        /// Keep firing unregistered callbacks, like a frame already queued.
        keep_stale: bool,
    }

    impl SpyScheduler {
        fn tick(&mut self, timestamp_ms: f64) {
            for callback in self.callbacks.values_mut() {
                callback(timestamp_ms);
                self.fired += 1;
            }
        }
    }

    impl FrameScheduler for SpyScheduler {
        fn register(&mut self, callback: FrameCallback) -> FrameToken {
            self.registered += 1;
            let token = FrameToken::from_raw(self.next);
            self.next += 1;
            self.callbacks.insert(token.raw(), callback);
            token
        }

        fn unregister(&mut self, token: FrameToken) -> bool {
            self.unregistered.push(token.raw());
            if self.keep_stale {
                self.callbacks.contains_key(&token.raw())
            } else {
                self.callbacks.remove(&token.raw()).is_some()
            }
        }
    }

    fn acquire_recording(size: SurfaceSize) -> Result<RecordingCanvas, SurfaceError> {
        Ok(RecordingCanvas::new(size))
    }

    /// Canvas whose clear counter outlives the animator that owns it.
    struct CountingCanvas {
        size: SurfaceSize,
        clears: Arc<AtomicUsize>,
    }

    impl Canvas for CountingCanvas {
        fn size(&self) -> SurfaceSize {
            self.size
        }

        fn resize(&mut self, size: SurfaceSize) {
            self.size = size;
        }

        fn clear(&mut self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }

        fn fill_ellipse(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {}

        fn stroke_line(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {}

        fn fill_polygon(&mut self, _: &[Vec2], _: Rgba) {}
    }

    #[test]
    fn test_surface_fit_resolve() {
        let viewport = SurfaceSize::new(1000, 800);
        assert_eq!(SurfaceFit::Viewport.resolve(viewport), viewport);
        let half = SurfaceFit::Container {
            width_ratio: 0.5,
            height_ratio: 0.25,
        };
        assert_eq!(half.resolve(viewport), SurfaceSize::new(500, 200));
    }

    #[test]
    fn test_mount_registers_once() {
        let mut spy = SpyScheduler::default();
        let mut viewport = Viewport::new(SurfaceSize::new(400, 300));
        let handle = mount(
            AnimatorConfig::sparkle(),
            SurfaceFit::Viewport,
            acquire_recording,
            FastRandSource::with_seed(1),
            &mut spy,
            &mut viewport,
        );
        assert!(handle.is_active());
        assert_eq!(spy.registered, 1);
        assert_eq!(viewport.listener_count(), 1);
    }

    #[test]
    fn test_teardown_mid_animation_stops_callbacks() {
        let mut spy = SpyScheduler::default();
        let mut viewport = Viewport::new(SurfaceSize::new(1000, 800));
        let handle = mount(
            AnimatorConfig::petal().with_target_count(20),
            SurfaceFit::Viewport,
            acquire_recording,
            FastRandSource::with_seed(7),
            &mut spy,
            &mut viewport,
        );
        for i in 1..=120 {
            spy.tick(f64::from(i) * 16.0);
        }
        assert_eq!(spy.fired, 120);
        let frames_before = handle.with_animator(|a| a.frame_count());
        assert_eq!(frames_before, Some(120));

        let stats = handle.unmount(&mut spy, &mut viewport);
        assert!(stats.is_some());
        assert_eq!(spy.unregistered.len(), 1);
        assert_eq!(viewport.listener_count(), 0);

        let fired = spy.fired;
        for i in 121..=130 {
            spy.tick(f64::from(i) * 16.0);
        }
        assert_eq!(spy.fired, fired);
    }

    #[test]
    fn test_inert_handle_schedules_nothing() {
        let mut frames = FrameLoop::new();
        let mut viewport = Viewport::new(SurfaceSize::new(400, 300));
        let handle = mount(
            AnimatorConfig::petal(),
            SurfaceFit::Viewport,
            |_| Err::<RecordingCanvas, _>(SurfaceError::Unavailable("headless".into())),
            FastRandSource::with_seed(1),
            &mut frames,
            &mut viewport,
        );
        assert!(!handle.is_active());
        assert_eq!(handle.live_count(), 0);
        assert_eq!(frames.callback_count(), 0);
        assert_eq!(viewport.listener_count(), 0);
        assert_eq!(frames.tick(16.0), 0);
        assert!(handle.unmount(&mut frames, &mut viewport).is_none());
    }

    #[test]
    fn test_resize_reaches_canvas_through_fit() {
        let mut frames = FrameLoop::new();
        let mut viewport = Viewport::new(SurfaceSize::new(1000, 800));
        let fit = SurfaceFit::Container {
            width_ratio: 0.5,
            height_ratio: 0.5,
        };
        let handle = mount(
            AnimatorConfig::sparkle(),
            fit,
            acquire_recording,
            FastRandSource::with_seed(3),
            &mut frames,
            &mut viewport,
        );
        assert_eq!(
            handle.with_animator(|a| a.canvas().size()),
            Some(SurfaceSize::new(500, 400))
        );

        frames.tick(16.0);
        viewport.resize(SurfaceSize::new(600, 200));
        frames.tick(32.0);
        assert_eq!(
            handle.with_animator(|a| a.canvas().last_clear_size()),
            Some(Some(SurfaceSize::new(300, 100)))
        );
        handle.unmount(&mut frames, &mut viewport);
        assert_eq!(frames.callback_count(), 0);
    }

    #[test]
    fn test_frame_loop_drives_multiple_animators() {
        let mut frames = FrameLoop::new();
        let mut viewport = Viewport::new(SurfaceSize::new(800, 600));
        let petals = mount(
            AnimatorConfig::petal(),
            SurfaceFit::Viewport,
            acquire_recording,
            FastRandSource::with_seed(1),
            &mut frames,
            &mut viewport,
        );
        let sparkles = mount(
            AnimatorConfig::sparkle(),
            SurfaceFit::Viewport,
            acquire_recording,
            FastRandSource::with_seed(2),
            &mut frames,
            &mut viewport,
        );
        assert_ne!(petals.id(), sparkles.id());
        for i in 1..=60 {
            assert_eq!(frames.tick(f64::from(i) * 1000.0 / 60.0), 2);
        }
        assert!(sparkles.live_count() > 0);

        petals.unmount(&mut frames, &mut viewport);
        assert_eq!(frames.tick(1100.0), 1);
        sparkles.unmount(&mut frames, &mut viewport);
        assert_eq!(frames.tick(1200.0), 0);
    }

    #[test]
    fn test_stale_callback_does_no_work_after_unmount() {
        let mut spy = SpyScheduler {
            keep_stale: true,
            ..SpyScheduler::default()
        };
        let mut viewport = Viewport::new(SurfaceSize::new(640, 480));
        let clears = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clears);
        let handle = mount(
            AnimatorConfig::sparkle(),
            SurfaceFit::Viewport,
            move |size| {
                Ok(CountingCanvas {
                    size,
                    clears: counter,
                })
            },
            FastRandSource::with_seed(5),
            &mut spy,
            &mut viewport,
        );
        for i in 1..=30 {
            spy.tick(f64::from(i) * 16.0);
        }
        assert_eq!(clears.load(Ordering::SeqCst), 30);

        handle.unmount(&mut spy, &mut viewport);
        for i in 31..=40 {
            spy.tick(f64::from(i) * 16.0);
        }
        assert_eq!(spy.fired, 40);
        assert_eq!(clears.load(Ordering::SeqCst), 30);
    }
}
