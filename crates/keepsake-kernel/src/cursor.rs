//! Cursor glow: a dot pinned to the pointer and a soft aura trailing it.

use std::sync::Arc;

use glam::Vec2;
use keepsake_common::Rgba;
use parking_lot::Mutex;
use tracing::debug;

use crate::canvas::Canvas;
use crate::schedule::{FrameScheduler, FrameToken};

/// Fraction of the remaining distance the aura covers each frame.
pub const AURA_LERP: f32 = 0.08;

/// Dot diameter in pixels.
pub const DOT_DIAMETER: f32 = 8.0;

/// Aura diameter in pixels.
pub const AURA_DIAMETER: f32 = 300.0;

/// The aura gradient fades out at this fraction of its radius.
const AURA_FADE_STOP: f32 = 0.7;

/// Stacked discs used to approximate the radial gradient.
const AURA_LAYERS: u32 = 6;

const DOT_COLOR: Rgba = Rgba::new(201, 133, 138, 0.5);
const AURA_COLOR: Rgba = Rgba::new(242, 167, 184, 0.08);

/// Pointer follower state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorGlow {
    pointer: Vec2,
    aura: Vec2,
}

impl CursorGlow {
    /// Both dot and aura start at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move. The dot follows immediately.
    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer = position;
    }

    /// Advance the aura one frame toward the pointer.
    pub fn step(&mut self) {
        self.aura += (self.pointer - self.aura) * AURA_LERP;
    }

    /// Dot center.
    #[must_use]
    pub fn dot(&self) -> Vec2 {
        self.pointer
    }

    /// Aura center.
    #[must_use]
    pub fn aura(&self) -> Vec2 {
        self.aura
    }

    /// Draw the aura then the dot.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        let outer = AURA_DIAMETER * 0.5 * AURA_FADE_STOP;
        let layer_color = AURA_COLOR.fade(1.0 / AURA_LAYERS as f32);
        for i in 0..AURA_LAYERS {
            let radius = outer * (1.0 - i as f32 / AURA_LAYERS as f32);
            canvas.fill_ellipse(self.aura, Vec2::splat(radius), 0.0, layer_color);
        }
        canvas.fill_ellipse(self.pointer, Vec2::splat(DOT_DIAMETER * 0.5), 0.0, DOT_COLOR);
    }

    /// Register a frame callback that steps `glow` once per frame.
    pub fn attach(glow: &Arc<Mutex<Self>>, scheduler: &mut dyn FrameScheduler) -> FrameToken {
        let shared = Arc::clone(glow);
        let token = scheduler.register(Box::new(move |_| shared.lock().step()));
        debug!("Cursor glow attached ({token:?})");
        token
    }

    /// Unregister the frame callback returned by [`CursorGlow::attach`].
    pub fn detach(token: FrameToken, scheduler: &mut dyn FrameScheduler) -> bool {
        let removed = scheduler.unregister(token);
        debug!("Cursor glow detached ({token:?}, removed {removed})");
        removed
    }
}
