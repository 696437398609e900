//! # Keepsake Kernel
//!
//! Frame-driven ambient particle animation.
//!
//! This crate provides the decorative motion layer of the page:
//! - Particle animator with petal and sparkle variants
//! - Canvas abstraction with a software rasterizer and a recording canvas
//! - Injectable random sources
//! - Frame scheduling and viewport resize notification
//! - Mount/unmount lifecycle with inert fallback when no surface exists
//! - Cursor glow follower and floating bob motion
//!
//! ## Frame Model
//!
//! Nothing here owns a thread or a timer. A [`schedule::FrameLoop`] fires
//! registered callbacks once per repaint and every animator advances by a
//! fixed step per callback, so motion speed follows the repaint rate.
//!
//! ## Lifecycle
//!
//! [`mount::mount`] registers exactly one frame callback and one resize
//! listener per animator; [`mount::AnimatorHandle::unmount`] removes both.
//! After unmount no callback of that animator does any work.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod animator;
pub mod canvas;
pub mod cursor;
pub mod float;
pub mod mount;
pub mod particle;
pub mod raster;
pub mod rng;
pub mod schedule;
pub mod shapes;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animator::*;
    pub use crate::canvas::*;
    pub use crate::cursor::*;
    pub use crate::float::*;
    pub use crate::mount::*;
    pub use crate::particle::*;
    pub use crate::raster::*;
    pub use crate::rng::*;
    pub use crate::schedule::*;
    pub use crate::shapes::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_common::SurfaceSize;

    #[test]
    fn test_petal_field_on_pixel_canvas() {
        let canvas = PixelCanvas::new(SurfaceSize::new(320, 240)).expect("canvas");
        let mut animator = ParticleAnimator::new(
            AnimatorConfig::petal(),
            canvas,
            FastRandSource::with_seed(42),
        );
        for i in 1..=120 {
            animator.frame(f64::from(i) * 1000.0 / 60.0);
        }
        assert!(animator.live_count() > 0);
        assert!(animator.canvas().covered_pixels() > 0);
    }

    #[test]
    fn test_defaults_match_variants() {
        assert_eq!(AnimatorConfig::default(), AnimatorConfig::petal());
        assert_eq!(AnimatorConfig::sparkle().variant, ParticleVariant::Sparkle);
    }
}
