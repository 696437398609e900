//! Ambient particle animator.
//!
//! One animator owns one canvas and one live set of particles. Each call
//! to [`ParticleAnimator::frame`] runs a full frame:
//!
//! 1. Emission: if more than `spawn_interval` has passed since the last
//!    emission check fired, admit one particle when the live set is below
//!    its cap (`target_count × 1.5`).
//! 2. Integration: every particle advances by one fixed per-frame step.
//! 3. Removal: particles whose exit condition holds are dropped for good.
//! 4. Draw: the canvas is cleared and every remaining particle is drawn.
//!
//! Resizing clears the surface but leaves particle coordinates untouched;
//! particles that end up outside the new bounds simply finish their path.

use keepsake_common::{ParticleIdGenerator, SurfaceSize};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::particle::{Particle, ParticleVariant};
use crate::rng::RandomSource;

/// Largest target count an animator honors; larger values are clamped.
pub const MAX_TARGET_COUNT: u32 = 1000;

/// Named density presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityTier {
    /// Sparse field.
    Light,
    /// Default field.
    Medium,
    /// Dense field.
    Heavy,
}

impl DensityTier {
    /// Target particle count for this tier.
    #[must_use]
    pub const fn target_count(self) -> u32 {
        match self {
            Self::Light => 15,
            Self::Medium => 25,
            Self::Heavy => 40,
        }
    }
}

/// Animator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Steady-state particle density.
    pub target_count: u32,
    /// Shape, palette, and lifetime rule.
    pub variant: ParticleVariant,
    /// Optional preset that overrides `target_count`.
    pub density: Option<DensityTier>,
    /// Petal fields start with `target_count` petals spread over the
    /// surface instead of an empty sky.
    pub prefill: bool,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self::petal()
    }
}

impl AnimatorConfig {
    /// Falling petals at the default density.
    #[must_use]
    pub const fn petal() -> Self {
        Self {
            target_count: ParticleVariant::Petal.default_target_count(),
            variant: ParticleVariant::Petal,
            density: None,
            prefill: true,
        }
    }

    /// Rising sparkles at the default density.
    #[must_use]
    pub const fn sparkle() -> Self {
        Self {
            target_count: ParticleVariant::Sparkle.default_target_count(),
            variant: ParticleVariant::Sparkle,
            density: None,
            prefill: false,
        }
    }

    /// Set the target count.
    #[must_use]
    pub const fn with_target_count(mut self, target_count: u32) -> Self {
        self.target_count = target_count;
        self
    }

    /// Set a density tier.
    #[must_use]
    pub const fn with_density(mut self, density: DensityTier) -> Self {
        self.density = Some(density);
        self
    }

    /// Enable or disable prefill.
    #[must_use]
    pub const fn with_prefill(mut self, prefill: bool) -> Self {
        self.prefill = prefill;
        self
    }

    /// Target count after applying the density tier, at most
    /// [`MAX_TARGET_COUNT`].
    #[must_use]
    pub const fn effective_target_count(&self) -> u32 {
        match self.density {
            Some(tier) => tier.target_count(),
            None if self.target_count > MAX_TARGET_COUNT => MAX_TARGET_COUNT,
            None => self.target_count,
        }
    }

    /// Clamp `target_count` to [`MAX_TARGET_COUNT`].
    pub fn validate(&mut self) {
        if self.target_count > MAX_TARGET_COUNT {
            warn!(
                "Target count {} exceeds {MAX_TARGET_COUNT}, clamping",
                self.target_count
            );
            self.target_count = MAX_TARGET_COUNT;
        }
    }

    /// Maximum live particles: `floor(target × 1.5)`.
    #[must_use]
    pub const fn live_cap(&self) -> usize {
        (self.effective_target_count() as usize * 3) / 2
    }

    /// Milliseconds between emission checks, or `None` when the target
    /// count is zero and nothing is ever emitted.
    #[must_use]
    pub fn spawn_interval_ms(&self) -> Option<f64> {
        let target = self.effective_target_count();
        if target == 0 {
            return None;
        }
        let variant = self.variant;
        Some(
            variant.base_spawn_interval_ms() * f64::from(variant.reference_count())
                / f64::from(target),
        )
    }
}

/// Counters describing an animator's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimatorStats {
    /// Particles admitted, prefill included.
    pub spawned: u64,
    /// Particles removed after their exit condition held.
    pub expired: u64,
    /// Emission checks skipped because the live set was full.
    pub capped: u64,
    /// Largest live count seen at a frame boundary.
    pub peak_live: usize,
}

/// Frame-driven particle animator.
#[derive(Debug)]
pub struct ParticleAnimator<C, R> {
    config: AnimatorConfig,
    canvas: C,
    rng: R,
    particles: Vec<Particle>,
    ids: ParticleIdGenerator,
    last_spawn_ms: f64,
    time_ms: f64,
    frame_count: u64,
    stats: AnimatorStats,
}

impl<C: Canvas, R: RandomSource> ParticleAnimator<C, R> {
    /// Activate an animator on `canvas`.
    ///
    /// Petal fields with `prefill` start with `target_count` petals spread
    /// over the full surface height.
    pub fn new(config: AnimatorConfig, canvas: C, rng: R) -> Self {
        let mut animator = Self {
            config,
            canvas,
            rng,
            particles: Vec::new(),
            ids: ParticleIdGenerator::new(),
            last_spawn_ms: 0.0,
            time_ms: 0.0,
            frame_count: 0,
            stats: AnimatorStats::default(),
        };
        if config.prefill && config.variant == ParticleVariant::Petal {
            animator.prefill();
        }
        debug!(
            "Activated {:?} animator on {} surface (target {}, cap {})",
            config.variant,
            animator.canvas.size(),
            config.effective_target_count(),
            config.live_cap()
        );
        animator
    }

    fn prefill(&mut self) {
        let size = self.canvas.size();
        let count = (self.config.effective_target_count() as usize).min(self.config.live_cap());
        for _ in 0..count {
            let mut particle =
                Particle::spawn(self.config.variant, self.ids.next_id(), size, &mut self.rng);
            if let Particle::Petal(petal) = &mut particle {
                petal.position.y = self.rng.next_f32() * size.height_f32();
            }
            self.particles.push(particle);
            self.stats.spawned += 1;
        }
        self.stats.peak_live = self.particles.len();
    }

    /// Run one frame at `timestamp_ms`.
    pub fn frame(&mut self, timestamp_ms: f64) {
        self.time_ms = timestamp_ms;
        self.frame_count += 1;
        let size = self.canvas.size();

        if let Some(interval) = self.config.spawn_interval_ms() {
            if timestamp_ms - self.last_spawn_ms > interval {
                if self.particles.len() < self.config.live_cap() {
                    let particle = Particle::spawn(
                        self.config.variant,
                        self.ids.next_id(),
                        size,
                        &mut self.rng,
                    );
                    self.particles.push(particle);
                    self.stats.spawned += 1;
                } else {
                    self.stats.capped += 1;
                }
                self.last_spawn_ms = timestamp_ms;
            }
        }

        let before = self.particles.len();
        self.particles.retain_mut(|p| {
            p.step();
            !p.has_exited(size)
        });
        self.stats.expired += (before - self.particles.len()) as u64;
        self.stats.peak_live = self.stats.peak_live.max(self.particles.len());

        self.canvas.clear();
        for particle in &self.particles {
            particle.draw(&mut self.canvas, timestamp_ms);
        }
    }

    /// Resize the surface. Particle positions are not remapped.
    pub fn resize(&mut self, size: SurfaceSize) {
        debug!(
            "Resizing {:?} animator {} -> {}",
            self.config.variant,
            self.canvas.size(),
            size
        );
        self.canvas.resize(size);
    }

    /// Number of live particles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Live particles in emission order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// The drawing surface.
    #[must_use]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Mutable access to the drawing surface.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Frames run so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Timestamp of the most recent frame.
    #[must_use]
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// History counters.
    #[must_use]
    pub fn stats(&self) -> AnimatorStats {
        self.stats
    }
}
