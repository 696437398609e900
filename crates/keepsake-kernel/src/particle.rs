//! Petal and sparkle particle records.
//!
//! Particles advance by a fixed step per frame rather than by wall-clock
//! delta. Petals fall until they leave the bottom of the surface; sparkles
//! rise for a randomized number of frames under a fade-in/hold/fade-out
//! opacity envelope.

use glam::Vec2;
use keepsake_common::{ParticleId, Rgba, SurfaceSize};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::canvas::Canvas;
use crate::rng::RandomSource;
use crate::shapes;

/// Petal palette (rose, blush, lavender tones).
pub const PETAL_PALETTE: [Rgba; 7] = [
    Rgba::from_hex(0xF2_A7B8),
    Rgba::from_hex(0xF4_B8C8),
    Rgba::from_hex(0xFF_E0EC),
    Rgba::from_hex(0xC9_A9E9),
    Rgba::from_hex(0xE8_D5FF),
    Rgba::from_hex(0xFF_C0D2),
    Rgba::from_hex(0xC9_858A),
];

/// Sparkle palette.
pub const SPARKLE_PALETTE: [Rgba; 1] = [Rgba::from_hex(0xFF_D6E5)];

/// Petals are removed once they fall this far below the surface.
pub const PETAL_EXIT_MARGIN: f32 = 50.0;

/// Sparkles are drawn at this fraction of their envelope opacity.
pub const SPARKLE_ALPHA_SCALE: f32 = 0.8;

/// Fraction of a sparkle's life spent fading in (and, mirrored, fading out).
pub const SPARKLE_FADE_FRACTION: f32 = 0.3;

/// Vein stroke drawn over every petal.
const PETAL_VEIN_COLOR: Rgba = Rgba::new(255, 255, 255, 0.3);
const PETAL_VEIN_WIDTH: f32 = 0.5;

/// Visual style and lifetime rule of an animator's particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleVariant {
    /// Falling, swaying rose petals that die below the surface.
    #[default]
    Petal,
    /// Rising five-pointed stars with a bounded lifetime.
    Sparkle,
}

impl ParticleVariant {
    /// Spawn interval in milliseconds at the reference density.
    #[must_use]
    pub const fn base_spawn_interval_ms(self) -> f64 {
        match self {
            Self::Petal => 800.0,
            // Every 8th frame at 60 Hz.
            Self::Sparkle => 125.0,
        }
    }

    /// Particle count at which the base spawn interval applies.
    #[must_use]
    pub const fn reference_count(self) -> u32 {
        match self {
            Self::Petal => 20,
            Self::Sparkle => 8,
        }
    }

    /// Default steady-state particle count.
    #[must_use]
    pub const fn default_target_count(self) -> u32 {
        match self {
            Self::Petal => 25,
            Self::Sparkle => 8,
        }
    }

    /// Palette new particles draw their color from.
    #[must_use]
    pub fn palette(self) -> &'static [Rgba] {
        match self {
            Self::Petal => &PETAL_PALETTE,
            Self::Sparkle => &SPARKLE_PALETTE,
        }
    }
}

/// Opacity envelope of a sparkle at `progress = age / max_life`.
///
/// Ramps linearly from 0 to 1 over the first 30% of life, holds at 1
/// through 70%, and ramps back to 0 at the end. Out-of-range progress
/// yields 0.
#[must_use]
pub fn sparkle_envelope(progress: f32) -> f32 {
    if !(0.0..=1.0).contains(&progress) {
        return 0.0;
    }
    if progress < SPARKLE_FADE_FRACTION {
        progress / SPARKLE_FADE_FRACTION
    } else if progress > 1.0 - SPARKLE_FADE_FRACTION {
        (1.0 - progress) / SPARKLE_FADE_FRACTION
    } else {
        1.0
    }
}

/// A falling petal.
#[derive(Debug, Clone, PartialEq)]
pub struct Petal {
    /// Particle ID
    pub id: ParticleId,
    /// Drift-path position (sway excluded).
    pub position: Vec2,
    /// Length of the long ellipse radius.
    pub size: f32,
    /// Downward speed per frame.
    pub speed_y: f32,
    /// Horizontal drift per frame.
    pub speed_x: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Rotation change per frame in degrees.
    pub rotation_speed: f32,
    /// Opacity in [0, 1].
    pub opacity: f32,
    /// Fill color, alpha baked in.
    pub color: Rgba,
    /// Horizontal sway amplitude in pixels.
    pub sway_amplitude: f32,
    /// Sway angular speed in radians per millisecond.
    pub sway_speed: f32,
    /// Sway phase offset in radians.
    pub sway_offset: f32,
}

impl Petal {
    /// Spawn a petal above the top edge at a random horizontal position.
    pub fn spawn(id: ParticleId, surface_width: f32, rng: &mut impl RandomSource) -> Self {
        let alpha = (rng.range(0.4, 0.9) * 100.0).round() / 100.0;
        let base = PETAL_PALETTE[rng.index(PETAL_PALETTE.len())];
        Self {
            id,
            position: Vec2::new(
                rng.next_f32() * surface_width,
                -20.0 - rng.next_f32() * 100.0,
            ),
            size: rng.range(6.0, 18.0),
            speed_y: rng.range(0.6, 2.0),
            speed_x: rng.centered(0.8),
            rotation: rng.next_f32() * 360.0,
            rotation_speed: rng.centered(3.0),
            opacity: alpha,
            color: base.with_alpha(alpha),
            sway_amplitude: rng.range(40.0, 100.0),
            sway_speed: rng.range(0.005, 0.015),
            sway_offset: rng.next_f32() * TAU,
        }
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.position.y += self.speed_y;
        self.position.x += self.speed_x;
        self.rotation += self.rotation_speed;
    }

    /// Horizontal sway displacement at `time_ms`.
    #[must_use]
    pub fn sway_at(&self, time_ms: f64) -> f32 {
        let phase = (time_ms * f64::from(self.sway_speed)) as f32 + self.sway_offset;
        phase.sin() * self.sway_amplitude
    }

    /// Position the petal is drawn at, sway included.
    #[must_use]
    pub fn rendered_position(&self, time_ms: f64) -> Vec2 {
        Vec2::new(self.position.x + self.sway_at(time_ms), self.position.y)
    }

    /// True once the petal has fallen past the bottom margin.
    #[must_use]
    pub fn has_exited(&self, surface: SurfaceSize) -> bool {
        self.position.y >= surface.height_f32() + PETAL_EXIT_MARGIN
    }

    /// Draw the petal body and vein.
    pub fn draw(&self, canvas: &mut impl Canvas, time_ms: f64) {
        let center = self.rendered_position(time_ms);
        let rotation = self.rotation.to_radians();
        canvas.fill_ellipse(
            center,
            shapes::petal_radii(self.size),
            rotation,
            self.color.fade(self.opacity),
        );
        let (from, to) = shapes::petal_vein(center, self.size, rotation);
        canvas.stroke_line(
            from,
            to,
            PETAL_VEIN_WIDTH,
            PETAL_VEIN_COLOR.fade(self.opacity),
        );
    }
}

/// A rising sparkle star.
#[derive(Debug, Clone, PartialEq)]
pub struct Sparkle {
    /// Particle ID
    pub id: ParticleId,
    /// Center position.
    pub position: Vec2,
    /// Movement per frame.
    pub velocity: Vec2,
    /// Outer star radius at full opacity.
    pub size: f32,
    /// Frames lived so far.
    pub age: u32,
    /// Frames until the sparkle expires.
    pub max_life: f32,
    /// Fill color.
    pub color: Rgba,
}

impl Sparkle {
    /// Spawn a sparkle anywhere on the surface.
    pub fn spawn(id: ParticleId, surface: SurfaceSize, rng: &mut impl RandomSource) -> Self {
        Self {
            id,
            position: Vec2::new(
                rng.next_f32() * surface.width_f32(),
                rng.next_f32() * surface.height_f32(),
            ),
            size: rng.range(3.0, 9.0),
            age: 0,
            max_life: rng.range(60.0, 120.0),
            velocity: Vec2::new(rng.centered(0.5), -0.5 - rng.next_f32() * 0.5),
            color: SPARKLE_PALETTE[rng.index(SPARKLE_PALETTE.len())],
        }
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.age += 1;
        self.position += self.velocity;
    }

    /// Fraction of life elapsed.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 1.0;
        }
        self.age as f32 / self.max_life
    }

    /// Current envelope opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        sparkle_envelope(self.progress())
    }

    /// True once the sparkle has lived its full life.
    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.age as f32 >= self.max_life
    }

    /// Draw the star, shrunk and faded by its envelope.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        let opacity = self.opacity();
        let points = shapes::star_polygon(self.position, self.size * opacity);
        canvas.fill_polygon(
            &points,
            self.color.with_alpha(opacity * SPARKLE_ALPHA_SCALE),
        );
    }
}

/// A live particle of either variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    /// Falling petal
    Petal(Petal),
    /// Rising sparkle
    Sparkle(Sparkle),
}

impl Particle {
    /// Spawn a fresh particle of the given variant.
    pub fn spawn(
        variant: ParticleVariant,
        id: ParticleId,
        surface: SurfaceSize,
        rng: &mut impl RandomSource,
    ) -> Self {
        match variant {
            ParticleVariant::Petal => Self::Petal(Petal::spawn(id, surface.width_f32(), rng)),
            ParticleVariant::Sparkle => Self::Sparkle(Sparkle::spawn(id, surface, rng)),
        }
    }

    /// Particle ID.
    #[must_use]
    pub fn id(&self) -> ParticleId {
        match self {
            Self::Petal(p) => p.id,
            Self::Sparkle(s) => s.id,
        }
    }

    /// Current drift-path position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Petal(p) => p.position,
            Self::Sparkle(s) => s.position,
        }
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        match self {
            Self::Petal(p) => p.step(),
            Self::Sparkle(s) => s.step(),
        }
    }

    /// True once the exit condition holds.
    #[must_use]
    pub fn has_exited(&self, surface: SurfaceSize) -> bool {
        match self {
            Self::Petal(p) => p.has_exited(surface),
            Self::Sparkle(s) => s.has_exited(),
        }
    }

    /// Draw at the given frame time.
    pub fn draw(&self, canvas: &mut impl Canvas, time_ms: f64) {
        match self {
            Self::Petal(p) => p.draw(canvas, time_ms),
            Self::Sparkle(s) => s.draw(canvas),
        }
    }

    /// The petal record, if this is a petal.
    #[must_use]
    pub fn as_petal(&self) -> Option<&Petal> {
        match self {
            Self::Petal(p) => Some(p),
            Self::Sparkle(_) => None,
        }
    }

    /// The sparkle record, if this is a sparkle.
    #[must_use]
    pub fn as_sparkle(&self) -> Option<&Sparkle> {
        match self {
            Self::Sparkle(s) => Some(s),
            Self::Petal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};
    use crate::rng::{FastRandSource, SequenceSource};

    #[test]
    fn test_envelope_shape() {
        assert_eq!(sparkle_envelope(0.0), 0.0);
        assert!((sparkle_envelope(0.15) - 0.5).abs() < 1e-5);
        assert_eq!(sparkle_envelope(0.3), 1.0);
        assert_eq!(sparkle_envelope(0.5), 1.0);
        assert_eq!(sparkle_envelope(0.7), 1.0);
        assert!((sparkle_envelope(0.85) - 0.5).abs() < 1e-5);
        assert_eq!(sparkle_envelope(1.0), 0.0);
        assert_eq!(sparkle_envelope(1.2), 0.0);
        assert_eq!(sparkle_envelope(-0.1), 0.0);
    }

    #[test]
    fn test_petal_spawn_ranges() {
        let mut rng = FastRandSource::with_seed(7);
        for i in 0..200 {
            let p = Petal::spawn(ParticleId::from_raw(i), 1000.0, &mut rng);
            assert!((0.0..1000.0).contains(&p.position.x));
            assert!((-120.0..=-20.0).contains(&p.position.y));
            assert!((6.0..18.0).contains(&p.size));
            assert!((0.6..2.0).contains(&p.speed_y));
            assert!(p.speed_x.abs() <= 0.4);
            assert!(p.rotation_speed.abs() <= 1.5);
            assert!((0.4..=0.9).contains(&p.opacity));
            assert!((p.color.a - p.opacity).abs() < f32::EPSILON);
            assert!((40.0..100.0).contains(&p.sway_amplitude));
            assert!(PETAL_PALETTE
                .iter()
                .any(|c| (c.r, c.g, c.b) == (p.color.r, p.color.g, p.color.b)));
        }
    }

    #[test]
    fn test_petal_alpha_rounded() {
        let mut rng = SequenceSource::constant(0.123_456);
        let p = Petal::spawn(ParticleId::from_raw(0), 100.0, &mut rng);
        let scaled = p.opacity * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-3);
    }

    #[test]
    fn test_petal_step_and_exit() {
        let mut rng = SequenceSource::constant(0.5);
        let mut p = Petal::spawn(ParticleId::from_raw(0), 100.0, &mut rng);
        p.position.y = 149.0;
        p.speed_y = 1.0;
        let surface = SurfaceSize::new(100, 100);
        assert!(!p.has_exited(surface));
        p.step();
        assert!(p.has_exited(surface));
    }

    #[test]
    fn test_petal_draw_commands() {
        let mut rng = SequenceSource::constant(0.5);
        let p = Petal::spawn(ParticleId::from_raw(0), 100.0, &mut rng);
        let mut canvas = RecordingCanvas::new(SurfaceSize::new(100, 100));
        p.draw(&mut canvas, 0.0);
        assert_eq!(canvas.commands().len(), 2);
        match &canvas.commands()[0] {
            DrawCommand::Ellipse { radii, color, .. } => {
                assert!((radii.y - p.size).abs() < f32::EPSILON);
                assert!((color.a - p.opacity * p.opacity).abs() < 1e-5);
            },
            other => panic!("expected ellipse, got {other:?}"),
        }
        assert!(matches!(canvas.commands()[1], DrawCommand::Line { .. }));
    }

    #[test]
    fn test_sparkle_lifecycle() {
        let mut rng = SequenceSource::constant(0.0);
        let mut s = Sparkle::spawn(ParticleId::from_raw(0), SurfaceSize::new(50, 50), &mut rng);
        assert!((s.max_life - 60.0).abs() < f32::EPSILON);
        assert_eq!(s.opacity(), 0.0);
        let start_y = s.position.y;
        for _ in 0..59 {
            s.step();
            assert!(!s.has_exited());
        }
        s.step();
        assert!(s.has_exited());
        assert!(s.position.y < start_y);
        assert_eq!(s.opacity(), 0.0);
    }

    #[test]
    fn test_sparkle_draw_scales_with_envelope() {
        let mut rng = SequenceSource::constant(0.5);
        let mut s = Sparkle::spawn(ParticleId::from_raw(0), SurfaceSize::new(50, 50), &mut rng);
        s.age = (s.max_life * 0.5) as u32;
        let mut canvas = RecordingCanvas::new(SurfaceSize::new(50, 50));
        s.draw(&mut canvas);
        match &canvas.commands()[0] {
            DrawCommand::Polygon { points, color } => {
                assert_eq!(points.len(), 10);
                assert!((points[0].distance(s.position) - s.size).abs() < 1e-3);
                assert!((color.a - SPARKLE_ALPHA_SCALE).abs() < 1e-5);
            },
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_variant_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            variant: ParticleVariant,
        }
        let w: Wrapper = toml::from_str("variant = \"sparkle\"").expect("parse");
        assert_eq!(w.variant, ParticleVariant::Sparkle);
    }

    proptest::proptest! {
        #[test]
        fn prop_envelope_in_unit_range(p in -1.0f32..2.0) {
            let o = sparkle_envelope(p);
            proptest::prop_assert!((0.0..=1.0).contains(&o));
        }

        #[test]
        fn prop_envelope_full_in_hold(p in 0.3f32..=0.7) {
            proptest::prop_assert_eq!(sparkle_envelope(p), 1.0);
        }

        #[test]
        fn prop_petal_sway_bounded(seed in proptest::prelude::any::<u64>(), t in 0.0f64..1.0e6) {
            let mut rng = FastRandSource::with_seed(seed);
            let p = Petal::spawn(ParticleId::from_raw(0), 800.0, &mut rng);
            let drawn = p.rendered_position(t);
            proptest::prop_assert!((drawn.x - p.position.x).abs() <= p.sway_amplitude + 1e-3);
            proptest::prop_assert_eq!(drawn.y, p.position.y);
        }
    }
}
