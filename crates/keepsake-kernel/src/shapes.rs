//! Geometry for the decorative particle shapes.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Ratio between the inner and outer radius of a sparkle star.
pub const STAR_INNER_RATIO: f32 = 0.4;

/// Number of star points.
pub const STAR_POINTS: usize = 5;

/// Builds the ten vertices of a five-pointed star centered on `center`.
///
/// Outer vertices step by 4π/5 starting straight up, each followed by an
/// inner vertex rotated π/5 further at `STAR_INNER_RATIO × radius`.
#[must_use]
pub fn star_polygon(center: Vec2, radius: f32) -> [Vec2; STAR_POINTS * 2] {
    let mut points = [Vec2::ZERO; STAR_POINTS * 2];
    for i in 0..STAR_POINTS {
        let angle = (i as f32 * 4.0 * PI) / STAR_POINTS as f32 - PI / 2.0;
        let inner_angle = angle + TAU / (STAR_POINTS * 2) as f32;
        points[i * 2] = center + Vec2::from_angle(angle) * radius;
        points[i * 2 + 1] = center + Vec2::from_angle(inner_angle) * radius * STAR_INNER_RATIO;
    }
    points
}

/// Radii of a petal ellipse of the given size: half as wide as it is tall.
#[must_use]
pub fn petal_radii(size: f32) -> Vec2 {
    Vec2::new(size * 0.5, size)
}

/// End points of a petal's center vein, rotated with the petal.
#[must_use]
pub fn petal_vein(center: Vec2, size: f32, rotation: f32) -> (Vec2, Vec2) {
    let axis = Vec2::from_angle(rotation).rotate(Vec2::new(0.0, size * 0.8));
    (center - axis, center + axis)
}
