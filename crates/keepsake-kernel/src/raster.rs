//! Software rasterizer canvas.
//!
//! Draws into an RGBA8 image with source-over blending. Shapes are sampled
//! at pixel centers without antialiasing, which is plenty for soft, small
//! decorative particles. Frames can be exported as PNG snapshots.

use std::path::Path;

use glam::Vec2;
use image::{ImageFormat, Rgba as Pixel, RgbaImage};
use keepsake_common::{KeepsakeError, Rgba, SurfaceError, SurfaceSize};
use tracing::debug;

use crate::canvas::Canvas;

/// Largest supported side length of a pixel canvas.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Half-width used for strokes thinner than one pixel.
const MIN_STROKE_HALF_WIDTH: f32 = 0.5;

/// RGBA pixel canvas backed by an `image::RgbaImage`.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    image: RgbaImage,
}

impl PixelCanvas {
    /// Allocate a transparent canvas.
    ///
    /// Fails with [`SurfaceError::TooLarge`] when either side exceeds
    /// [`MAX_SURFACE_DIMENSION`].
    pub fn new(size: SurfaceSize) -> Result<Self, SurfaceError> {
        if size.width > MAX_SURFACE_DIMENSION || size.height > MAX_SURFACE_DIMENSION {
            return Err(SurfaceError::TooLarge {
                width: size.width,
                height: size.height,
                max: MAX_SURFACE_DIMENSION,
            });
        }
        Ok(Self {
            image: RgbaImage::new(size.width, size.height),
        })
    }

    /// Read a pixel, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Number of pixels with non-zero alpha.
    #[must_use]
    pub fn covered_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] > 0).count()
    }

    /// Write the current frame as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), KeepsakeError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| KeepsakeError::Snapshot(e.to_string()))?;
        debug!("Saved snapshot to {}", path.display());
        Ok(())
    }

    /// Source-over blend of `color` onto pixel (x, y).
    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let src_a = color.a.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let Some(dst) = self.image.get_pixel_mut_checked(x, y) else {
            return;
        };
        let [dr, dg, db, da] = dst.0;
        let dst_a = f32::from(da) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (f32::from(s) * src_a + f32::from(d) * dst_a * (1.0 - src_a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        *dst = Pixel([
            mix(color.r, dr),
            mix(color.g, dg),
            mix(color.b, db),
            (out_a * 255.0).round() as u8,
        ]);
    }

    /// Clamp a float pixel range to the image bounds.
    fn span(min: f32, max: f32, limit: u32) -> Option<(u32, u32)> {
        let lo = min.floor().max(0.0);
        let hi = max.ceil().min(limit as f32);
        if hi <= lo {
            return None;
        }
        Some((lo as u32, hi as u32))
    }
}

impl Canvas for PixelCanvas {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.image.width(), self.image.height())
    }

    fn resize(&mut self, size: SurfaceSize) {
        let width = size.width.min(MAX_SURFACE_DIMENSION);
        let height = size.height.min(MAX_SURFACE_DIMENSION);
        self.image = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Pixel([0, 0, 0, 0]);
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let (sin, cos) = rotation.sin_cos();
        let extent = Vec2::new(
            ((radii.x * cos).powi(2) + (radii.y * sin).powi(2)).sqrt(),
            ((radii.x * sin).powi(2) + (radii.y * cos).powi(2)).sqrt(),
        );
        let (width, height) = (self.image.width(), self.image.height());
        let Some((x0, x1)) = Self::span(center.x - extent.x, center.x + extent.x, width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(center.y - extent.y, center.y + extent.y, height) else {
            return;
        };
        let unrotate = Vec2::from_angle(-rotation);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let local = unrotate.rotate(d) / radii;
                if local.length_squared() <= 1.0 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        if width <= 0.0 {
            return;
        }
        let half = (width * 0.5).max(MIN_STROKE_HALF_WIDTH);
        // Sub-pixel strokes keep their visual weight by thinning alpha.
        let color = color.fade(width.min(1.0));
        let min = from.min(to) - Vec2::splat(half);
        let max = from.max(to) + Vec2::splat(half);
        let (w, h) = (self.image.width(), self.image.height());
        let Some((x0, x1)) = Self::span(min.x, max.x, w) else {
            return;
        };
        let Some((y0, y1)) = Self::span(min.y, max.y, h) else {
            return;
        };
        let segment = to - from;
        let len_sq = segment.length_squared();

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - from).dot(segment) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                if p.distance(from + segment * t) <= half {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let (min, max) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let (w, h) = (self.image.width(), self.image.height());
        let Some((y0, y1)) = Self::span(min.y, max.y, h) else {
            return;
        };

        let mut crossings: Vec<(f32, i32)> = Vec::with_capacity(points.len());
        for y in y0..y1 {
            let sample_y = y as f32 + 0.5;
            crossings.clear();
            for (i, &a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                let upward = a.y <= sample_y && b.y > sample_y;
                let downward = b.y <= sample_y && a.y > sample_y;
                if upward || downward {
                    let x = a.x + (sample_y - a.y) * (b.x - a.x) / (b.y - a.y);
                    crossings.push((x, if upward { 1 } else { -1 }));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                // Pixel centers inside [start, end).
                let start = (pair[0].0 - 0.5).ceil().max(0.0);
                let end = (pair[1].0 - 0.5).ceil().min(w as f32);
                if end <= start {
                    continue;
                }
                for x in start as u32..end as u32 {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: u32, h: u32) -> PixelCanvas {
        PixelCanvas::new(SurfaceSize::new(w, h)).expect("canvas")
    }

    #[test]
    fn test_too_large_surface() {
        let result = PixelCanvas::new(SurfaceSize::new(MAX_SURFACE_DIMENSION + 1, 1));
        assert!(matches!(result, Err(SurfaceError::TooLarge { .. })));
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let c = canvas(8, 8);
        assert_eq!(c.covered_pixels(), 0);
        assert_eq!(c.size(), SurfaceSize::new(8, 8));
    }

    #[test]
    fn test_fill_ellipse_covers_center() {
        let mut c = canvas(20, 20);
        c.fill_ellipse(Vec2::new(10.0, 10.0), Vec2::new(3.0, 6.0), 0.0, Rgba::from_hex(0xF2_A7B8));
        assert_eq!(c.pixel(10, 10), Some([0xF2, 0xA7, 0xB8, 255]));
        // Outside the narrow horizontal radius.
        assert_eq!(c.pixel(15, 10), Some([0, 0, 0, 0]));
        // Inside the tall vertical radius.
        assert_eq!(c.pixel(10, 14).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_rotated_ellipse_swaps_axes() {
        let mut c = canvas(20, 20);
        c.fill_ellipse(
            Vec2::new(10.0, 10.0),
            Vec2::new(3.0, 6.0),
            std::f32::consts::FRAC_PI_2,
            Rgba::WHITE,
        );
        assert_eq!(c.pixel(14, 10).map(|p| p[3]), Some(255));
        assert_eq!(c.pixel(10, 14).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut c = canvas(4, 4);
        c.fill_polygon(
            &[Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0), Vec2::new(0.0, 4.0)],
            Rgba::WHITE.with_alpha(0.5),
        );
        assert_eq!(c.pixel(1, 1), Some([255, 255, 255, 128]));
        assert_eq!(c.covered_pixels(), 16);
    }

    #[test]
    fn test_stroke_line() {
        let mut c = canvas(10, 10);
        c.stroke_line(Vec2::new(5.0, 1.0), Vec2::new(5.0, 9.0), 2.0, Rgba::WHITE);
        assert_eq!(c.pixel(5, 5).map(|p| p[3]), Some(255));
        assert_eq!(c.pixel(1, 5).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_shapes_clip_offscreen() {
        let mut c = canvas(10, 10);
        c.fill_ellipse(Vec2::new(-50.0, -50.0), Vec2::new(5.0, 5.0), 0.0, Rgba::WHITE);
        c.fill_polygon(
            &[Vec2::new(100.0, 100.0), Vec2::new(120.0, 100.0), Vec2::new(110.0, 120.0)],
            Rgba::WHITE,
        );
        assert_eq!(c.covered_pixels(), 0);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut c = canvas(10, 10);
        c.fill_ellipse(Vec2::new(5.0, 5.0), Vec2::new(4.0, 4.0), 0.0, Rgba::WHITE);
        assert!(c.covered_pixels() > 0);
        c.clear();
        assert_eq!(c.covered_pixels(), 0);
        c.resize(SurfaceSize::new(30, 12));
        assert_eq!(c.size(), SurfaceSize::new(30, 12));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frames").join("frame.png");
        let mut c = canvas(16, 16);
        c.fill_ellipse(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0), 0.0, Rgba::WHITE);
        c.save_png(&path).expect("save");
        let loaded = image::open(&path).expect("open").to_rgba8();
        assert_eq!(loaded.dimensions(), (16, 16));
        assert_eq!(loaded.get_pixel(8, 8).0[3], 255);
    }
}
