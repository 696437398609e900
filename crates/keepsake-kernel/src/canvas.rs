//! Drawing surface abstraction.
//!
//! Animators draw through the [`Canvas`] trait and never know what sits
//! behind it: the software rasterizer in [`crate::raster`] or the
//! [`RecordingCanvas`] used by tests.

use glam::Vec2;
use keepsake_common::{Rgba, SurfaceSize};

/// A 2D drawing surface exclusively owned by one animator.
pub trait Canvas: Send {
    /// Current surface size in pixels.
    fn size(&self) -> SurfaceSize;

    /// Resize the surface. Resizing discards the current contents.
    fn resize(&mut self, size: SurfaceSize);

    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Fill an ellipse with the given radii, rotated by `rotation` radians
    /// around its center.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba);

    /// Stroke a straight line segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    /// Fill a closed polygon using the nonzero winding rule.
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `fill_ellipse` call.
    Ellipse {
        /// Ellipse center
        center: Vec2,
        /// Horizontal and vertical radii
        radii: Vec2,
        /// Rotation in radians
        rotation: f32,
        /// Fill color
        color: Rgba,
    },
    /// `stroke_line` call.
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Rgba,
    },
    /// `fill_polygon` call.
    Polygon {
        /// Polygon vertices
        points: Vec<Vec2>,
        /// Fill color
        color: Rgba,
    },
}

/// Canvas that records draw calls instead of rasterizing them.
///
/// Commands are kept since the last `clear`, so after a frame the canvas
/// holds exactly what that frame drew.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    clear_count: u64,
    resize_count: u64,
    last_clear_size: Option<SurfaceSize>,
}

impl RecordingCanvas {
    /// Create a recording canvas of the given size.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Commands drawn since the last clear.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of times the surface was cleared.
    #[must_use]
    pub fn clear_count(&self) -> u64 {
        self.clear_count
    }

    /// Number of times the surface was resized.
    #[must_use]
    pub fn resize_count(&self) -> u64 {
        self.resize_count
    }

    /// Surface size in effect at the most recent clear.
    #[must_use]
    pub fn last_clear_size(&self) -> Option<SurfaceSize> {
        self.last_clear_size
    }

    /// Number of ellipses drawn since the last clear.
    #[must_use]
    pub fn ellipse_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Ellipse { .. }))
            .count()
    }

    /// Number of polygons drawn since the last clear.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.resize_count += 1;
        self.commands.clear();
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clear_count += 1;
        self.last_clear_size = Some(self.size);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Rgba) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            rotation,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }
}
