//! The drawing surface abstraction.

use crate::Color;

/// An axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive overlap test: rectangles that share an edge overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }
}

/// A 2-D raster target the overlay renderer draws onto.
///
/// Coordinates are surface pixels. Polygons are given as ordered vertex lists
/// and are always closed.
pub trait Surface {
    /// Surface size in pixels (width, height).
    fn size(&self) -> (u32, u32);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color);

    /// Stroke the outline of a closed polygon.
    fn stroke_polygon(&mut self, points: &[(f32, f32)], color: Color, width: f32);

    /// Fill a circle.
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a single line of text. `position` is the left edge and the
    /// vertical middle of the line.
    fn draw_text(&mut self, text: &str, position: (f32, f32), size: f32, color: Color);

    /// Width the given text would occupy at `size` pixels.
    fn measure_text(&self, text: &str, size: f32) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges count as overlapping
        assert!(a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(0.0, -20.0, 5.0, 5.0)));
    }
}
