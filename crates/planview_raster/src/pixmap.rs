//! tiny-skia backed pixel surface.
//!
//! Shapes are rasterized into a tiny-skia pixmap as they are drawn. Label text
//! is queued and drawn with imageproc when the pixmap is converted to an
//! [`RgbaImage`], so text always ends up above the shapes.

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

use crate::{Color, RasterError, Rect, Surface, TextMetrics};

#[derive(Debug, Clone)]
struct QueuedText {
    text: String,
    x: i32,
    y: i32,
    size: f32,
    color: Color,
}

/// A surface that rasterizes into an RGBA pixmap.
pub struct PixmapSurface {
    pixmap: Pixmap,
    font: Option<FontArc>,
    texts: Vec<QueuedText>,
}

impl PixmapSurface {
    /// Create a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        let pixmap = Pixmap::new(width, height).ok_or(RasterError::Allocation { width, height })?;
        Ok(Self {
            pixmap,
            font: None,
            texts: Vec::new(),
        })
    }

    /// Use this font for label text.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Straight-alpha copy of the surface contents, text included.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, RasterError> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let expected = (self.pixmap.width() * self.pixmap.height() * 4) as usize;
        let found = data.len();
        let mut image = RgbaImage::from_raw(self.pixmap.width(), self.pixmap.height(), data)
            .ok_or(RasterError::SizeMismatch { expected, found })?;

        if let Some(font) = &self.font {
            for queued in &self.texts {
                draw_text_mut(
                    &mut image,
                    Rgba(queued.color.to_rgba8()),
                    queued.x,
                    queued.y,
                    PxScale::from(queued.size),
                    font,
                    &queued.text,
                );
            }
        }
        Ok(image)
    }

    /// Alpha-blend the surface contents over `background` (which must be the
    /// same size) and return the result.
    pub fn composite_over(&self, background: &RgbaImage) -> Result<RgbaImage, RasterError> {
        let overlay = self.to_rgba_image()?;
        if overlay.dimensions() != background.dimensions() {
            return Err(RasterError::SizeMismatch {
                expected: background.as_raw().len(),
                found: overlay.as_raw().len(),
            });
        }
        let mut out = background.clone();
        image::imageops::overlay(&mut out, &overlay, 0, 0);
        Ok(out)
    }

    fn paint(color: Color) -> Paint<'static> {
        let [r, g, b, a] = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }
}

fn polygon_path(points: &[(f32, f32)]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();
    pb.finish()
}

impl Surface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.texts.clear();
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        if let Some(path) = polygon_path(points) {
            self.pixmap.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_polygon(&mut self, points: &[(f32, f32)], color: Color, width: f32) {
        if let Some(path) = polygon_path(points) {
            let stroke = Stroke {
                width,
                ..Default::default()
            };
            self.pixmap.stroke_path(
                &path,
                &Self::paint(color),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.0, center.1, radius) {
            self.pixmap.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
            self.pixmap
                .fill_rect(r, &Self::paint(color), Transform::identity(), None);
        }
    }

    fn draw_text(&mut self, text: &str, position: (f32, f32), size: f32, color: Color) {
        if self.font.is_none() || text.is_empty() {
            return;
        }
        // imageproc places text by its top edge
        self.texts.push(QueuedText {
            text: text.to_string(),
            x: position.0.round() as i32,
            y: (position.1 - size / 2.0).round() as i32,
            size,
            color,
        });
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(size), font, text).0 as f32,
            None => TextMetrics::new(size).line_width(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(surface: &PixmapSurface, x: u32, y: u32) -> u8 {
        let image = surface.to_rgba_image().unwrap();
        image.get_pixel(x, y).0[3]
    }

    #[test]
    fn test_zero_size_surface_fails() {
        assert!(matches!(
            PixmapSurface::new(0, 10),
            Err(RasterError::Allocation { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_fill_polygon_covers_interior() {
        let mut surface = PixmapSurface::new(20, 20).unwrap();
        surface.fill_polygon(&[(2.0, 2.0), (18.0, 2.0), (18.0, 18.0), (2.0, 18.0)], Color::RED);
        assert_eq!(alpha_at(&surface, 10, 10), 255);
        assert_eq!(alpha_at(&surface, 0, 0), 0);
    }

    #[test]
    fn test_clear_erases() {
        let mut surface = PixmapSurface::new(8, 8).unwrap();
        surface.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE);
        surface.clear();
        assert_eq!(alpha_at(&surface, 4, 4), 0);
    }

    #[test]
    fn test_single_point_polygon_is_ignored() {
        let mut surface = PixmapSurface::new(8, 8).unwrap();
        surface.fill_polygon(&[(4.0, 4.0)], Color::RED);
        surface.stroke_polygon(&[], Color::RED, 2.0);
        assert_eq!(alpha_at(&surface, 4, 4), 0);
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut surface = PixmapSurface::new(16, 16).unwrap();
        surface.draw_text("1500", (2.0, 8.0), 10.0, Color::WHITE);
        assert!(surface.texts.is_empty());
        let image = surface.to_rgba_image().unwrap();
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_measure_without_font_uses_metrics() {
        let surface = PixmapSurface::new(8, 8).unwrap();
        assert!((surface.measure_text("abcd", 10.0) - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_composite_over_background() {
        let mut surface = PixmapSurface::new(4, 4).unwrap();
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 4.0), Color::RED);
        let background = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
        let out = surface.composite_over(&background).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 255, 255]);

        let wrong = RgbaImage::new(2, 2);
        assert!(surface.composite_over(&wrong).is_err());
    }
}
