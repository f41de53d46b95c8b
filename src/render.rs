//! Overlay rendering.
//!
//! Draws the current annotation set onto a [`Surface`] at a given zoom:
//! translucent polygon fills with solid outlines, optional vertex markers,
//! labels placed to avoid each other, and diagnostic outlines for symbol and
//! dimension OCR.

use std::collections::BTreeMap;

use planview_raster::{Rect, Surface};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DETAIL_OUTLINE_COLOR, DIMENSION_AREA_COLOR, KEY_POINT_COLOR, LABEL_TEXT_COLOR,
    SIZE_OUTLINE_COLOR,
};
use crate::geometry::{BoundingBox, Point, scale_for_zoom};
use crate::normalize::{AnnotationKind, AnnotationObject};
use crate::visibility::VisibilityState;

/// Annotations grouped by class, iterated in class-name order.
pub type ClassMap = BTreeMap<String, Vec<AnnotationObject>>;

/// Sizes used when drawing, in image pixels at zoom 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Polygon outline width
    pub border_width: f32,
    /// Vertex marker radius
    pub marker_radius: f32,
    /// Label box height
    pub label_height: f32,
    /// Horizontal padding inside a label box
    pub label_padding: f32,
    /// Label font size
    pub font_size: f32,
    /// Gap between a polygon's bounding box and its label
    pub label_gap: f32,
    /// Extra upward shift when no label candidate is free
    pub stacked_label_offset: f32,
    /// Alpha of polygon fills
    pub fill_alpha: f32,
    /// Width of diagnostic outlines
    pub diagnostic_line_width: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            border_width: 3.0,
            marker_radius: 5.0,
            label_height: 28.0,
            label_padding: 10.0,
            font_size: 16.0,
            label_gap: 3.0,
            stacked_label_offset: 10.0,
            fill_alpha: 0.25,
            diagnostic_line_width: 2.0,
        }
    }
}

/// Display toggles that apply to every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_labels: bool,
    pub show_key_points: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_key_points: true,
        }
    }
}

/// Where a label ended up relative to its polygon's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    AboveLeft,
    AboveRight,
    BelowLeft,
    BelowRight,
    AboveCenter,
    BelowCenter,
    /// Every candidate was taken; shifted above the first one
    Stacked,
}

/// Greedy first-fit label placement for one render pass.
///
/// Each label tries a fixed list of candidate positions around its box and
/// takes the first that overlaps no previously placed label. When all are
/// taken it is stacked above the first candidate. Every placed rectangle is
/// remembered, so later labels avoid stacked ones too. Dense clusters can
/// still overlap.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    placed: Vec<Rect>,
    gap: f32,
    stacked_offset: f32,
}

impl LabelPlacer {
    pub fn new(gap: f32, stacked_offset: f32) -> Self {
        Self {
            placed: Vec::new(),
            gap,
            stacked_offset,
        }
    }

    /// Place a `width x height` label for the box `bb`.
    pub fn place(&mut self, bb: &BoundingBox, width: f32, height: f32) -> (Rect, LabelAnchor) {
        let above = bb.ymin - height - self.gap;
        let below = bb.ymax + self.gap;
        let center_x = bb.xmin + width / 2.0;
        let candidates = [
            (bb.xmin, above, LabelAnchor::AboveLeft),
            (bb.xmax - width, above, LabelAnchor::AboveRight),
            (bb.xmin, below, LabelAnchor::BelowLeft),
            (bb.xmax - width, below, LabelAnchor::BelowRight),
            (center_x, above, LabelAnchor::AboveCenter),
            (center_x, below, LabelAnchor::BelowCenter),
        ];

        let free = candidates.iter().find_map(|&(x, y, anchor)| {
            let rect = Rect::new(x, y, width, height);
            (!self.placed.iter().any(|p| p.overlaps(&rect))).then_some((rect, anchor))
        });

        let (rect, anchor) = free.unwrap_or_else(|| {
            let (x, y, _) = candidates[0];
            (
                Rect::new(x, y - self.stacked_offset, width, height),
                LabelAnchor::Stacked,
            )
        });
        self.placed.push(rect);
        (rect, anchor)
    }

    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }
}

/// Label text including the confidence suffix.
pub fn display_label(object: &AnnotationObject) -> String {
    let base = if object.is_dimension_text() {
        object.label.trim()
    } else {
        object.label.as_str()
    };
    match object.confidence_score {
        Some(score) => format!("{} ({:.2})", base, score),
        None => base.to_string(),
    }
}

fn tuples(points: &[Point]) -> Vec<(f32, f32)> {
    points.iter().map(|p| p.as_tuple()).collect()
}

fn stroke_outline<S: Surface + ?Sized>(
    surface: &mut S,
    points: &[Point],
    zoom: f32,
    color: planview_raster::Color,
    width: f32,
) {
    if points.is_empty() {
        return;
    }
    surface.stroke_polygon(&tuples(&scale_for_zoom(points, zoom)), color, width);
}

/// Draw every visible annotation and return how many polygons were filled.
///
/// The surface is cleared first, so repeated calls with the same inputs
/// produce the same frame.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    classes: &ClassMap,
    visibility: &VisibilityState,
    zoom: f32,
    options: RenderOptions,
    style: &RenderStyle,
) -> usize {
    surface.clear();

    let z = zoom;
    let border_width = style.border_width * z;
    let label_height = style.label_height * z;
    let label_padding = style.label_padding * z;
    let font_size = style.font_size * z;
    let diagnostic_width = style.diagnostic_line_width * z;

    let mut placer = LabelPlacer::new(style.label_gap * z, style.stacked_label_offset * z);
    let mut drawn = 0;

    for (class, objects) in classes {
        if !visibility.is_class_visible(class) {
            continue;
        }

        for object in objects {
            if object
                .crop_idx()
                .is_some_and(|idx| visibility.is_dimension_hidden(idx))
            {
                continue;
            }

            let color = object.color.to_color();
            let scaled = scale_for_zoom(&object.polygon_points, z);
            let points = tuples(&scaled);

            if !points.is_empty() {
                surface.fill_polygon(&points, color.with_alpha(style.fill_alpha));
                surface.stroke_polygon(&points, color, border_width);
                if options.show_key_points {
                    for &p in &points {
                        surface.fill_circle(p, style.marker_radius * z, KEY_POINT_COLOR);
                    }
                }
                drawn += 1;
            }

            if options.show_labels && !object.label.is_empty() {
                if let Some(bb) = BoundingBox::from_points(&scaled) {
                    let text = display_label(object);
                    let label_width = surface.measure_text(&text, font_size) + label_padding * 2.0;
                    let (rect, _) = placer.place(&bb, label_width, label_height);
                    surface.fill_rect(rect, color);
                    surface.draw_text(
                        &text,
                        (rect.x + label_padding, rect.y + rect.height / 2.0),
                        font_size,
                        LABEL_TEXT_COLOR,
                    );
                }
            }

            match &object.kind {
                AnnotationKind::SymbolOcr {
                    size_points,
                    detail_points,
                } => {
                    stroke_outline(surface, size_points, z, SIZE_OUTLINE_COLOR, diagnostic_width);
                    stroke_outline(
                        surface,
                        detail_points,
                        z,
                        DETAIL_OUTLINE_COLOR,
                        diagnostic_width,
                    );
                }
                AnnotationKind::OcrText {
                    dimension_area_points: Some(area),
                    ..
                } => {
                    stroke_outline(surface, area, z, DIMENSION_AREA_COLOR, diagnostic_width);
                }
                _ => {}
            }
        }
    }

    let (width, height) = surface.size();
    log::trace!(
        "Rendered {} object(s) at zoom {:.3} on {}x{}",
        drawn,
        zoom,
        width,
        height
    );
    drawn
}
