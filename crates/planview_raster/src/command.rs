//! Recorded draw commands.

use crate::{Color, Rect, Surface, TextMetrics};

/// A single drawing operation issued against a [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillPolygon {
        points: Vec<(f32, f32)>,
        color: Color,
    },
    StrokePolygon {
        points: Vec<(f32, f32)>,
        color: Color,
        width: f32,
    },
    FillCircle {
        center: (f32, f32),
        radius: f32,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    DrawText {
        text: String,
        position: (f32, f32),
        size: f32,
        color: Color,
    },
}

/// A surface that records commands instead of rasterizing them.
///
/// Clearing drops everything recorded so far, the same way clearing a pixel
/// buffer erases it, so the command list always describes the current frame.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    metrics: TextMetrics,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            metrics: TextMetrics::default(),
            commands: Vec::new(),
        }
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Label rectangles drawn in the current frame, in draw order.
    pub fn filled_rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Text strings drawn in the current frame, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polygon(&mut self, points: &[(f32, f32)], color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_text(&mut self, text: &str, position: (f32, f32), size: f32, color: Color) {
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        TextMetrics {
            size,
            ..self.metrics
        }
        .line_width(text)
    }
}
