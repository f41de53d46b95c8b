//! Approximate text measurement.
//!
//! Used when no font is loaded (and by [`crate::RecordingSurface`]) so label
//! boxes can still be sized and placed deterministically.

/// Average-width metrics for a font size.
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    /// Font size in pixels
    pub size: f32,
    /// Average character width as a ratio of font size
    pub char_width_ratio: f32,
}

impl TextMetrics {
    /// Ratios tuned for bold sans-serif label text.
    pub const BOLD_SANS: TextMetrics = TextMetrics {
        size: 16.0,
        char_width_ratio: 0.6,
    };

    /// Create metrics for a specific font size.
    pub fn new(size: f32) -> Self {
        Self {
            size,
            ..Self::BOLD_SANS
        }
    }

    /// Estimate the width of a single line of text.
    pub fn line_width(&self, text: &str) -> f32 {
        let char_count = text.chars().count() as f32;
        char_count * self.size * self.char_width_ratio
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::BOLD_SANS
    }
}
