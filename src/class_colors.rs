//! Stable per-class colors.
//!
//! Colors are handed out lazily the first time a class is seen and never
//! reassigned, so a class keeps its visual identity when the user switches
//! between detection files of the same image.

use std::collections::HashMap;

use planview_raster::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color_utils::hsl_to_rgb;

/// A class color: random hue at fixed saturation and lightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassColor {
    hue: f32,
}

impl ClassColor {
    pub const SATURATION: f32 = 0.7;
    pub const LIGHTNESS: f32 = 0.5;

    pub fn from_hue(hue: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
        }
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Opaque RGB color.
    pub fn to_color(&self) -> Color {
        let (r, g, b) = hsl_to_rgb(self.hue, Self::SATURATION, Self::LIGHTNESS);
        Color::rgb(r, g, b)
    }

    /// CSS `hsl()` notation, for UI consumers.
    pub fn css(&self) -> String {
        format!("hsl({:.1},70%,50%)", self.hue)
    }
}

/// Append-only class name to color map.
#[derive(Debug)]
pub struct ClassColorRegistry {
    colors: HashMap<String, ClassColor>,
    rng: StdRng,
}

impl ClassColorRegistry {
    pub fn new() -> Self {
        Self {
            colors: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Registry with a deterministic hue sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            colors: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Color for `class`, generating and storing one on first use.
    pub fn color_for(&mut self, class: &str) -> ClassColor {
        if let Some(color) = self.colors.get(class) {
            return *color;
        }
        let color = ClassColor::from_hue(self.rng.gen_range(0.0..360.0));
        log::debug!("Assigned {} to class '{}'", color.css(), class);
        self.colors.insert(class.to_string(), color);
        color
    }

    /// Existing color for `class` without assigning one.
    pub fn get(&self, class: &str) -> Option<ClassColor> {
        self.colors.get(class).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ClassColorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
