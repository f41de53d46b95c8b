//! planview_raster - 2-D raster surfaces for annotation overlays
//!
//! This crate provides the drawing primitives the overlay renderer needs:
//! filled/stroked polygons, circles, label rectangles and text. Drawing goes
//! through the [`Surface`] trait so the renderer can target either a real
//! pixel buffer ([`PixmapSurface`]) or a command list ([`RecordingSurface`]).

mod color;
mod command;
mod error;
mod font;
mod pixmap;
mod surface;
mod text_metrics;

pub use color::Color;
pub use command::{DrawCommand, RecordingSurface};
pub use error::RasterError;
pub use font::{load_font, load_system_font};
pub use pixmap::PixmapSurface;
pub use surface::{Rect, Surface};
pub use text_metrics::TextMetrics;

/// Re-exported so callers can hand fonts to [`PixmapSurface`] without a direct dependency.
pub use ab_glyph::FontArc;
