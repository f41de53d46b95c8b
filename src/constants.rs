//! Global constants for the overlay viewer

use planview_raster::Color;

/// Upper zoom bound (500%)
pub const MAX_ZOOM: f32 = 5.0;

/// Multiplier applied by a single zoom-in step
pub const ZOOM_IN_FACTOR: f32 = 1.1;

/// Multiplier applied by a single zoom-out step
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

/// Target multiplier for double-click zoom
pub const DOUBLE_CLICK_ZOOM_FACTOR: f32 = 1.35;

/// Exponent scale applied to the normalized wheel delta
pub const WHEEL_SENSITIVITY: f32 = 0.0009;

/// Normalized wheel deltas are clamped to +/- this many units
pub const WHEEL_DELTA_LIMIT: f32 = 60.0;

/// Pixels per "line" wheel unit
pub const WHEEL_LINE_HEIGHT_PX: f32 = 16.0;

/// Pixels per "page" wheel unit when the surface height is unknown
pub const WHEEL_FALLBACK_PAGE_PX: f32 = 800.0;

/// Fraction of the remaining zoom distance covered per animation frame
pub const ZOOM_SMOOTHING: f32 = 0.16;

/// Remaining zoom distance below which the animation snaps to its target
pub const ZOOM_SETTLE_EPSILON: f32 = 0.0008;

/// Zoom changes smaller than this are ignored
pub const ZOOM_NOOP_EPSILON: f32 = 1e-6;

/// Vertex marker color
pub const KEY_POINT_COLOR: Color = Color::RED;

/// Label text color
pub const LABEL_TEXT_COLOR: Color = Color::WHITE;

/// Diagnostic outline color for symbol size regions
pub const SIZE_OUTLINE_COLOR: Color = Color::from_rgb8(0x00, 0xBF, 0xFF);

/// Diagnostic outline color for symbol detail regions
pub const DETAIL_OUTLINE_COLOR: Color = Color::from_rgb8(0xFF, 0x45, 0x00);

/// Diagnostic outline color for the dimension area that produced OCR text
pub const DIMENSION_AREA_COLOR: Color = Color::from_rgb8(0xFF, 0x6B, 0x6B);

/// Class assigned to dimension-OCR detections
pub const DIM_OCR_CLASS: &str = "dim_ocr";

/// Class assigned to symbol-OCR detections
pub const SYMBOL_OCR_CLASS: &str = "symbol_ocr";

/// Fallback class for space-OCR detections without a class field
pub const SPACE_OCR_CLASS: &str = "space_ocr";

/// Fallback class for crop manifest objects without a class field
pub const UNKNOWN_CROP_CLASS: &str = "unknown_crop";

/// Fallback class for generic detections without a class field
pub const UNKNOWN_CLASS: &str = "unknown";
