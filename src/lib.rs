//! Planview - floorplan detection overlays
//!
//! Turns the JSON detection files produced by a floorplan analysis pipeline
//! into drawable annotations in original-image coordinates and renders them
//! over the plan with zoom, pan and per-class visibility controls.
//!
//! The usual flow is a [`RenderSession`]: ingest a crop manifest first (it
//! seeds the crop-to-original transform), then any detection file, then
//! [`RenderSession::render`] onto a [`planview_raster::Surface`] at the zoom a
//! [`Viewport`] reports.

mod class_colors;
mod color_utils;
pub mod config;
pub mod constants;
mod detection;
mod error;
pub mod geometry;
pub mod normalize;
pub mod render;
pub mod roi;
mod session;
pub mod viewport;
mod visibility;

#[cfg(test)]
mod tests;

pub use class_colors::{ClassColor, ClassColorRegistry};
pub use config::{ConfigError, LogLevel, Preferences, ViewerConfig};
pub use error::{NormalizeError, NormalizeIssue};
pub use geometry::{BoundingBox, Point};
pub use normalize::{AnnotationKind, AnnotationObject, FileCategory, NormalizeOutcome, normalize};
pub use render::{ClassMap, LabelAnchor, LabelPlacer, RenderOptions, RenderStyle, render};
pub use roi::{AxisAffine, DimensionArea, DimensionAreas, RoiTransform};
pub use session::{ClassSummary, RenderSession};
pub use viewport::{
    DeltaMode, FrameOutcome, PointerButton, Viewport, ViewportState, WheelEvent, ZoomSettings,
};
pub use visibility::VisibilityState;
