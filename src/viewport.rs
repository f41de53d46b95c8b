//! Zoom and pan state for the image viewer.
//!
//! The viewport tracks a rendered zoom and a target zoom. Discrete controls
//! set both at once. Wheel input moves only the target; [`Viewport::tick`]
//! then eases the rendered zoom toward it one frame at a time while keeping
//! the content point under the pointer fixed. Scroll offsets behave like a
//! scroll container: they are clamped to the scrollable range.

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::constants::{
    DOUBLE_CLICK_ZOOM_FACTOR, MAX_ZOOM, WHEEL_DELTA_LIMIT, WHEEL_FALLBACK_PAGE_PX,
    WHEEL_LINE_HEIGHT_PX, WHEEL_SENSITIVITY, ZOOM_IN_FACTOR, ZOOM_NOOP_EPSILON, ZOOM_OUT_FACTOR,
    ZOOM_SETTLE_EPSILON, ZOOM_SMOOTHING,
};

/// Snap threshold when the animation settles.
const SNAP_EPSILON: f32 = 1e-8;

/// Tunable zoom behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub max_zoom: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub double_click_factor: f32,
    /// Exponent scale applied to the normalized wheel delta
    pub wheel_sensitivity: f32,
    /// Normalized wheel deltas are clamped to +/- this value
    pub wheel_delta_limit: f32,
    /// Pixels per wheel "line"
    pub line_height_px: f32,
    /// Fraction of the remaining distance covered per frame
    pub smoothing: f32,
    /// Remaining distance below which the animation snaps to target
    pub settle_epsilon: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            max_zoom: MAX_ZOOM,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
            double_click_factor: DOUBLE_CLICK_ZOOM_FACTOR,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            wheel_delta_limit: WHEEL_DELTA_LIMIT,
            line_height_px: WHEEL_LINE_HEIGHT_PX,
            smoothing: ZOOM_SMOOTHING,
            settle_epsilon: ZOOM_SETTLE_EPSILON,
        }
    }
}

/// Snapshot of the viewport's numeric state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom: f32,
    pub min_zoom: f32,
    pub target_zoom: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

/// Unit of a wheel event's delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// A wheel event in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_y: f32,
    pub delta_mode: DeltaMode,
    pub x: f32,
    pub y: f32,
}

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Content point held under the pointer during an anchored zoom.
///
/// `fx`/`fy` are fractions of the scaled content size; `mouse_*` is the
/// pointer position on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomAnchor {
    pub mouse_x: f32,
    pub mouse_y: f32,
    pub fx: f32,
    pub fy: f32,
}

/// A running wheel-zoom animation.
#[derive(Debug, Clone, Copy)]
pub struct ZoomAnimation {
    pub anchor: ZoomAnchor,
    pub started_at: Instant,
    pub frames: u32,
}

/// Result of advancing the animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No animation is running
    Idle,
    /// Zoom moved; another frame is needed
    Continue,
    /// Zoom reached its target and the animation stopped
    Settled,
}

#[derive(Debug, Clone, Copy)]
struct DragStart {
    x: f32,
    y: f32,
    scroll_x: f32,
    scroll_y: f32,
}

/// Zoom/pan controller for one displayed image.
#[derive(Debug)]
pub struct Viewport {
    settings: ZoomSettings,
    zoom: f32,
    min_zoom: f32,
    target_zoom: f32,
    scroll_x: f32,
    scroll_y: f32,
    surface_size: (f32, f32),
    content_size: (f32, f32),
    animation: Option<ZoomAnimation>,
    drag: Option<DragStart>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomSettings::default())
    }
}

impl Viewport {
    pub fn new(settings: ZoomSettings) -> Self {
        Self {
            settings,
            zoom: 1.0,
            min_zoom: 1.0,
            target_zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            surface_size: (0.0, 0.0),
            content_size: (0.0, 0.0),
            animation: None,
            drag: None,
        }
    }

    pub fn settings(&self) -> &ZoomSettings {
        &self.settings
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            zoom: self.zoom,
            min_zoom: self.min_zoom,
            target_zoom: self.target_zoom,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn scroll(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn surface_size(&self) -> (f32, f32) {
        self.surface_size
    }

    pub fn content_size(&self) -> (f32, f32) {
        self.content_size
    }

    /// Content size at the current zoom.
    pub fn scaled_content_size(&self) -> (f32, f32) {
        (
            self.content_size.0 * self.zoom,
            self.content_size.1 * self.zoom,
        )
    }

    /// Start showing a new image: fit it to the surface.
    pub fn load_image(&mut self, surface_w: u32, surface_h: u32, image_w: u32, image_h: u32) {
        self.surface_size = (surface_w as f32, surface_h as f32);
        self.set_content_size(image_w, image_h);
    }

    /// Replace the content size and refit.
    ///
    /// Cancels any animation or drag, since both refer to the old content.
    pub fn set_content_size(&mut self, width: u32, height: u32) {
        self.cancel_animation();
        self.drag = None;
        self.content_size = (width as f32, height as f32);
        self.min_zoom = self.fit_zoom();
        self.zoom = self.min_zoom;
        self.target_zoom = self.min_zoom;
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        log::debug!(
            "Viewport fit {}x{} into {}x{} at zoom {:.4}",
            width,
            height,
            self.surface_size.0,
            self.surface_size.1,
            self.min_zoom
        );
    }

    /// The surface changed size. Zoom is kept, but pulled into the new range.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface_size = (width as f32, height as f32);
        self.min_zoom = self.fit_zoom();
        self.zoom = self.clamp_zoom(self.zoom);
        self.target_zoom = self.clamp_zoom(self.target_zoom);
        self.clamp_scroll();
    }

    fn fit_zoom(&self) -> f32 {
        let (sw, sh) = self.surface_size;
        let (iw, ih) = self.content_size;
        if iw <= 0.0 || ih <= 0.0 || sw <= 0.0 || sh <= 0.0 {
            log::warn!(
                "Cannot fit {}x{} content into {}x{} surface, using zoom 1.0",
                iw,
                ih,
                sw,
                sh
            );
            return 1.0;
        }
        (sw / iw).min(sh / ih)
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.min(self.settings.max_zoom).max(self.min_zoom)
    }

    fn max_scroll(&self) -> (f32, f32) {
        let (w, h) = self.scaled_content_size();
        (
            (w - self.surface_size.0).max(0.0),
            (h - self.surface_size.1).max(0.0),
        )
    }

    fn clamp_scroll(&mut self) {
        let (max_x, max_y) = self.max_scroll();
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Set scroll offsets, clamped to the scrollable range.
    pub fn set_scroll(&mut self, x: f32, y: f32) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll();
    }

    /// Set zoom immediately, clamped. Cancels any animation.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.cancel_animation();
        self.zoom = self.clamp_zoom(zoom);
        self.target_zoom = self.zoom;
        self.clamp_scroll();
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.settings.zoom_in_factor);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom * self.settings.zoom_out_factor);
    }

    /// Back to fit-to-surface.
    pub fn reset_zoom(&mut self) {
        self.set_zoom(self.min_zoom);
    }

    /// Zoom relative to the fitted zoom, in percent.
    pub fn zoom_percentage(&self) -> u32 {
        if self.min_zoom == 0.0 {
            return 100;
        }
        (self.zoom / self.min_zoom * 100.0).round() as u32
    }

    /// Capture the content point under `(x, y)` at the current zoom.
    pub fn anchor_at(&self, x: f32, y: f32) -> ZoomAnchor {
        let (w, h) = self.scaled_content_size();
        let w = if w == 0.0 { 1.0 } else { w };
        let h = if h == 0.0 { 1.0 } else { h };
        ZoomAnchor {
            mouse_x: x,
            mouse_y: y,
            fx: (self.scroll_x + x) / w,
            fy: (self.scroll_y + y) / h,
        }
    }

    fn apply_zoom_at(&mut self, zoom: f32, anchor: ZoomAnchor) {
        self.zoom = zoom;
        let (w, h) = self.scaled_content_size();
        self.scroll_x = anchor.fx * w - anchor.mouse_x;
        self.scroll_y = anchor.fy * h - anchor.mouse_y;
        self.clamp_scroll();
    }

    /// Wheel delta in pixels, clamped to the configured limit.
    pub fn normalize_wheel_delta(&self, event: &WheelEvent) -> f32 {
        let delta = match event.delta_mode {
            DeltaMode::Pixel => event.delta_y,
            DeltaMode::Line => event.delta_y * self.settings.line_height_px,
            DeltaMode::Page => {
                let page = if self.surface_size.1 > 0.0 {
                    self.surface_size.1
                } else {
                    WHEEL_FALLBACK_PAGE_PX
                };
                event.delta_y * page
            }
        };
        let limit = self.settings.wheel_delta_limit;
        delta.clamp(-limit, limit)
    }

    /// Handle a wheel event. Returns true if a new target was set.
    ///
    /// Ignored while dragging. Negative deltas zoom in.
    pub fn wheel(&mut self, event: WheelEvent) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let delta = self.normalize_wheel_delta(&event);
        let factor = (-delta * self.settings.wheel_sensitivity).exp();
        let target = self.clamp_zoom(self.target_zoom * factor);
        if (target - self.target_zoom).abs() < ZOOM_NOOP_EPSILON {
            return false;
        }

        self.target_zoom = target;
        let anchor = self.anchor_at(event.x, event.y);
        match &mut self.animation {
            Some(animation) => animation.anchor = anchor,
            None => {
                log::debug!("Zoom animation started toward {:.4}", target);
                self.animation = Some(ZoomAnimation {
                    anchor,
                    started_at: Instant::now(),
                    frames: 0,
                });
            }
        }
        true
    }

    /// Advance the zoom animation by one frame.
    pub fn tick(&mut self) -> FrameOutcome {
        let Some(mut animation) = self.animation else {
            return FrameOutcome::Idle;
        };
        animation.frames += 1;

        let diff = self.target_zoom - self.zoom;
        if diff.abs() < self.settings.settle_epsilon {
            if diff.abs() > SNAP_EPSILON {
                self.apply_zoom_at(self.target_zoom, animation.anchor);
            }
            self.zoom = self.target_zoom;
            self.animation = None;
            log::debug!(
                "Zoom animation settled at {:.4} after {} frame(s) in {:?}",
                self.zoom,
                animation.frames,
                animation.started_at.elapsed()
            );
            return FrameOutcome::Settled;
        }

        self.apply_zoom_at(self.zoom + diff * self.settings.smoothing, animation.anchor);
        self.animation = Some(animation);
        FrameOutcome::Continue
    }

    /// Zoom to `zoom` keeping the content under `(x, y)` fixed. Immediate.
    ///
    /// Returns false when the clamped zoom equals the current one.
    pub fn zoom_to_point(&mut self, zoom: f32, x: f32, y: f32) -> bool {
        let clamped = self.clamp_zoom(zoom);
        if (clamped - self.zoom).abs() < ZOOM_NOOP_EPSILON {
            return false;
        }
        self.cancel_animation();
        let anchor = self.anchor_at(x, y);
        self.target_zoom = clamped;
        self.apply_zoom_at(clamped, anchor);
        true
    }

    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        self.zoom_to_point(self.zoom * self.settings.double_click_factor, x, y)
    }

    /// Start a drag on primary press. Stops any running zoom animation.
    pub fn pointer_down(&mut self, button: PointerButton, x: f32, y: f32) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        if self.animation.is_some() {
            self.cancel_animation();
            self.target_zoom = self.zoom;
        }
        self.drag = Some(DragStart {
            x,
            y,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        });
        true
    }

    /// Pan while dragging. Returns true if the scroll offsets were updated.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some(start) = self.drag else {
            return false;
        };
        self.set_scroll(start.scroll_x - (x - start.x), start.scroll_y - (y - start.y));
        true
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn pointer_leave(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Stop the zoom animation where it is. The target is left unchanged.
    pub fn cancel_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            log::debug!(
                "Zoom animation cancelled at {:.4} after {} frame(s)",
                self.zoom,
                animation.frames
            );
        }
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.cancel_animation();
    }
}
