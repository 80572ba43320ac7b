//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Lowest zoom level the camera accepts.
pub const MIN_ZOOM: f64 = 0.1;

/// Zoom change applied by one step of the zoom controls.
pub const ZOOM_STEP: f64 = 0.1;

/// Camera manages the view transform for the board.
///
/// Device coordinates (pointer/screen) map to logical coordinates as
/// `logical = (device - offset) / zoom`. Rendering uses the inverse, composed
/// as translate-then-scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in device units.
    pub offset: Vec2,
    /// Current zoom level. Always at least `min_zoom`.
    pub zoom: f64,
    /// Minimum allowed zoom level. There is no upper bound.
    pub min_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform for rendering (logical to device).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (device to logical).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a device point to logical coordinates.
    pub fn to_logical(&self, device_point: Point) -> Point {
        self.inverse_transform() * device_point
    }

    /// Convert a logical point to device coordinates.
    pub fn to_device(&self, logical_point: Point) -> Point {
        self.transform() * logical_point
    }

    /// Pan the camera by a delta in device coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Step the zoom by `delta`, clamped to the minimum.
    ///
    /// Returns true if the zoom level changed.
    pub fn set_zoom(&mut self, delta: f64) -> bool {
        let new_zoom = self.clamped(self.zoom + delta);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = new_zoom;
        true
    }

    /// Step the zoom by `delta`, keeping the given device point fixed.
    pub fn zoom_at(&mut self, device_point: Point, delta: f64) -> bool {
        let logical = self.to_logical(device_point);
        if !self.set_zoom(delta) {
            return false;
        }

        // Adjust offset so the logical point stays under the device point
        let moved = self.to_device(logical);
        self.offset += device_point - moved;
        true
    }

    fn clamped(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.max(self.min_zoom)
        } else {
            self.zoom
        }
    }
}
