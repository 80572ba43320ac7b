//! Rectangles and ellipses: an anchor plus a signed size.

use super::{Geometry, STROKE_WIDTH, SerializableColor, point_is_finite, point_to_segment_dist};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Box geometry shared by rectangles and ellipses.
///
/// Width and height keep the sign of the drag direction; consumers normalize
/// with [`Frame::rect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: SerializableColor,
}

impl Frame {
    pub fn new(anchor: Point, size: Vec2, color: SerializableColor) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            width: size.x,
            height: size.y,
            color,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Normalized rectangle (positive width and height).
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    /// Ellipse center and radii inscribed in the frame.
    pub fn ellipse(&self) -> (Point, Vec2) {
        let rect = self.rect();
        (rect.center(), Vec2::new(rect.width() / 2.0, rect.height() / 2.0))
    }

    /// Hit test against the inscribed ellipse outline.
    pub fn hit_test_ellipse(&self, point: Point, tolerance: f64) -> bool {
        let (center, radii) = self.ellipse();
        let slack = tolerance + STROKE_WIDTH / 2.0;
        if radii.x < f64::EPSILON || radii.y < f64::EPSILON {
            // Degenerate ellipse collapses to a segment.
            let rect = self.rect();
            let a = Point::new(rect.x0, rect.y0);
            let b = Point::new(rect.x1, rect.y1);
            return point_to_segment_dist(point, a, b) <= slack;
        }
        let d = point - center;
        let outer = (d.x / (radii.x + slack)).powi(2) + (d.y / (radii.y + slack)).powi(2);
        if outer > 1.0 {
            return false;
        }
        let inner_rx = radii.x - slack;
        let inner_ry = radii.y - slack;
        if inner_rx < f64::EPSILON || inner_ry < f64::EPSILON {
            return true;
        }
        (d.x / inner_rx).powi(2) + (d.y / inner_ry).powi(2) >= 1.0
    }
}

impl Geometry for Frame {
    fn bounds(&self) -> Rect {
        self.rect()
    }

    /// Rectangle outline hit test; ellipses go through [`Frame::hit_test_ellipse`].
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.rect();
        let slack = tolerance + STROKE_WIDTH / 2.0;
        let outer = rect.inflate(slack, slack);
        let inner = rect.inflate(-slack, -slack);
        outer.contains(point) && !(inner.width() > 0.0 && inner.height() > 0.0 && inner.contains(point))
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.anchor()) && self.width.is_finite() && self.height.is_finite()
    }

    fn drag_to(&mut self, start: Point, current: Point) {
        self.width = current.x - start.x;
        self.height = current.y - start.y;
    }
}
