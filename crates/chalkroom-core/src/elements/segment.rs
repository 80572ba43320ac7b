//! Lines and arrows.

use super::{Geometry, STROKE_WIDTH, SerializableColor, point_is_finite, point_to_segment_dist};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Length of each arrowhead barb, in logical units.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

/// Angle between the shaft and each barb.
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

/// A straight segment stored as anchor plus delta, matching the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: SerializableColor,
}

impl Segment {
    pub fn new(start: Point, delta: Vec2, color: SerializableColor) -> Self {
        Self {
            x: start.x,
            y: start.y,
            width: delta.x,
            height: delta.y,
            color,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Shaft angle in radians, pointing from start to end.
    pub fn angle(&self) -> f64 {
        self.height.atan2(self.width)
    }

    /// The two barb tips of the arrowhead drawn at the end point.
    pub fn arrow_head(&self) -> [Point; 2] {
        let end = self.end();
        let angle = self.angle();
        let barb = |a: f64| end - Vec2::new(a.cos(), a.sin()) * ARROW_HEAD_LENGTH;
        [barb(angle - ARROW_HEAD_ANGLE), barb(angle + ARROW_HEAD_ANGLE)]
    }

    /// Bounds including the arrowhead barbs.
    pub fn arrow_bounds(&self) -> Rect {
        let [left, right] = self.arrow_head();
        self.bounds().union_pt(left).union_pt(right)
    }
}

impl Geometry for Segment {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) <= tolerance + STROKE_WIDTH / 2.0
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.start()) && point_is_finite(self.end())
    }

    fn drag_to(&mut self, start: Point, current: Point) {
        self.width = current.x - start.x;
        self.height = current.y - start.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let s = Segment::new(Point::new(10.0, 20.0), Vec2::new(-5.0, 5.0), SerializableColor::default());
        assert_eq!(s.start(), Point::new(10.0, 20.0));
        assert_eq!(s.end(), Point::new(5.0, 25.0));
    }

    #[test]
    fn test_arrow_head_horizontal() {
        let s = Segment::new(Point::ZERO, Vec2::new(100.0, 0.0), SerializableColor::default());
        let [a, b] = s.arrow_head();
        let dx = ARROW_HEAD_LENGTH * ARROW_HEAD_ANGLE.cos();
        let dy = ARROW_HEAD_LENGTH * ARROW_HEAD_ANGLE.sin();
        assert!((a.x - (100.0 - dx)).abs() < 1e-9);
        assert!((a.y - dy).abs() < 1e-9);
        assert!((b.x - (100.0 - dx)).abs() < 1e-9);
        assert!((b.y + dy).abs() < 1e-9);
    }

    #[test]
    fn test_arrow_bounds_include_head() {
        let s = Segment::new(Point::ZERO, Vec2::new(100.0, 0.0), SerializableColor::default());
        let plain = s.bounds();
        let arrow = s.arrow_bounds();
        assert!(plain.height().abs() < f64::EPSILON);
        assert!(arrow.height() > 10.0);
    }

    #[test]
    fn test_hit_test() {
        let s = Segment::new(Point::ZERO, Vec2::new(100.0, 100.0), SerializableColor::default());
        assert!(s.hit_test(Point::new(50.0, 50.0), 0.5));
        assert!(!s.hit_test(Point::new(50.0, 0.0), 5.0));
    }
}
