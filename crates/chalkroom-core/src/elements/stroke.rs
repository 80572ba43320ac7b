//! Freehand pen stroke.

use super::{Geometry, STROKE_WIDTH, SerializableColor, point_is_finite, point_to_polyline_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke rendered as a connected polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in logical space, in drawing order.
    pub points: Vec<Point>,
    #[serde(default)]
    pub color: SerializableColor,
}

impl Stroke {
    pub fn from_points(points: Vec<Point>, color: SerializableColor) -> Self {
        Self { points, color }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Geometry for Stroke {
    fn bounds(&self) -> Rect {
        let Some((&first, rest)) = self.points.split_first() else {
            return Rect::ZERO;
        };
        rest.iter()
            .fold(Rect::from_points(first, first), |acc, &p| acc.union_pt(p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + STROKE_WIDTH / 2.0
    }

    fn is_finite(&self) -> bool {
        self.points.iter().copied().all(point_is_finite)
    }

    fn drag_to(&mut self, _start: Point, current: Point) {
        self.points.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(points: &[(f64, f64)]) -> Stroke {
        Stroke::from_points(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            SerializableColor::default(),
        )
    }

    #[test]
    fn test_bounds() {
        let s = stroke(&[(0.0, 0.0), (100.0, 50.0), (50.0, 100.0)]);
        let bounds = s.bounds();
        assert!(bounds.x0.abs() < f64::EPSILON);
        assert!(bounds.y0.abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_point_bounds() {
        let s = stroke(&[(7.0, 9.0)]);
        assert_eq!(s.bounds(), Rect::new(7.0, 9.0, 7.0, 9.0));
    }

    #[test]
    fn test_hit_test() {
        let s = stroke(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(s.hit_test(Point::new(50.0, 0.0), 5.0));
        assert!(!s.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_drag_appends() {
        let mut s = stroke(&[(0.0, 0.0)]);
        s.drag_to(Point::ZERO, Point::new(3.0, 4.0));
        s.drag_to(Point::ZERO, Point::new(5.0, 6.0));
        assert_eq!(s.len(), 3);
        assert_eq!(s.points[2], Point::new(5.0, 6.0));
    }
}
