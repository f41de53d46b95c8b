//! Geometry primitives for detection polygons.
//!
//! Detection files encode polygons either as an ordered array of `[x, y]`
//! pairs or, in older pipeline output, as an object whose keys sort into
//! vertex order (`{"p0": [x, y], "p1": [x, y], ...}`). Both decode into a
//! plain `Vec<Point>` here.

use serde_json::Value;

use crate::detection::coerce_number;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both coordinates multiplied by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn as_tuple(self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// An axis-aligned bounding box given by its extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    /// Bounding box of a point set, or `None` for an empty set.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut bb = BoundingBox {
            xmin: f32::INFINITY,
            ymin: f32::INFINITY,
            xmax: f32::NEG_INFINITY,
            ymax: f32::NEG_INFINITY,
        };
        for p in points {
            bb.xmin = bb.xmin.min(p.x);
            bb.ymin = bb.ymin.min(p.y);
            bb.xmax = bb.xmax.max(p.x);
            bb.ymax = bb.ymax.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }
}

/// Decode a polygon from either supported encoding.
///
/// Never fails: `null`, scalars and arrays that are not point lists decode to
/// an empty vector, and individual entries that are not numeric pairs are
/// dropped.
pub fn points_from_polygon(value: &Value) -> Vec<Point> {
    match value {
        Value::Array(entries) => {
            let is_point_list = entries
                .first()
                .and_then(Value::as_array)
                .is_some_and(|first| first.len() >= 2);
            if !is_point_list {
                return Vec::new();
            }
            entries.iter().filter_map(point_from_pair).collect()
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .filter_map(|k| map.get(k))
                .filter_map(point_from_pair)
                .collect()
        }
        _ => Vec::new(),
    }
}

fn point_from_pair(value: &Value) -> Option<Point> {
    let pair = value.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    Some(Point::new(coerce_number(&pair[0])?, coerce_number(&pair[1])?))
}

/// Scale every point by the zoom factor.
pub fn scale_for_zoom(points: &[Point], zoom: f32) -> Vec<Point> {
    points.iter().map(|p| p.scaled(zoom)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_array_polygon() {
        let pts = points_from_polygon(&json!([[1, 2], [3.5, "4"], [5, 6]]));
        assert_eq!(
            pts,
            vec![Point::new(1.0, 2.0), Point::new(3.5, 4.0), Point::new(5.0, 6.0)]
        );
    }

    #[test]
    fn test_dict_polygon_sorted_by_key() {
        let pts = points_from_polygon(&json!({
            "p2": [5, 6],
            "p0": [1, 2],
            "p1": [3, 4],
            "note": "ignored"
        }));
        assert_eq!(
            pts,
            vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)]
        );
    }

    #[test]
    fn test_invalid_polygons_are_empty() {
        assert!(points_from_polygon(&Value::Null).is_empty());
        assert!(points_from_polygon(&json!("nope")).is_empty());
        assert!(points_from_polygon(&json!(42)).is_empty());
        assert!(points_from_polygon(&json!([1, 2, 3, 4])).is_empty());
        assert!(points_from_polygon(&json!([])).is_empty());
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let pts = points_from_polygon(&json!([[1, 2], [3], ["x", 4], [5, 6]]));
        assert_eq!(pts, vec![Point::new(1.0, 2.0), Point::new(5.0, 6.0)]);
    }

    #[test]
    fn test_bounding_box() {
        let bb = BoundingBox::from_points(&[
            Point::new(100.0, 400.0),
            Point::new(500.0, 100.0),
            Point::new(300.0, 250.0),
        ])
        .unwrap();
        assert_eq!(bb.xmin, 100.0);
        assert_eq!(bb.ymin, 100.0);
        assert_eq!(bb.xmax, 500.0);
        assert_eq!(bb.ymax, 400.0);
        assert_eq!(bb.width(), 400.0);
        assert_eq!(bb.height(), 300.0);
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_scale_composes() {
        let poly = vec![Point::new(3.0, 7.5), Point::new(-2.0, 11.0), Point::new(0.25, 0.0)];
        for (z1, z2) in [(0.5, 2.0), (1.3, 0.7), (4.0, 1.25)] {
            let twice = scale_for_zoom(&scale_for_zoom(&poly, z1), z2);
            let once = scale_for_zoom(&poly, z1 * z2);
            for (a, b) in twice.iter().zip(&once) {
                assert!(approx_eq(a.x, b.x));
                assert!(approx_eq(a.y, b.y));
            }
        }
    }
}
