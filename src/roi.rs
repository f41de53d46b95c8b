//! Region-of-interest transforms.
//!
//! Detections are reported in up to three coordinate systems: the original
//! image, the primary crop, and a crop-of-a-crop for dimension text. The crop
//! manifest documents the crops; this module turns it into axis-aligned
//! affine maps back to original-image space.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::detection::{class_name, index_field, number_field, objects_of, polygon_field};
use crate::geometry::{BoundingBox, Point};

/// Class of the manifest object that describes the primary crop.
const BACKGROUND_CLASS: &str = "background";

/// Class of manifest objects that describe nested dimension crops.
const DIMENSION_AREA_CLASS: &str = "dimension_area";

/// Boundary polygon keys, preferred first.
const ROI_POLYGON_KEYS: &[&str] = &["original_polygon", "bbox_polygon"];

/// Scale-then-offset map `p' = p * scale + offset`, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAffine {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl AxisAffine {
    /// Map a `crop_w x crop_h` crop back onto the rectangle `roi` it was cut from.
    ///
    /// Returns `None` when either extent is non-positive.
    pub fn from_crop(roi: &BoundingBox, crop_w: f32, crop_h: f32) -> Option<Self> {
        if roi.width() <= 0.0 || roi.height() <= 0.0 || crop_w <= 0.0 || crop_h <= 0.0 {
            return None;
        }
        Some(Self {
            scale_x: roi.width() / crop_w,
            scale_y: roi.height() / crop_h,
            offset_x: roi.xmin,
            offset_y: roi.ymin,
        })
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale_x + self.offset_x,
            p.y * self.scale_y + self.offset_y,
        )
    }

    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.apply(*p)).collect()
    }
}

/// Primary crop-space to original-space transform.
///
/// Stays `extracted == false` (identity) until a crop manifest is ingested.
/// A new value is only ever produced wholesale by [`resolve_primary_transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiTransform {
    pub extracted: bool,
    pub orig_w: f32,
    pub orig_h: f32,
    pub crop_w: f32,
    pub crop_h: f32,
    pub roi_xmin: f32,
    pub roi_ymin: f32,
    pub roi_xmax: f32,
    pub roi_ymax: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl RoiTransform {
    /// The not-yet-extracted identity transform.
    pub fn identity() -> Self {
        Self {
            extracted: false,
            orig_w: 0.0,
            orig_h: 0.0,
            crop_w: 0.0,
            crop_h: 0.0,
            roi_xmin: 0.0,
            roi_ymin: 0.0,
            roi_xmax: 0.0,
            roi_ymax: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn affine(&self) -> AxisAffine {
        AxisAffine {
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }

    /// Original image size recorded by the manifest, if extracted.
    pub fn original_size(&self) -> Option<(u32, u32)> {
        self.extracted
            .then(|| (self.orig_w.round() as u32, self.orig_h.round() as u32))
    }
}

impl Default for RoiTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// A dimension crop nested inside the primary crop.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionArea {
    /// Width of the dimension crop in its own pixels
    pub bbox_width: f32,
    /// Height of the dimension crop in its own pixels
    pub bbox_height: f32,
    /// Outline of the area in original-image space
    pub original_polygon: Vec<Point>,
}

impl DimensionArea {
    /// Affine from this area's local pixels to original space, if well formed.
    pub fn affine(&self) -> Option<AxisAffine> {
        if self.bbox_width == 0.0 || self.bbox_height == 0.0 {
            return None;
        }
        let roi = BoundingBox::from_points(&self.original_polygon)?;
        AxisAffine::from_crop(&roi, self.bbox_width, self.bbox_height)
    }
}

/// Dimension areas keyed by their manifest `idx`.
pub type DimensionAreas = BTreeMap<i64, DimensionArea>;

/// Build the primary transform from a crop manifest.
///
/// Returns `None` when the manifest has no `background` object, when any of
/// its size fields is zero or missing, or when its boundary polygon is
/// missing or degenerate.
pub fn resolve_primary_transform(manifest: &Value) -> Option<RoiTransform> {
    let background = objects_of(manifest)
        .iter()
        .find(|o| class_name(o) == Some(BACKGROUND_CLASS))?;

    let size = |group: &str, axis: &str| {
        background
            .get(group)
            .and_then(|g| number_field(g, axis))
            .filter(|v| *v != 0.0)
    };
    let orig_w = size("original_size", "width")?;
    let orig_h = size("original_size", "height")?;
    let crop_w = size("crop_size", "width")?;
    let crop_h = size("crop_size", "height")?;

    let roi_points = polygon_field(background, ROI_POLYGON_KEYS);
    let roi = BoundingBox::from_points(&roi_points)?;
    let affine = AxisAffine::from_crop(&roi, crop_w, crop_h)?;

    log::debug!(
        "Resolved ROI transform: roi=({}, {})-({}, {}), scale=({:.4}, {:.4})",
        roi.xmin,
        roi.ymin,
        roi.xmax,
        roi.ymax,
        affine.scale_x,
        affine.scale_y
    );

    Some(RoiTransform {
        extracted: true,
        orig_w,
        orig_h,
        crop_w,
        crop_h,
        roi_xmin: roi.xmin,
        roi_ymin: roi.ymin,
        roi_xmax: roi.xmax,
        roi_ymax: roi.ymax,
        scale_x: affine.scale_x,
        scale_y: affine.scale_y,
        offset_x: affine.offset_x,
        offset_y: affine.offset_y,
    })
}

/// Collect every `dimension_area` object that carries an `idx`.
pub fn resolve_dimension_areas(manifest: &Value) -> DimensionAreas {
    objects_of(manifest)
        .iter()
        .filter(|o| class_name(o) == Some(DIMENSION_AREA_CLASS))
        .filter_map(|o| {
            let idx = index_field(o, "idx")?;
            Some((
                idx,
                DimensionArea {
                    bbox_width: number_field(o, "bbox_width").unwrap_or(0.0),
                    bbox_height: number_field(o, "bbox_height").unwrap_or(0.0),
                    original_polygon: polygon_field(o, ROI_POLYGON_KEYS),
                },
            ))
        })
        .collect()
}

/// Map crop-space points to original space; identity until extracted.
pub fn to_original_space(points: &[Point], transform: &RoiTransform) -> Vec<Point> {
    if !transform.extracted {
        return points.to_vec();
    }
    transform.affine().apply_all(points)
}

/// The affine for dimension crop `crop_idx`, if that area exists and is well formed.
pub fn dimension_affine(crop_idx: Option<i64>, areas: &DimensionAreas) -> Option<AxisAffine> {
    areas.get(&crop_idx?)?.affine()
}

/// Map points local to dimension crop `crop_idx` to original space.
///
/// Independent of the primary transform. An unknown or zero-sized area leaves
/// the points untouched.
pub fn dimension_to_original_space(
    points: &[Point],
    crop_idx: Option<i64>,
    areas: &DimensionAreas,
) -> Vec<Point> {
    match dimension_affine(crop_idx, areas) {
        Some(affine) => affine.apply_all(points),
        None => points.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn manifest() -> Value {
        json!({
            "objects": [
                {
                    "class_name": "background",
                    "original_size": {"width": 800, "height": 600},
                    "crop_size": {"width": 400, "height": 300},
                    "original_polygon": [[100, 100], [500, 100], [500, 400], [100, 400]]
                },
                {
                    "class_name": "dimension_area",
                    "idx": 0,
                    "bbox_width": 20,
                    "bbox_height": 20,
                    "original_polygon": [[150, 150], [170, 150], [170, 170], [150, 170]]
                },
                {
                    "class_name": "dimension_area",
                    "bbox_width": 10,
                    "bbox_height": 10,
                    "original_polygon": [[0, 0], [10, 10]]
                }
            ]
        })
    }

    #[test]
    fn test_resolve_primary_transform() {
        let t = resolve_primary_transform(&manifest()).unwrap();
        assert!(t.extracted);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.offset_x, 100.0);
        assert_eq!(t.offset_y, 100.0);
        assert_eq!(t.original_size(), Some((800, 600)));
    }

    #[test]
    fn test_scaled_crop() {
        let m = json!({"objects": [{
            "class_name": "background",
            "original_size": {"width": 2000, "height": 1000},
            "crop_size": {"width": 500, "height": 250},
            "bbox_polygon": {"b": [1200, 600], "a": [200, 100]}
        }]});
        let t = resolve_primary_transform(&m).unwrap();
        assert!(approx_eq(t.scale_x, 2.0));
        assert!(approx_eq(t.scale_y, 2.0));
        let p = to_original_space(&[Point::new(250.0, 125.0)], &t);
        assert!(approx_eq(p[0].x, 700.0));
        assert!(approx_eq(p[0].y, 350.0));
    }

    #[test]
    fn test_round_trip_through_crop_space() {
        // Points expressed in crop space map back onto the ROI polygon.
        let t = resolve_primary_transform(&manifest()).unwrap();
        let roi = [
            Point::new(100.0, 100.0),
            Point::new(500.0, 100.0),
            Point::new(500.0, 400.0),
            Point::new(100.0, 400.0),
        ];
        let crop: Vec<Point> = roi
            .iter()
            .map(|p| {
                Point::new(
                    (p.x - t.offset_x) / t.scale_x,
                    (p.y - t.offset_y) / t.scale_y,
                )
            })
            .collect();
        let back = to_original_space(&crop, &t);
        for (a, b) in back.iter().zip(&roi) {
            assert!(approx_eq(a.x, b.x));
            assert!(approx_eq(a.y, b.y));
        }
    }

    #[test]
    fn test_malformed_manifests() {
        assert!(resolve_primary_transform(&json!({})).is_none());
        assert!(resolve_primary_transform(&json!({"objects": []})).is_none());
        assert!(resolve_primary_transform(&json!({"objects": [{"class_name": "wall"}]})).is_none());

        let zero_crop = json!({"objects": [{
            "class_name": "background",
            "original_size": {"width": 800, "height": 600},
            "crop_size": {"width": 0, "height": 300},
            "original_polygon": [[0, 0], [10, 10]]
        }]});
        assert!(resolve_primary_transform(&zero_crop).is_none());

        let flat_roi = json!({"objects": [{
            "class_name": "background",
            "original_size": {"width": 800, "height": 600},
            "crop_size": {"width": 400, "height": 300},
            "original_polygon": [[10, 10], [10, 50]]
        }]});
        assert!(resolve_primary_transform(&flat_roi).is_none());

        let no_polygon = json!({"objects": [{
            "class_name": "background",
            "original_size": {"width": 800, "height": 600},
            "crop_size": {"width": 400, "height": 300}
        }]});
        assert!(resolve_primary_transform(&no_polygon).is_none());
    }

    #[test]
    fn test_identity_until_extracted() {
        let pts = [Point::new(3.0, 4.0)];
        assert_eq!(to_original_space(&pts, &RoiTransform::identity()), pts.to_vec());
    }

    #[test]
    fn test_dimension_areas_require_idx() {
        let areas = resolve_dimension_areas(&manifest());
        assert_eq!(areas.len(), 1);
        let area = &areas[&0];
        assert_eq!(area.bbox_width, 20.0);
        assert_eq!(area.original_polygon.len(), 4);
    }

    #[test]
    fn test_dimension_to_original_space() {
        let areas = resolve_dimension_areas(&manifest());
        let p = dimension_to_original_space(&[Point::new(10.0, 10.0)], Some(0), &areas);
        assert!(approx_eq(p[0].x, 160.0));
        assert!(approx_eq(p[0].y, 160.0));
    }

    #[test]
    fn test_dimension_degrades_to_identity() {
        let mut areas = resolve_dimension_areas(&manifest());
        let pts = [Point::new(10.0, 10.0)];
        assert_eq!(dimension_to_original_space(&pts, Some(9), &areas), pts.to_vec());
        assert_eq!(dimension_to_original_space(&pts, None, &areas), pts.to_vec());

        areas.insert(
            1,
            DimensionArea {
                bbox_width: 0.0,
                bbox_height: 20.0,
                original_polygon: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            },
        );
        assert_eq!(dimension_to_original_space(&pts, Some(1), &areas), pts.to_vec());
    }
}
