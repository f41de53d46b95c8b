//! Detection file normalization.
//!
//! Turns one parsed detection file into drawable [`AnnotationObject`]s in
//! original-image coordinates. The file's category is decided once from its
//! name and selects the branch that knows where that pipeline stage keeps its
//! polygons, labels and classes.

use serde_json::Value;

use crate::class_colors::{ClassColor, ClassColorRegistry};
use crate::constants::{
    DIM_OCR_CLASS, SPACE_OCR_CLASS, SYMBOL_OCR_CLASS, UNKNOWN_CLASS, UNKNOWN_CROP_CLASS,
};
use crate::detection::{
    class_name, confidence_score, index_field, objects_of, polygon_field, space_class,
    text_field,
};
use crate::error::{NormalizeError, NormalizeIssue};
use crate::geometry::{Point, points_from_polygon};
use crate::roi::{
    DimensionAreas, RoiTransform, dimension_affine, resolve_dimension_areas,
    resolve_primary_transform, to_original_space,
};

/// Main polygon keys for generic detections, in priority order.
const GENERIC_POLYGON_KEYS: &[&str] = &["polygon", "bbox_polygon", "original_polygon"];

/// Polygon keys for crop manifest objects (already in original space).
const MANIFEST_POLYGON_KEYS: &[&str] = &["original_polygon", "bbox_polygon"];

/// Label used for symbols with neither size nor detail text.
const SYMBOL_PLACEHOLDER_LABEL: &str = "symbol_ocr";

/// Which pipeline stage produced a detection file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    /// Documents the crop itself and seeds the transforms
    CropManifest,
    /// OCR of dimension text, reported per dimension crop
    DimensionOcr,
    /// OCR of symbol size/detail text
    SymbolOcr,
    /// OCR and segmentation of rooms/spaces
    SpaceOcr,
    /// Any other detection file in primary crop space
    Generic,
}

impl FileCategory {
    /// Categorize by case-insensitive file name pattern.
    ///
    /// Patterns are checked in priority order, so `crop_dim_ocr.json` is a
    /// crop manifest.
    pub fn from_file_name(file_name: &str) -> Self {
        let name = file_name.to_lowercase();
        if name.contains("crop") {
            Self::CropManifest
        } else if name.contains("dim_ocr") {
            Self::DimensionOcr
        } else if name.contains("symbol_ocr") {
            Self::SymbolOcr
        } else if name.contains("space_ocr") {
            Self::SpaceOcr
        } else {
            Self::Generic
        }
    }

    /// Whether normalization needs an extracted primary transform.
    pub fn requires_transform(&self) -> bool {
        !matches!(self, Self::CropManifest | Self::DimensionOcr)
    }
}

/// Kind-specific data of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    /// Plain outline
    Polygon,
    /// Recognized text
    OcrText {
        /// Dimension area the text was read from (dimension OCR only)
        crop_idx: Option<i64>,
        /// Outline of that dimension area in original space
        dimension_area_points: Option<Vec<Point>>,
    },
    /// Symbol with separately located size and detail text
    SymbolOcr {
        size_points: Vec<Point>,
        detail_points: Vec<Point>,
    },
}

/// One drawable detection in original-image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationObject {
    pub class: String,
    pub kind: AnnotationKind,
    pub polygon_points: Vec<Point>,
    pub label: String,
    pub confidence_score: Option<f32>,
    pub color: ClassColor,
    /// Axis-aligned box outline, when the source provides one separately
    pub bbox_points: Option<Vec<Point>>,
    /// The raw detection this was built from
    pub meta: Value,
}

impl AnnotationObject {
    /// Dimension area index for dimension-OCR text.
    pub fn crop_idx(&self) -> Option<i64> {
        match &self.kind {
            AnnotationKind::OcrText { crop_idx, .. } => *crop_idx,
            _ => None,
        }
    }

    /// Whether this is text read from a dimension crop.
    pub fn is_dimension_text(&self) -> bool {
        matches!(self.kind, AnnotationKind::OcrText { crop_idx: Some(_), .. })
    }
}

/// Result of normalizing one file.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub objects: Vec<AnnotationObject>,
    /// New primary transform (crop manifests only, when well formed)
    pub updated_transform: Option<RoiTransform>,
    /// Replacement dimension areas (crop manifests only)
    pub updated_dimension_areas: Option<DimensionAreas>,
    /// Recoverable problems encountered
    pub issues: Vec<NormalizeIssue>,
}

/// Normalize one parsed detection file.
///
/// `transform` and `dimension_areas` are the current session state; they are
/// not modified. A crop manifest reports its replacements in the outcome.
/// Class colors are assigned through `colors` as objects are produced.
pub fn normalize(
    file_name: &str,
    json: &Value,
    transform: &RoiTransform,
    dimension_areas: &DimensionAreas,
    colors: &mut ClassColorRegistry,
) -> Result<NormalizeOutcome, NormalizeError> {
    let category = FileCategory::from_file_name(file_name);

    if category.requires_transform() && !transform.extracted {
        let err = NormalizeError::MissingTransform {
            file_name: file_name.to_string(),
        };
        log::error!("{}", err);
        return Err(err);
    }

    let outcome = match category {
        FileCategory::CropManifest => normalize_crop_manifest(file_name, json, colors),
        FileCategory::DimensionOcr => normalize_dimension_ocr(json, dimension_areas, colors),
        FileCategory::SymbolOcr | FileCategory::SpaceOcr | FileCategory::Generic => {
            normalize_crop_space(category, json, transform, colors)
        }
    };

    for issue in &outcome.issues {
        log::warn!("{}: {}", file_name, issue);
    }
    log::debug!(
        "Normalized {} as {:?}: {} object(s)",
        file_name,
        category,
        outcome.objects.len()
    );

    Ok(outcome)
}

fn normalize_crop_manifest(
    file_name: &str,
    json: &Value,
    colors: &mut ClassColorRegistry,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome {
        updated_transform: resolve_primary_transform(json),
        updated_dimension_areas: Some(resolve_dimension_areas(json)),
        ..Default::default()
    };
    if outcome.updated_transform.is_none() {
        outcome.issues.push(NormalizeIssue::MalformedManifest {
            file_name: file_name.to_string(),
        });
    }

    for o in objects_of(json) {
        let class = class_name(o).unwrap_or(UNKNOWN_CROP_CLASS).to_string();
        let bbox_points = o
            .get("bbox_polygon")
            .filter(|v| !v.is_null())
            .map(points_from_polygon);

        outcome.objects.push(AnnotationObject {
            color: colors.color_for(&class),
            label: class.clone(),
            class,
            kind: AnnotationKind::Polygon,
            polygon_points: polygon_field(o, MANIFEST_POLYGON_KEYS),
            confidence_score: confidence_score(o),
            bbox_points,
            meta: o.clone(),
        });
    }

    outcome
}

fn normalize_dimension_ocr(
    json: &Value,
    dimension_areas: &DimensionAreas,
    colors: &mut ClassColorRegistry,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    let mut degraded: Vec<(Option<i64>, usize)> = Vec::new();

    for o in objects_of(json) {
        let crop_idx = index_field(o, "crop_idx");
        let local = o.get("polygon").map(points_from_polygon).unwrap_or_default();

        let polygon_points = match dimension_affine(crop_idx, dimension_areas) {
            Some(affine) => affine.apply_all(&local),
            None => {
                match degraded.iter_mut().find(|(idx, _)| *idx == crop_idx) {
                    Some((_, count)) => *count += 1,
                    None => degraded.push((crop_idx, 1)),
                }
                local
            }
        };

        let dimension_area_points = crop_idx
            .and_then(|idx| dimension_areas.get(&idx))
            .filter(|area| !area.original_polygon.is_empty())
            .map(|area| area.original_polygon.clone());

        outcome.objects.push(AnnotationObject {
            class: DIM_OCR_CLASS.to_string(),
            kind: AnnotationKind::OcrText {
                crop_idx,
                dimension_area_points,
            },
            polygon_points,
            label: text_field(o, "text").unwrap_or_default(),
            confidence_score: confidence_score(o),
            color: colors.color_for(DIM_OCR_CLASS),
            bbox_points: None,
            meta: o.clone(),
        });
    }

    outcome.issues = degraded
        .into_iter()
        .map(|(crop_idx, count)| NormalizeIssue::DegradedDimensionArea { crop_idx, count })
        .collect();
    outcome
}

fn normalize_crop_space(
    category: FileCategory,
    json: &Value,
    transform: &RoiTransform,
    colors: &mut ClassColorRegistry,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for o in objects_of(json) {
        let class = match category {
            FileCategory::SymbolOcr => SYMBOL_OCR_CLASS.to_string(),
            FileCategory::SpaceOcr => space_class(o).unwrap_or_else(|| SPACE_OCR_CLASS.to_string()),
            _ => class_name(o).unwrap_or(UNKNOWN_CLASS).to_string(),
        };

        let symbol_points = polygon_field(o, &["symbol_polygon"]);
        let main_points = if symbol_points.is_empty() {
            polygon_field(o, GENERIC_POLYGON_KEYS)
        } else {
            symbol_points
        };
        let text = text_field(o, "text").filter(|t| !t.is_empty());

        let (kind, label) = match category {
            FileCategory::SymbolOcr => {
                let size = text_field(o, "size").unwrap_or_default();
                let detail = text_field(o, "detail").unwrap_or_default();
                let joined = format!("{} {}", size, detail).trim().to_string();
                let label = if joined.is_empty() {
                    SYMBOL_PLACEHOLDER_LABEL.to_string()
                } else {
                    joined
                };
                let kind = AnnotationKind::SymbolOcr {
                    size_points: to_original_space(
                        &polygon_field(o, &["size_polygon"]),
                        transform,
                    ),
                    detail_points: to_original_space(
                        &polygon_field(o, &["detail_polygon"]),
                        transform,
                    ),
                };
                (kind, label)
            }
            _ => match text {
                Some(text) => (
                    AnnotationKind::OcrText {
                        crop_idx: None,
                        dimension_area_points: None,
                    },
                    text,
                ),
                None => (AnnotationKind::Polygon, class.clone()),
            },
        };

        outcome.objects.push(AnnotationObject {
            color: colors.color_for(&class),
            class,
            kind,
            polygon_points: to_original_space(&main_points, transform),
            label,
            confidence_score: confidence_score(o),
            bbox_points: None,
            meta: o.clone(),
        });
    }

    outcome
}
