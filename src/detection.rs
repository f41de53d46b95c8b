//! Best-effort field lookups on raw detection JSON.
//!
//! Detection files come from several pipeline stages and do not share a
//! schema. Every accessor here treats a missing field or an unexpected shape
//! as absent instead of failing.

use serde_json::Value;

use crate::geometry::{Point, points_from_polygon};

/// Keys checked, in order, for a detection's confidence.
const CONFIDENCE_KEYS: &[&str] = &["confidence_score", "confidence", "score"];

/// Keys checked, in order, for a space-OCR detection's class.
const SPACE_CLASS_KEYS: &[&str] = &[
    "segmentation_class",
    "class_name",
    "space_class",
    "room_class",
    "category",
    "type",
];

/// The detection list of a file: `objects`, else `data.objects`, else empty.
pub(crate) fn objects_of(json: &Value) -> &[Value] {
    json.get("objects")
        .and_then(Value::as_array)
        .or_else(|| {
            json.get("data")
                .and_then(|d| d.get("objects"))
                .and_then(Value::as_array)
        })
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Numbers and numeric strings as `f32`; everything else (including non-finite
/// values) is `None`.
pub(crate) fn coerce_number(value: &Value) -> Option<f32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let n = n as f32;
    n.is_finite().then_some(n)
}

/// Numeric field, `None` when missing or not numeric.
pub(crate) fn number_field(obj: &Value, key: &str) -> Option<f32> {
    obj.get(key).and_then(coerce_number)
}

/// Integer index field such as `idx` or `crop_idx`.
pub(crate) fn index_field(obj: &Value, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Scalar rendered as text; arrays, objects and null are `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text field; numbers are stringified, anything else is `None`.
pub(crate) fn text_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(scalar_text)
}

/// The detection's `class_name`, if present and non-empty.
pub(crate) fn class_name(obj: &Value) -> Option<&str> {
    obj.get("class_name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First non-null value among `keys`.
pub(crate) fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Decode the polygon stored under the first non-null key of `keys`.
pub(crate) fn polygon_field(obj: &Value, keys: &[&str]) -> Vec<Point> {
    first_present(obj, keys)
        .map(points_from_polygon)
        .unwrap_or_default()
}

/// Confidence from the first present confidence key.
///
/// Only the first present key is considered: a non-numeric value there yields
/// `None` rather than falling through to the next key.
pub(crate) fn confidence_score(obj: &Value) -> Option<f32> {
    let candidate = first_present(obj, CONFIDENCE_KEYS)?;
    if candidate.as_str().is_some_and(str::is_empty) {
        return None;
    }
    coerce_number(candidate)
}

/// Class for a space-OCR detection: first non-blank candidate field.
pub(crate) fn space_class(obj: &Value) -> Option<String> {
    SPACE_CLASS_KEYS
        .iter()
        .filter_map(|k| obj.get(*k).and_then(scalar_text))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_fallback_to_data() {
        let direct = json!({"objects": [{"a": 1}]});
        let nested = json!({"data": {"objects": [{"a": 1}, {"a": 2}]}});
        let wrong = json!({"objects": {"a": 1}});
        assert_eq!(objects_of(&direct).len(), 1);
        assert_eq!(objects_of(&nested).len(), 2);
        assert!(objects_of(&wrong).is_empty());
        assert!(objects_of(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_confidence_priority() {
        assert_eq!(
            confidence_score(&json!({"confidence_score": 0.9, "score": 0.1})),
            Some(0.9)
        );
        assert_eq!(confidence_score(&json!({"confidence": "0.75"})), Some(0.75));
        assert_eq!(confidence_score(&json!({"score": 1})), Some(1.0));
        assert_eq!(confidence_score(&json!({"confidence": ""})), None);
        assert_eq!(confidence_score(&json!({"confidence": "high", "score": 0.5})), None);
        assert_eq!(confidence_score(&json!({"confidence": null, "score": 0.5})), Some(0.5));
        assert_eq!(confidence_score(&json!({})), None);
    }

    #[test]
    fn test_space_class_priority() {
        let obj = json!({"class_name": "room", "segmentation_class": "  ", "category": "x"});
        assert_eq!(space_class(&obj).as_deref(), Some("room"));
        let obj = json!({"segmentation_class": " kitchen "});
        assert_eq!(space_class(&obj).as_deref(), Some("kitchen"));
        let obj = json!({"type": 7});
        assert_eq!(space_class(&obj).as_deref(), Some("7"));
        assert_eq!(space_class(&json!({})), None);
    }

    #[test]
    fn test_index_field() {
        assert_eq!(index_field(&json!({"idx": 3}), "idx"), Some(3));
        assert_eq!(index_field(&json!({"idx": 3.0}), "idx"), Some(3));
        assert_eq!(index_field(&json!({"idx": "4"}), "idx"), Some(4));
        assert_eq!(index_field(&json!({"idx": 2.5}), "idx"), None);
        assert_eq!(index_field(&json!({"idx": null}), "idx"), None);
    }

    #[test]
    fn test_first_present_skips_null() {
        let obj = json!({"polygon": null, "bbox_polygon": [[0, 0], [1, 1]]});
        let pts = polygon_field(&obj, &["polygon", "bbox_polygon"]);
        assert_eq!(pts.len(), 2);
    }
}
