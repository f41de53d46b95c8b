//! Ingest scenarios: transforms, dimension areas, colors and error recovery.

use serde_json::{Value, json};

use crate::error::{NormalizeError, NormalizeIssue};
use crate::geometry::Point;
use crate::normalize::AnnotationKind;
use crate::roi::{resolve_primary_transform, to_original_space};
use crate::session::RenderSession;

const EPSILON: f32 = 0.001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn crop_manifest() -> Value {
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
                "idx": 4,
                "bbox_width": 20,
                "bbox_height": 20,
                "original_polygon": [[150, 150], [170, 150], [170, 170], [150, 170]]
            }
        ]
    })
}

#[test]
fn test_dimension_text_maps_through_its_area() {
    let mut session = RenderSession::with_color_seed(3);
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();
    assert_eq!(session.dimension_areas().len(), 1);

    let dims = json!({"objects": [
        {"text": " 3600 ", "crop_idx": 4, "polygon": [[10, 10], [15, 10], [15, 12]]}
    ]});
    let classes = session.ingest("plan_dim_ocr.json", &dims).unwrap();
    let text = &classes["dim_ocr"][0];

    assert_eq!(text.polygon_points[0], Point::new(160.0, 160.0));
    assert_eq!(text.crop_idx(), Some(4));
    match &text.kind {
        AnnotationKind::OcrText {
            dimension_area_points: Some(area),
            ..
        } => assert_eq!(area.len(), 4),
        other => panic!("unexpected kind {:?}", other),
    }
    assert!(session.issues().is_empty());
}

#[test]
fn test_unknown_dimension_index_degrades() {
    let mut session = RenderSession::with_color_seed(3);
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();

    let dims = json!({"objects": [
        {"text": "900", "crop_idx": 9, "polygon": [[10, 10], [20, 20]]}
    ]});
    session.ingest("plan_dim_ocr.json", &dims).unwrap();

    let text = &session.classes()["dim_ocr"][0];
    assert_eq!(text.polygon_points[0], Point::new(10.0, 10.0));
    assert_eq!(
        session.issues(),
        &[NormalizeIssue::DegradedDimensionArea {
            crop_idx: Some(9),
            count: 1
        }]
    );
}

#[test]
fn test_generic_file_before_manifest() {
    let mut session = RenderSession::with_color_seed(3);
    let walls = json!({"objects": [{"class_name": "wall", "polygon": [[0, 0], [1, 0], [1, 1]]}]});

    let err = session.ingest("walls.json", &walls).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::MissingTransform {
            file_name: "walls.json".to_string()
        }
    );
    assert!(session.classes().is_empty());
    assert!(!session.transform().extracted);

    // Loading the manifest afterwards makes the same file usable
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();
    let classes = session.ingest("walls.json", &walls).unwrap();
    assert_eq!(classes["wall"][0].polygon_points[0], Point::new(100.0, 100.0));
}

#[test]
fn test_malformed_manifest_keeps_transform() {
    let mut session = RenderSession::with_color_seed(3);
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();
    let good = *session.transform();

    let broken = json!({"objects": [
        {"class_name": "room", "original_polygon": [[0, 0], [10, 0], [10, 10]]}
    ]});
    session.ingest("other_crop.json", &broken).unwrap();

    assert_eq!(*session.transform(), good);
    // Dimension areas come from the newest manifest even without a background
    assert!(session.dimension_areas().is_empty());
    assert_eq!(session.content_size(), Some((800, 600)));
    assert_eq!(
        session.issues(),
        &[NormalizeIssue::MalformedManifest {
            file_name: "other_crop.json".to_string()
        }]
    );
    assert_eq!(session.classes()["room"].len(), 1);
}

#[test]
fn test_dimension_areas_without_background() {
    let mut session = RenderSession::with_color_seed(3);
    let areas_only = json!({"objects": [{
        "class_name": "dimension_area",
        "idx": 0,
        "bbox_width": 20,
        "bbox_height": 20,
        "original_polygon": [[150, 150], [170, 150], [170, 170], [150, 170]]
    }]});
    session.ingest("plan_crop.json", &areas_only).unwrap();
    assert!(!session.transform().extracted);
    assert_eq!(session.dimension_areas().len(), 1);

    let dims = json!({"objects": [
        {"text": "1500", "crop_idx": 0, "polygon": [[10, 10], [12, 12]]}
    ]});
    let classes = session.ingest("plan_dim_ocr.json", &dims).unwrap();
    assert_eq!(classes["dim_ocr"][0].polygon_points[0], Point::new(160.0, 160.0));
}

#[test]
fn test_class_color_stable_across_files() {
    let mut session = RenderSession::with_color_seed(11);
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();

    let first = json!({"objects": [{"class_name": "door", "polygon": [[0, 0], [5, 0], [5, 5]]}]});
    let second = json!({"data": {"objects": [
        {"class_name": "window", "polygon": [[0, 0], [5, 0], [5, 5]]},
        {"class_name": "door", "polygon": [[9, 9], [12, 9], [12, 12]]}
    ]}});

    let door_first = session.ingest("doors.json", &first).unwrap()["door"][0].color;
    let door_second = session.ingest("openings.json", &second).unwrap()["door"][0].color;
    assert_eq!(door_first, door_second);
    assert_eq!(session.colors().get("door"), Some(door_first));
}

#[test]
fn test_new_image_keeps_colors() {
    let mut session = RenderSession::with_color_seed(11);
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();
    let background = session.colors().get("background");

    session.start_image(640, 480);
    assert!(!session.transform().extracted);
    assert!(session.dimension_areas().is_empty());
    assert_eq!(session.colors().get("background"), background);
}

#[test]
fn test_manifest_polygon_round_trip() {
    let manifest = json!({"objects": [{
        "class_name": "background",
        "original_size": {"width": 2000, "height": 1000},
        "crop_size": {"width": 500, "height": 250},
        "original_polygon": [[200, 100], [1200, 100], [1200, 600], [200, 600]]
    }]});
    let transform = resolve_primary_transform(&manifest).unwrap();

    let crop_corners = [
        Point::new(0.0, 0.0),
        Point::new(500.0, 0.0),
        Point::new(500.0, 250.0),
        Point::new(0.0, 250.0),
    ];
    let original = to_original_space(&crop_corners, &transform);
    let expected = [(200.0, 100.0), (1200.0, 100.0), (1200.0, 600.0), (200.0, 600.0)];
    for (p, (x, y)) in original.iter().zip(expected) {
        assert!(approx_eq(p.x, x) && approx_eq(p.y, y), "{:?}", p);
    }
}

#[test]
fn test_symbol_outlines_use_primary_transform() {
    let mut session = RenderSession::with_color_seed(3);
    session.ingest("plan_crop.json", &crop_manifest()).unwrap();

    let symbols = json!({"objects": [{
        "symbol_polygon": [[0, 0], [10, 0], [10, 10]],
        "size": "W1",
        "detail": "900x1200",
        "size_polygon": [[1, 1], [4, 4]],
        "detail_polygon": [[5, 5], [8, 8]]
    }]});
    let classes = session.ingest("plan_symbol_ocr.json", &symbols).unwrap();
    let symbol = &classes["symbol_ocr"][0];

    assert_eq!(symbol.label, "W1 900x1200");
    assert_eq!(symbol.polygon_points[0], Point::new(100.0, 100.0));
    match &symbol.kind {
        AnnotationKind::SymbolOcr {
            size_points,
            detail_points,
        } => {
            assert_eq!(size_points[0], Point::new(101.0, 101.0));
            assert_eq!(detail_points[1], Point::new(108.0, 108.0));
        }
        other => panic!("unexpected kind {:?}", other),
    }
}
