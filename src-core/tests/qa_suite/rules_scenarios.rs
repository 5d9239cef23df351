// FICHIER : src-core/tests/qa_suite/rules_scenarios.rs

use crate::common::{as_map, full_metadata, point, points_with_empty};
use geoqa::qa_engine::evidence::Evidence;
use geoqa::qa_engine::model::ExpectedGeometry;
use geoqa::qa_engine::rules::{
    GeometrySanityRule, MetadataCompletenessRule, RecordAvailabilityRule, SchemaSanityRule,
    SpatialReferenceRule, UpdateRecencyRule,
};
use geoqa::source::Feature;
use geoqa::QaStatus;
use serde_json::json;

/// 100 -> 70 (toujours PASS) -> 50 (WARN) en retirant des composants.
#[test]
fn test_completeness_thresholds() {
    let mut meta = as_map(full_metadata());
    let full = MetadataCompletenessRule::evaluate(Some(&meta)).unwrap();
    assert_eq!(full.evidence().score(), Some(100));
    assert_eq!(full.status(), QaStatus::Pass);

    meta.remove("capabilities");
    meta.remove("maxRecordCount");
    meta.remove("advancedQueryCapabilities");
    let boundary = MetadataCompletenessRule::evaluate(Some(&meta)).unwrap();
    assert_eq!(boundary.evidence().score(), Some(70));
    assert_eq!(boundary.status(), QaStatus::Pass);

    meta.remove("extent");
    let partial = MetadataCompletenessRule::evaluate(Some(&meta)).unwrap();
    assert_eq!(partial.evidence().score(), Some(50));
    assert_eq!(partial.status(), QaStatus::Warn);
    assert_eq!(partial.message(), "Metadata is partially complete (score: 50/100)");

    let absent = MetadataCompletenessRule::evaluate(None).unwrap();
    assert_eq!(absent.status(), QaStatus::Fail);
    assert_eq!(absent.evidence().score(), Some(0));
}

#[test]
fn test_completeness_breakdown_is_kept_on_failure() {
    let meta = as_map(json!({ "description": "", "fields": [] }));
    let res = MetadataCompletenessRule::evaluate(Some(&meta)).unwrap();
    assert_eq!(res.status(), QaStatus::Fail);
    match res.evidence() {
        Evidence::MetadataCompleteness { score, components } => {
            assert_eq!(*score, 0);
            assert!(!components.description);
            assert_eq!(components.fields, 0);
        }
        other => panic!("preuve inattendue : {:?}", other),
    }
}

#[test]
fn test_record_availability_cases() {
    let zero = RecordAvailabilityRule::evaluate(Some(0));
    assert_eq!(zero.status(), QaStatus::Warn);
    assert_eq!(zero.evidence(), &Evidence::RecordAvailability { count: Some(0) });

    let unknown = RecordAvailabilityRule::evaluate(None);
    assert_eq!(unknown.status(), QaStatus::Warn);
    assert_eq!(unknown.evidence(), &Evidence::RecordAvailability { count: None });

    let five = RecordAvailabilityRule::evaluate(Some(5));
    assert_eq!(five.status(), QaStatus::Pass);
    assert_eq!(five.message(), "Layer contains 5 features");
}

#[test]
fn test_geometry_sanity_thresholds() {
    let thirty = points_with_empty(10, 3);
    let res = GeometrySanityRule::evaluate(Some(thirty.as_slice()), ExpectedGeometry::Point);
    assert_eq!(res.status(), QaStatus::Fail);
    assert_eq!(res.message(), "Geometry issues: 30.0% empty, 0.0% invalid");

    let ten = points_with_empty(10, 1);
    let res = GeometrySanityRule::evaluate(Some(ten.as_slice()), ExpectedGeometry::Point);
    assert_eq!(res.status(), QaStatus::Warn);
    let geom = res.evidence().as_geometry().unwrap();
    assert_eq!(geom.pct_empty, 10.0);
    assert_eq!(geom.pct_invalid, 0.0);

    let clean: Vec<Feature> = (0..10).map(point).collect();
    let res = GeometrySanityRule::evaluate(Some(clean.as_slice()), ExpectedGeometry::Point);
    assert_eq!(res.status(), QaStatus::Pass);
}

#[test]
fn test_geometry_type_mismatch_warns() {
    let lines: Vec<Feature> = (0..10)
        .map(|i| {
            Feature::new(
                crate::common::attrs(i),
                Some(json!({ "paths": [[[0.0, 0.0], [1.0, 1.0]]] })),
            )
        })
        .collect();
    let res = GeometrySanityRule::evaluate(Some(lines.as_slice()), ExpectedGeometry::Polygon);
    assert_eq!(res.status(), QaStatus::Warn);
    assert_eq!(res.message(), "Geometry type mismatch: 100.0%");

    // Attendu inconnu : aucun contrôle de type
    let res = GeometrySanityRule::evaluate(Some(lines.as_slice()), ExpectedGeometry::Unknown);
    assert_eq!(res.status(), QaStatus::Pass);
}

#[test]
fn test_self_intersecting_ring_is_invalid() {
    let bowtie = json!({ "rings": [[[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]] });
    let square = json!({ "rings": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]] });
    let mut features: Vec<Feature> = (0..3)
        .map(|i| Feature::new(crate::common::attrs(i), Some(bowtie.clone())))
        .collect();
    features.extend((3..10).map(|i| Feature::new(crate::common::attrs(i), Some(square.clone()))));

    let res = GeometrySanityRule::evaluate(Some(features.as_slice()), ExpectedGeometry::Polygon);
    assert_eq!(res.status(), QaStatus::Fail);
    assert_eq!(res.evidence().as_geometry().unwrap().invalid_count, 3);
}

#[test]
fn test_spatial_reference_cases() {
    let known = as_map(json!({ "extent": { "spatialReference": { "wkid": 4326 } } }));
    assert_eq!(SpatialReferenceRule::evaluate(Some(&known)).status(), QaStatus::Pass);

    let unusual = as_map(json!({ "extent": { "spatialReference": { "wkid": 99999 } } }));
    let res = SpatialReferenceRule::evaluate(Some(&unusual));
    assert_eq!(res.status(), QaStatus::Warn);
    assert_eq!(res.message(), "Unusual spatial reference (WKID: 99999)");

    let neither = as_map(json!({ "extent": { "xmin": 0 } }));
    assert_eq!(SpatialReferenceRule::evaluate(Some(&neither)).status(), QaStatus::Warn);

    assert_eq!(SpatialReferenceRule::evaluate(None).status(), QaStatus::Na);
}

#[test]
fn test_schema_duplicates_and_missing_identifier() {
    let features: Vec<Feature> = (0..4)
        .map(|i| {
            Feature::new(
                as_map(json!({ "NAME": format!("n{}", i), "name": format!("n{}", i) })),
                None,
            )
        })
        .collect();
    let res = SchemaSanityRule::evaluate(Some(features.as_slice())).unwrap();
    assert_eq!(res.status(), QaStatus::Warn);
    assert!(res.message().starts_with("Duplicate fields: ["));
    assert!(res.message().contains("; No OBJECTID-like field found"));
    let schema = res.evidence().as_schema().unwrap();
    assert!(!schema.has_objectid);
    assert_eq!(schema.duplicate_fields.len(), 1);
}

#[test]
fn test_schema_missing_identifier_alone_passes() {
    let features: Vec<Feature> = (0..4)
        .map(|i| Feature::new(as_map(json!({ "CODE": i, "LABEL": "x" })), None))
        .collect();
    let res = SchemaSanityRule::evaluate(Some(features.as_slice())).unwrap();
    assert_eq!(res.status(), QaStatus::Pass);
    assert!(!res.evidence().as_schema().unwrap().has_objectid);
}

#[test]
fn test_recency_is_relative_to_injected_clock() {
    let now = chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let stale = (now - chrono::Duration::days(3 * 365)).timestamp_millis();
    let meta = as_map(json!({ "editingInfo": { "lastEditDate": stale } }));

    let res = UpdateRecencyRule::evaluate(Some(&meta), 24, now).unwrap();
    assert_eq!(res.status(), QaStatus::Warn);
    assert!(res.message().starts_with("Layer not updated in 36 months"));

    let res = UpdateRecencyRule::evaluate(Some(&meta), 48, now).unwrap();
    assert_eq!(res.status(), QaStatus::Pass);
    let recency = res.evidence().as_recency().unwrap();
    assert!(recency.last_edit_date.is_some());
    assert_eq!(recency.threshold_months, Some(48));
}
