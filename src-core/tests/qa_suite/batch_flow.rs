// FICHIER : src-core/tests/qa_suite/batch_flow.rs

use crate::common::{evaluator, healthy_fixture, layer};
use geoqa::qa_engine::model::{parse_catalog, ExpectedGeometry};
use geoqa::source::FixtureSource;
use geoqa::{BatchRunner, QaStatus};
use std::io::Write;

fn mixed_source() -> FixtureSource {
    FixtureSource::new()
        .with_layer(healthy_fixture("alpha", 4))
        .with_layer(healthy_fixture("gamma", 0))
}

#[tokio::test]
async fn test_batch_mixed_catalogue() {
    let catalog = vec![
        layer("alpha", ExpectedGeometry::Point),
        layer("beta", ExpectedGeometry::Line),
        layer("gamma", ExpectedGeometry::Point),
    ];
    let outcome = BatchRunner::new(evaluator(mixed_source()), 2)
        .run(&catalog, "layers.json")
        .await;

    let statuses: Vec<QaStatus> = outcome.results.iter().map(|r| r.overall_status).collect();
    assert_eq!(statuses, [QaStatus::Pass, QaStatus::Fail, QaStatus::Warn]);
    assert_eq!(outcome.summary.total_layers, 3);
    assert_eq!(outcome.summary.pass_count, 1);
    assert_eq!(outcome.summary.warn_count, 1);
    assert_eq!(outcome.summary.fail_count, 1);
    assert_eq!(outcome.summary.config_source, "layers.json");
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_batch_order_is_independent_of_concurrency() {
    let catalog: Vec<_> = ["gamma", "beta", "alpha"]
        .iter()
        .map(|n| layer(n, ExpectedGeometry::Point))
        .collect();

    let serial = BatchRunner::new(evaluator(mixed_source()), 1)
        .run(&catalog, "memory")
        .await;
    let parallel = BatchRunner::new(evaluator(mixed_source()), 8)
        .run(&catalog, "memory")
        .await;

    let names = |o: &geoqa::BatchOutcome| -> Vec<String> {
        o.results.iter().map(|r| r.layer_name.clone()).collect()
    };
    assert_eq!(names(&serial), ["gamma", "beta", "alpha"]);
    assert_eq!(names(&serial), names(&parallel));
}

#[tokio::test]
async fn test_catalogue_file_to_outcome() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{ "layer_name": "alpha", "service_url": "{}", "expected_geometry": "point" }},
            {{ "layer_name": "", "service_url": "https://example.test/blank" }},
            {{ "layer_name": "beta", "service_url": "{}", "expected_geometry": "polyline", "owner": "GIS" }}
        ]"#,
        crate::common::service_url("alpha"),
        crate::common::service_url("beta")
    )
    .unwrap();

    let catalog = geoqa::qa_engine::load_catalog(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[1].expected_geometry, ExpectedGeometry::Line);
    assert_eq!(catalog[1].owner.as_deref(), Some("GIS"));

    let outcome = BatchRunner::new(evaluator(mixed_source()), 4)
        .run(&catalog, &file.path().display().to_string())
        .await;
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn test_catalogue_rejects_duplicate_names() {
    let raw = r#"[
        { "layer_name": "a", "service_url": "https://example.test/1" },
        { "layer_name": "a", "service_url": "https://example.test/2" }
    ]"#;
    assert!(parse_catalog(raw).is_err());
}

#[tokio::test]
async fn test_bundled_fixtures_end_to_end() {
    crate::common::init_tracing();
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    let source = FixtureSource::from_dir(root.join("services")).await.unwrap();
    assert_eq!(source.len(), 4);
    let catalog = geoqa::qa_engine::load_catalog(&root.join("layers.json")).unwrap();

    let now = chrono::DateTime::parse_from_rfc3339("2026-10-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let evaluator = geoqa::LayerEvaluator::new(
        std::sync::Arc::new(source),
        geoqa::utils::config::QaSettings::default(),
    )
    .with_now(now);
    let outcome = BatchRunner::new(evaluator, 3).run(&catalog, "layers.json").await;

    let statuses: Vec<(&str, QaStatus)> = outcome
        .results
        .iter()
        .map(|r| (r.layer_name.as_str(), r.overall_status))
        .collect();
    assert_eq!(
        statuses,
        [
            ("Hydrants", QaStatus::Pass),
            ("Parcels", QaStatus::Warn),
            ("Street Centerlines", QaStatus::Warn),
            ("Wetlands", QaStatus::Warn),
            ("Bike Lanes", QaStatus::Fail),
        ]
    );

    let parcels = &outcome.results[1];
    assert_eq!(parcels.pagination_ok, QaStatus::Pass);
    assert_eq!(parcels.spatial_reference_wkid, Some(102718));
    assert_eq!(parcels.null_fields_over_80pct, 1);
    assert!(parcels.top_issues.starts_with("geometry_sanity: Some geometry issues"));

    let streets = &outcome.results[2];
    assert_eq!(streets.pct_empty_geometry, 10.0);
    assert_eq!(streets.metadata_score, 80);
    assert_eq!(outcome.exit_code(), 0);
}
