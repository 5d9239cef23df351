// FICHIER : src-core/tests/qa_suite/reporting.rs

use crate::common::{evaluator, healthy_fixture, layer};
use geoqa::qa_engine::model::ExpectedGeometry;
use geoqa::report::{self, csv::CSV_COLUMNS};
use geoqa::source::FixtureSource;
use geoqa::{BatchOutcome, BatchRunner};

async fn outcome() -> BatchOutcome {
    let source = FixtureSource::new()
        .with_layer(healthy_fixture("Hydrants", 3))
        .with_layer(healthy_fixture("Empty, Layer", 0));
    let catalog = vec![
        layer("Hydrants", ExpectedGeometry::Point),
        layer("Empty, Layer", ExpectedGeometry::Point),
        layer("Gone/1", ExpectedGeometry::Polygon),
        layer("Gone/2", ExpectedGeometry::Polygon),
    ];
    BatchRunner::new(evaluator(source), 2)
        .run(&catalog, "layers.json")
        .await
}

#[tokio::test]
async fn test_markdown_sections() {
    let outcome = outcome().await;
    let md = report::render_markdown(&outcome.results, &outcome.summary);

    assert!(md.starts_with("# Geospatial QA Report"));
    assert!(md.contains("- **Config File:** layers.json"));
    assert!(md.contains("- **Total Layers:** 4"));
    assert!(md.contains("- **2x** reachability: Cannot fetch metadata from service"));
    assert!(md.contains("## Failed Layers"));
    assert!(md.contains("## Warning Layers"));
    assert!(md.contains("- **Hydrants** (3 features)"));

    // Détail : FAIL avant WARN avant PASS
    let failed = md.find("| Gone/1 |").unwrap();
    let warned = md.rfind("| Empty, Layer |").unwrap();
    let passed = md.rfind("| Hydrants |").unwrap();
    assert!(failed < warned && warned < passed);
}

#[tokio::test]
async fn test_csv_rows_and_escaping() {
    let outcome = outcome().await;
    let csv = report::render_csv(&outcome.results);
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], CSV_COLUMNS.join(","));
    assert!(lines[2].starts_with("\"Empty, Layer\","));
}

#[tokio::test]
async fn test_json_documents_per_layer() {
    let outcome = outcome().await;
    let raw = report::render_json(&outcome.results, &outcome.summary).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(doc["run"]["total_layers"], 4);
    let layers = doc["layers"].as_object().unwrap();
    let keys: Vec<&str> = layers.keys().map(String::as_str).collect();
    assert_eq!(keys, ["Hydrants", "Empty_ Layer", "Gone_1", "Gone_2"]);

    let hydrants = &layers["Hydrants"];
    assert_eq!(hydrants["overall_status"], "PASS");
    assert_eq!(hydrants["rule_results"].as_array().unwrap().len(), 9);
    assert_eq!(hydrants["metadata_excerpt"]["geometryType"], "esriGeometryPoint");

    let gone = &layers["Gone_1"];
    assert_eq!(gone["errors"][0], "Failed to fetch metadata");
    assert!(gone["metadata_excerpt"]["name"].is_null());
}
