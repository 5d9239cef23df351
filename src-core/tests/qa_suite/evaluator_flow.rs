// FICHIER : src-core/tests/qa_suite/evaluator_flow.rs

use crate::common::{
    evaluator, full_metadata, healthy_fixture, layer, points_with_empty, service_url,
};
use geoqa::qa_engine::evidence::Evidence;
use geoqa::qa_engine::model::{ExpectedGeometry, FormatSupport};
use geoqa::source::{FixtureSource, LayerFixture, SourceCall};
use geoqa::{QaStatus, RuleName};
use serde_json::json;

#[tokio::test]
async fn test_unreachable_layer_has_single_rule() {
    let res = evaluator(FixtureSource::new())
        .evaluate(&layer("ghost", ExpectedGeometry::Point))
        .await;

    assert_eq!(res.overall_status, QaStatus::Fail);
    assert_eq!(res.rule_results.len(), 1);
    assert_eq!(res.rule_results[0].rule_name(), RuleName::Reachability);
    assert_eq!(res.errors, vec!["Failed to fetch metadata".to_string()]);
    assert!(res.raw_metadata.is_none());
}

#[tokio::test]
async fn test_failed_count_keeps_all_nine_rules() {
    let fixture = healthy_fixture("roads", 25).with_failure(SourceCall::Count, "HTTP 500 on /query");
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("roads", ExpectedGeometry::Point))
        .await;

    assert!(res.reachable);
    assert_eq!(res.rule_results.len(), 9);
    assert!(res.errors.is_empty());
    assert_eq!(res.count_estimate, None);
    assert_eq!(res.overall_status, QaStatus::Warn);
    assert_eq!(
        res.top_issues,
        "queryability: Metadata exists but query endpoint failed; \
         record_availability: Cannot determine record count"
    );
}

#[tokio::test]
async fn test_failed_metadata_is_unreachable() {
    let fixture = healthy_fixture("roads", 25).with_failure(SourceCall::Metadata, "HTTP 502");
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("roads", ExpectedGeometry::Point))
        .await;

    assert!(!res.reachable);
    assert_eq!(res.rule_results.len(), 1);
    assert_eq!(res.rule_results[0].status(), QaStatus::Fail);
    assert_eq!(res.top_issues, "reachability: Cannot fetch metadata from service");
}

#[tokio::test]
async fn test_all_pass_or_na_gives_pass() {
    let source = FixtureSource::new().with_layer(healthy_fixture("hydrants", 25));
    let res = evaluator(source)
        .evaluate(&layer("hydrants", ExpectedGeometry::Point))
        .await;

    assert_eq!(res.rule_results.len(), 9);
    assert!(res
        .rule_results
        .iter()
        .all(|r| matches!(r.status(), QaStatus::Pass | QaStatus::Na)));
    assert_eq!(res.overall_status, QaStatus::Pass);
    assert_eq!(res.metadata_score, 100);
    assert_eq!(res.max_record_count, Some(1000));
    assert_eq!(res.format_supported, FormatSupport::Both);
    assert_eq!(res.top_issues, "");
}

#[tokio::test]
async fn test_single_warning_gives_warn() {
    let mut meta = full_metadata();
    meta["extent"]["spatialReference"] = json!({ "wkid": 99999 });
    let fixture = healthy_fixture("odd_crs", 5).with_metadata(meta);
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("odd_crs", ExpectedGeometry::Point))
        .await;

    assert_eq!(res.overall_status, QaStatus::Warn);
    assert_eq!(res.count_with_status(QaStatus::Warn), 1);
    assert_eq!(res.spatial_reference_wkid, Some(99999));
    assert_eq!(
        res.top_issues,
        "spatial_reference: Unusual spatial reference (WKID: 99999)"
    );
}

#[tokio::test]
async fn test_any_failure_gives_fail() {
    let fixture = healthy_fixture("holes", 10).with_features(points_with_empty(10, 3));
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("holes", ExpectedGeometry::Point))
        .await;

    assert_eq!(res.overall_status, QaStatus::Fail);
    assert!(res.errors.is_empty());
    assert_eq!(res.pct_empty_geometry, 30.0);
    assert_eq!(res.pct_invalid_geometry, 0.0);
}

#[tokio::test]
async fn test_top_issues_keep_three_in_rule_order() {
    let fixture = LayerFixture::new(&service_url("bare")).with_metadata(json!({ "name": "Bare" }));
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("bare", ExpectedGeometry::Unknown))
        .await;

    // queryability, completeness, records et spatial_reference sont en défaut
    assert_eq!(res.issues().count(), 4);
    assert_eq!(
        res.top_issues,
        "queryability: Metadata exists but query endpoint failed; \
         metadata_completeness: Metadata is incomplete (score: 0/100); \
         record_availability: Cannot determine record count"
    );
    assert_eq!(res.overall_status, QaStatus::Fail);
}

#[tokio::test]
async fn test_pagination_reads_beyond_first_page() {
    let mut meta = full_metadata();
    meta["maxRecordCount"] = json!(10);
    let fixture = healthy_fixture("paged", 15).with_metadata(meta);
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("paged", ExpectedGeometry::Point))
        .await;

    let pagination = res.rule(RuleName::PaginationSupport).unwrap();
    assert_eq!(pagination.status(), QaStatus::Pass);
    match pagination.evidence() {
        Evidence::Pagination(p) => {
            assert!(p.tested);
            assert_eq!(p.max_record_count, Some(10));
            assert_eq!(p.second_page_features, Some(5));
        }
        other => panic!("preuve inattendue : {:?}", other),
    }
    assert_eq!(res.pagination_ok, QaStatus::Pass);

    // L'échantillon traverse les deux pages serveur
    let geometry = res.rule(RuleName::GeometrySanity).unwrap();
    assert_eq!(geometry.evidence().as_geometry().unwrap().total_features, 15);
}

#[tokio::test]
async fn test_pagination_transport_error_fails_rule() {
    let mut meta = full_metadata();
    meta["maxRecordCount"] = json!(10);
    let fixture = healthy_fixture("broken_pages", 15)
        .with_metadata(meta)
        .with_page_error("connection reset");
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("broken_pages", ExpectedGeometry::Point))
        .await;

    let pagination = res.rule(RuleName::PaginationSupport).unwrap();
    assert_eq!(pagination.status(), QaStatus::Fail);
    assert!(pagination.message().starts_with("Pagination failed: "));
    assert_eq!(pagination.evidence().error().map(|e| e.contains("connection reset")), Some(true));
    assert_eq!(res.pagination_ok, QaStatus::Fail);
    assert_eq!(res.overall_status, QaStatus::Fail);
    // Un échec de règle n'est pas une faute d'orchestration
    assert!(res.errors.is_empty());
}

#[tokio::test]
async fn test_malformed_fields_is_contained() {
    let mut meta = full_metadata();
    meta["fields"] = json!("OBJECTID,STATUS");
    let fixture = healthy_fixture("weird", 5).with_metadata(meta);
    let res = evaluator(FixtureSource::new().with_layer(fixture))
        .evaluate(&layer("weird", ExpectedGeometry::Point))
        .await;

    assert_eq!(res.rule_results.len(), 9);
    let completeness = res.rule(RuleName::MetadataCompleteness).unwrap();
    assert_eq!(completeness.status(), QaStatus::Fail);
    assert!(completeness.message().starts_with("Exception: "));
    assert_eq!(res.metadata_score, 0);
    assert!(res.errors.is_empty());
}

#[tokio::test]
async fn test_same_clock_same_result() {
    let now = chrono::Utc::now();
    let run = || async move {
        let source = FixtureSource::new().with_layer(healthy_fixture("stable", 8));
        evaluator(source)
            .with_now(now)
            .evaluate(&layer("stable", ExpectedGeometry::Point))
            .await
    };
    assert_eq!(run().await, run().await);
}
