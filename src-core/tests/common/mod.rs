// FICHIER : src-core/tests/common/mod.rs

#![allow(dead_code)]
use geoqa::qa_engine::model::{ExpectedGeometry, FormatSupport};
use geoqa::source::{Feature, FixtureSource, LayerFixture};
use geoqa::utils::config::QaSettings;
use geoqa::{LayerConfig, LayerEvaluator};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Subscriber de test (une seule fois par binaire).
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn service_url(name: &str) -> String {
    format!(
        "https://example.test/arcgis/rest/services/{}/FeatureServer/0",
        name
    )
}

pub fn layer(name: &str, expected: ExpectedGeometry) -> LayerConfig {
    LayerConfig::new(name, &service_url(name), expected)
}

/// Métadonnées qui valent 100/100 au score de complétude.
pub fn full_metadata() -> Value {
    json!({
        "name": "Hydrants",
        "description": "Fire hydrants",
        "geometryType": "esriGeometryPoint",
        "extent": {
            "xmin": -74.3, "ymin": 40.5, "xmax": -73.7, "ymax": 40.9,
            "spatialReference": { "wkid": 4326, "latestWkid": 4326 }
        },
        "fields": [
            { "name": "OBJECTID", "type": "esriFieldTypeOID" },
            { "name": "HYDRANT_ID", "type": "esriFieldTypeString" },
            { "name": "STATUS", "type": "esriFieldTypeString" }
        ],
        "capabilities": "Query,Extract",
        "maxRecordCount": 1000,
        "advancedQueryCapabilities": { "supportsPagination": true }
    })
}

pub fn as_map(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

pub fn attrs(i: usize) -> Map<String, Value> {
    as_map(json!({
        "OBJECTID": i,
        "HYDRANT_ID": format!("H-{:04}", i),
        "STATUS": "ACTIVE"
    }))
}

pub fn point(i: usize) -> Feature {
    Feature::new(
        attrs(i),
        Some(json!({ "x": -74.0 + i as f64 * 0.001, "y": 40.7 })),
    )
}

pub fn empty_point(i: usize) -> Feature {
    Feature::new(attrs(i), None)
}

/// `n` entités dont `empty` sans géométrie (les dernières).
pub fn points_with_empty(n: usize, empty: usize) -> Vec<Feature> {
    (0..n)
        .map(|i| if i >= n - empty { empty_point(i) } else { point(i) })
        .collect()
}

/// Couche saine : toutes les règles passent ou sont NA.
pub fn healthy_fixture(name: &str, n: usize) -> LayerFixture {
    LayerFixture::new(&service_url(name))
        .with_metadata(full_metadata())
        .with_count(n as u64)
        .with_features((0..n).map(point).collect())
        .with_formats(FormatSupport::Both)
}

pub fn evaluator(source: FixtureSource) -> LayerEvaluator {
    init_tracing();
    let settings = QaSettings {
        retry_backoff: Duration::ZERO,
        ..QaSettings::default()
    };
    LayerEvaluator::new(Arc::new(source), settings)
}
