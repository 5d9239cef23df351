// FICHIER : src-core/src/qa_engine/model.rs

use super::evidence::Evidence;
use super::status::QaStatus;
use crate::utils::data::{Deserialize, HashSet, Map, Serialize, Value};
use crate::utils::error::{AppError, AppResult};
use crate::utils::json;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Identifiant des neuf règles, dans l'ordre d'évaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    Reachability,
    Queryability,
    MetadataCompleteness,
    RecordAvailability,
    PaginationSupport,
    SchemaSanity,
    GeometrySanity,
    UpdateRecency,
    SpatialReference,
}

impl RuleName {
    pub const ALL: [RuleName; 9] = [
        RuleName::Reachability,
        RuleName::Queryability,
        RuleName::MetadataCompleteness,
        RuleName::RecordAvailability,
        RuleName::PaginationSupport,
        RuleName::SchemaSanity,
        RuleName::GeometrySanity,
        RuleName::UpdateRecency,
        RuleName::SpatialReference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleName::Reachability => "reachability",
            RuleName::Queryability => "queryability",
            RuleName::MetadataCompleteness => "metadata_completeness",
            RuleName::RecordAvailability => "record_availability",
            RuleName::PaginationSupport => "pagination_support",
            RuleName::SchemaSanity => "schema_sanity",
            RuleName::GeometrySanity => "geometry_sanity",
            RuleName::UpdateRecency => "update_recency",
            RuleName::SpatialReference => "spatial_reference",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Résultat d'une règle. Immuable après construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    rule_name: RuleName,
    status: QaStatus,
    message: String,
    evidence: Evidence,
}

impl RuleResult {
    pub fn new(
        rule_name: RuleName,
        status: QaStatus,
        message: impl Into<String>,
        evidence: Evidence,
    ) -> Self {
        Self {
            rule_name,
            status,
            message: message.into(),
            evidence,
        }
    }

    pub fn rule_name(&self) -> RuleName {
        self.rule_name
    }

    pub fn status(&self) -> QaStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    /// Format du condensé : `"<rule_name>: <message>"`.
    pub fn issue_line(&self) -> String {
        format!("{}: {}", self.rule_name, self.message)
    }
}

/// Catégorie de géométrie attendue (comparaison souple uniquement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExpectedGeometry {
    Point,
    Line,
    Polygon,
    #[default]
    Unknown,
}

impl ExpectedGeometry {
    /// Lecture tolérante : `MultiPoint`, `Polyline`, `esriGeometryPolygon`... ; le reste => Unknown.
    pub fn parse_lenient(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        let key = lowered.trim_start_matches("esrigeometry");
        match key {
            "point" | "multipoint" => ExpectedGeometry::Point,
            "line" | "linestring" | "multilinestring" | "polyline" => ExpectedGeometry::Line,
            "polygon" | "multipolygon" => ExpectedGeometry::Polygon,
            _ => ExpectedGeometry::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExpectedGeometry::Point => "Point",
            ExpectedGeometry::Line => "Line",
            ExpectedGeometry::Polygon => "Polygon",
            ExpectedGeometry::Unknown => "Unknown",
        }
    }
}

fn deserialize_expected_geometry<'de, D>(deserializer: D) -> Result<ExpectedGeometry, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(ExpectedGeometry::parse_lenient)
        .unwrap_or_default())
}

/// Descripteur d'une couche à contrôler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub layer_name: String,
    pub service_url: String,
    #[serde(default, deserialize_with = "deserialize_expected_geometry")]
    pub expected_geometry: ExpectedGeometry,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LayerConfig {
    pub fn new(layer_name: &str, service_url: &str, expected_geometry: ExpectedGeometry) -> Self {
        Self {
            layer_name: layer_name.to_string(),
            service_url: service_url.to_string(),
            expected_geometry,
            owner: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.layer_name.trim().is_empty() {
            return Err(AppError::Config("layer_name vide".into()));
        }
        if self.service_url.trim().is_empty() {
            return Err(AppError::Config(format!(
                "service_url vide pour la couche '{}'",
                self.layer_name
            )));
        }
        Ok(())
    }
}

// --- CATALOGUE DE COUCHES ---

/// Parse un catalogue JSON (tableau d'objets `LayerConfig`).
/// Les entrées invalides sont ignorées avec un avertissement ; les doublons de nom sont refusés.
pub fn parse_catalog(raw: &str) -> AppResult<Vec<LayerConfig>> {
    let entries: Vec<Value> = json::parse(raw)?;

    let mut configs = Vec::with_capacity(entries.len());
    let mut seen = HashSet::new();

    for (idx, entry) in entries.into_iter().enumerate() {
        let config = match json::from_value::<LayerConfig>(entry) {
            Ok(c) => c,
            Err(e) => {
                warn!("Entrée #{} du catalogue ignorée : {}", idx, e);
                continue;
            }
        };
        if let Err(e) = config.validate() {
            warn!("Entrée #{} du catalogue ignorée : {}", idx, e);
            continue;
        }
        if !seen.insert(config.layer_name.clone()) {
            return Err(AppError::Config(format!(
                "Nom de couche dupliqué dans le catalogue : '{}'",
                config.layer_name
            )));
        }
        configs.push(config);
    }

    if configs.is_empty() {
        return Err(AppError::Config(
            "Aucune couche valide dans le catalogue".into(),
        ));
    }
    Ok(configs)
}

pub fn load_catalog(path: &Path) -> AppResult<Vec<LayerConfig>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::NotFound(format!("Catalogue {} : {}", path.display(), e))
    })?;
    let configs = parse_catalog(&raw)?;
    debug!(layers = configs.len(), "Catalogue chargé depuis {}", path.display());
    Ok(configs)
}

/// Formats de sortie acceptés par l'endpoint `query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FormatSupport {
    #[serde(rename = "geojson")]
    GeoJson,
    #[serde(rename = "pjson")]
    Json,
    #[serde(rename = "both")]
    Both,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl FormatSupport {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatSupport::GeoJson => "geojson",
            FormatSupport::Json => "pjson",
            FormatSupport::Both => "both",
            FormatSupport::Unknown => "unknown",
        }
    }
}

/// Résultat agrégé d'une couche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerQaResult {
    pub layer_name: String,
    pub service_url: String,
    pub expected_geometry: ExpectedGeometry,

    pub overall_status: QaStatus,
    pub reachable: bool,

    pub count_estimate: Option<u64>,
    pub geometry_type_reported: Option<String>,
    pub max_record_count: Option<u64>,
    pub metadata_score: u8,

    pub pagination_ok: QaStatus,
    pub null_fields_over_80pct: usize,
    pub pct_invalid_geometry: f64,
    pub pct_empty_geometry: f64,
    pub last_edit_date: Option<String>,
    pub format_supported: FormatSupport,
    pub spatial_reference_wkid: Option<i64>,

    pub rule_results: Vec<RuleResult>,
    pub errors: Vec<String>,
    pub top_issues: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_metadata: Option<Map<String, Value>>,
}

/// Nombre maximal d'entrées du condensé `top_issues`.
pub const TOP_ISSUES_LIMIT: usize = 3;

impl LayerQaResult {
    /// Résultat vierge : FAIL tant que l'évaluation n'a pas abouti.
    pub fn new(config: &LayerConfig) -> Self {
        Self {
            layer_name: config.layer_name.clone(),
            service_url: config.service_url.clone(),
            expected_geometry: config.expected_geometry,
            overall_status: QaStatus::Fail,
            reachable: false,
            count_estimate: None,
            geometry_type_reported: None,
            max_record_count: None,
            metadata_score: 0,
            pagination_ok: QaStatus::Na,
            null_fields_over_80pct: 0,
            pct_invalid_geometry: 0.0,
            pct_empty_geometry: 0.0,
            last_edit_date: None,
            format_supported: FormatSupport::Unknown,
            spatial_reference_wkid: None,
            rule_results: Vec::new(),
            errors: Vec::new(),
            top_issues: String::new(),
            raw_metadata: None,
        }
    }

    /// FAIL si injoignable ou si une faute a été journalisée ; sinon le pire des verdicts (NA ignoré).
    pub fn aggregate_status(&self) -> QaStatus {
        if !self.reachable || !self.errors.is_empty() {
            return QaStatus::Fail;
        }
        QaStatus::aggregate(self.rule_results.iter().map(|r| r.status()))
    }

    pub fn compute_top_issues(&self) -> String {
        self.issues()
            .take(TOP_ISSUES_LIMIT)
            .map(RuleResult::issue_line)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Règles en FAIL ou WARN, dans l'ordre d'évaluation.
    pub fn issues(&self) -> impl Iterator<Item = &RuleResult> {
        self.rule_results.iter().filter(|r| r.status().is_issue())
    }

    pub fn count_with_status(&self, status: QaStatus) -> usize {
        self.rule_results
            .iter()
            .filter(|r| r.status() == status)
            .count()
    }

    pub fn rule(&self, name: RuleName) -> Option<&RuleResult> {
        self.rule_results.iter().find(|r| r.rule_name() == name)
    }
}
