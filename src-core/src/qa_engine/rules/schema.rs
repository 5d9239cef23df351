// FICHIER : src-core/src/qa_engine/rules/schema.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::{Evidence, SchemaEvidence};
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::source::Feature;
use crate::utils::async_trait;
use crate::utils::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Taux de nulls au-delà duquel un champ est considéré "vide".
pub const NULL_RATE_THRESHOLD: f64 = 0.8;
/// Nombre de champs "vides" déclenchant l'avertissement.
pub const HIGH_NULL_FIELDS_WARN: usize = 5;

static ID_FIELD_PATTERN: OnceLock<Regex> = OnceLock::new();

fn id_field_pattern() -> AppResult<&'static Regex> {
    if let Some(re) = ID_FIELD_PATTERN.get() {
        return Ok(re);
    }
    let re = Regex::new(r"(?i)OBJECTID|FID|OID")
        .map_err(|e| AppError::Config(format!("Motif d'identifiant invalide : {}", e)))?;
    Ok(ID_FIELD_PATTERN.get_or_init(|| re))
}

/// Contrôle de la table attributaire échantillonnée.
pub struct SchemaSanityRule;

/// Colonnes de l'échantillon : union des clés, dans l'ordre de première apparition.
fn collect_columns(features: &[Feature]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for feature in features {
        for key in feature.attributes.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }
    columns
}

/// Noms qui entrent en collision (casse ignorée) avec une colonne vue plus tôt.
fn duplicate_columns(columns: &[&str]) -> Vec<String> {
    let mut folded = HashSet::new();
    columns
        .iter()
        .filter(|col| !folded.insert(col.to_lowercase()))
        .map(|col| col.to_string())
        .collect()
}

fn null_rate(features: &[Feature], column: &str) -> f64 {
    let nulls = features
        .iter()
        .filter(|f| matches!(f.attributes.get(column), None | Some(Value::Null)))
        .count();
    nulls as f64 / features.len() as f64
}

impl SchemaSanityRule {
    pub fn evaluate(features: Option<&[Feature]>) -> AppResult<RuleResult> {
        let features = match features {
            Some(f) if !f.is_empty() => f,
            _ => {
                return Ok(Self::result(
                    QaStatus::Na,
                    "No features available for schema check".into(),
                    SchemaEvidence::default(),
                ))
            }
        };

        let columns = collect_columns(features);
        if columns.is_empty() {
            return Ok(Self::result(
                QaStatus::Warn,
                "Empty attribute table".into(),
                SchemaEvidence {
                    sample_size: features.len(),
                    ..Default::default()
                },
            ));
        }

        let duplicate_fields = duplicate_columns(&columns);

        let pattern = id_field_pattern()?;
        let objectid_fields: Vec<String> = columns
            .iter()
            .filter(|c| pattern.is_match(c))
            .map(|c| c.to_string())
            .collect();

        let high_null_fields: Vec<String> = columns
            .iter()
            .filter(|c| null_rate(features, c) > NULL_RATE_THRESHOLD)
            .map(|c| c.to_string())
            .collect();

        let too_many_nulls = high_null_fields.len() >= HIGH_NULL_FIELDS_WARN;
        let has_objectid = !objectid_fields.is_empty();

        let mut issues = Vec::new();
        if !duplicate_fields.is_empty() {
            let quoted: Vec<String> = duplicate_fields.iter().map(|d| format!("'{}'", d)).collect();
            issues.push(format!("Duplicate fields: [{}]", quoted.join(", ")));
        }
        if !has_objectid {
            issues.push("No OBJECTID-like field found".to_string());
        }
        if too_many_nulls {
            issues.push(format!("{} fields have >80% nulls", high_null_fields.len()));
        }

        // L'absence d'identifiant n'est mentionnée que si un vrai déclencheur a joué
        let (status, message) = if !duplicate_fields.is_empty() || too_many_nulls {
            (QaStatus::Warn, issues.join("; "))
        } else {
            (QaStatus::Pass, "Schema appears healthy".to_string())
        };

        let evidence = SchemaEvidence {
            total_fields: columns.len(),
            sample_size: features.len(),
            duplicate_fields,
            has_objectid,
            objectid_fields,
            high_null_count: high_null_fields.len(),
            high_null_fields,
        };
        Ok(Self::result(status, message, evidence))
    }

    fn result(status: QaStatus, message: String, evidence: SchemaEvidence) -> RuleResult {
        RuleResult::new(RuleName::SchemaSanity, status, message, Evidence::Schema(evidence))
    }
}

#[async_trait]
impl QaRule for SchemaSanityRule {
    fn name(&self) -> RuleName {
        RuleName::SchemaSanity
    }

    fn describe(&self) -> &'static str {
        "WARN on case-insensitive duplicate fields or >= 5 fields over 80% null; NA without sample"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Self::evaluate(ctx.features)
    }
}
