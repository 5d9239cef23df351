// FICHIER : src-core/src/report/issues.rs

use super::safe_file_stem;
use crate::qa_engine::batch::RunSummary;
use crate::qa_engine::model::LayerQaResult;
use crate::utils::prelude::*;
use crate::utils::json;

const METADATA_EXCERPT_KEYS: [&str; 4] = ["name", "geometryType", "maxRecordCount", "capabilities"];

/// Document JSON détaillé d'une couche (synthèse, verdicts, erreurs, extrait des métadonnées).
pub fn issue_document(result: &LayerQaResult, generated_at: DateTime<Utc>) -> AppResult<Value> {
    let rule_results = result
        .rule_results
        .iter()
        .map(|r| -> AppResult<Value> {
            Ok(json!({
                "rule_name": r.rule_name(),
                "status": r.status(),
                "message": r.message(),
                "evidence": json::to_value(r.evidence())?,
            }))
        })
        .collect::<AppResult<Vec<Value>>>()?;

    let mut excerpt = Map::new();
    for key in METADATA_EXCERPT_KEYS {
        let value = result
            .raw_metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .cloned()
            .unwrap_or(Value::Null);
        excerpt.insert(key.to_string(), value);
    }

    Ok(json!({
        "layer_name": result.layer_name,
        "service_url": result.service_url,
        "overall_status": result.overall_status,
        "timestamp": generated_at.to_rfc3339(),
        "summary": {
            "reachable": result.reachable,
            "count_estimate": result.count_estimate,
            "geometry_type_reported": result.geometry_type_reported,
            "metadata_score": result.metadata_score,
        },
        "rule_results": rule_results,
        "errors": result.errors,
        "metadata_excerpt": excerpt,
    }))
}

/// Documents de toutes les couches, indexés par nom de fichier sûr.
/// Deux couches qui donnent le même nom sont départagées par un suffixe `_2`, `_3`...
pub fn issue_documents(
    results: &[LayerQaResult],
    generated_at: DateTime<Utc>,
) -> AppResult<Map<String, Value>> {
    let mut docs = Map::new();
    for result in results {
        let stem = safe_file_stem(&result.layer_name);
        let mut key = stem.clone();
        let mut n = 1;
        while docs.contains_key(&key) {
            n += 1;
            key = format!("{}_{}", stem, n);
        }
        docs.insert(key, issue_document(result, generated_at)?);
    }
    Ok(docs)
}

/// Sortie JSON complète : bilan du run + un document par couche.
pub fn render_json(results: &[LayerQaResult], summary: &RunSummary) -> AppResult<String> {
    let doc = json!({
        "run": json::to_value(summary)?,
        "layers": issue_documents(results, summary.timestamp)?,
    });
    json::stringify_pretty(&doc)
}
