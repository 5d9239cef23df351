// FICHIER : src-core/src/report/csv.rs

use crate::qa_engine::model::LayerQaResult;

pub const CSV_COLUMNS: [&str; 17] = [
    "layer_name",
    "service_url",
    "overall_status",
    "reachable",
    "count_estimate",
    "geometry_type_reported",
    "expected_geometry",
    "max_record_count",
    "pagination_ok",
    "metadata_score",
    "null_fields_over_80pct",
    "pct_invalid_geometry",
    "pct_empty_geometry",
    "last_edit_date",
    "format_supported",
    "spatial_reference_wkid",
    "top_issues",
];

/// Échappement RFC 4180 : guillemets si la cellule contient `,` `"` ou un saut de ligne.
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn row(r: &LayerQaResult) -> Vec<String> {
    vec![
        r.layer_name.clone(),
        r.service_url.clone(),
        r.overall_status.to_string(),
        r.reachable.to_string(),
        opt(&r.count_estimate),
        opt(&r.geometry_type_reported),
        r.expected_geometry.as_str().to_string(),
        opt(&r.max_record_count),
        r.pagination_ok.to_string(),
        r.metadata_score.to_string(),
        r.null_fields_over_80pct.to_string(),
        r.pct_invalid_geometry.to_string(),
        r.pct_empty_geometry.to_string(),
        opt(&r.last_edit_date),
        r.format_supported.as_str().to_string(),
        opt(&r.spatial_reference_wkid),
        r.top_issues.clone(),
    ]
}

/// En-tête + une ligne par couche, terminées par `\r\n`.
pub fn render_csv(results: &[LayerQaResult]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_COLUMNS.join(","));
    out.push_str("\r\n");
    for r in results {
        let cells: Vec<String> = row(r).iter().map(|c| escape(c)).collect();
        out.push_str(&cells.join(","));
        out.push_str("\r\n");
    }
    out
}
