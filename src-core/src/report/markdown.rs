// FICHIER : src-core/src/report/markdown.rs

use super::ellipsize;
use crate::qa_engine::batch::RunSummary;
use crate::qa_engine::model::LayerQaResult;
use crate::qa_engine::status::QaStatus;
use std::fmt::Write;

pub const MOST_COMMON_LIMIT: usize = 10;
const ISSUES_MAX_CHARS: usize = 100;
const URL_MAX_CHARS: usize = 50;

/// Problèmes (règles FAIL/WARN) classés par fréquence ; à égalité, ordre de première apparition.
pub fn most_common_issues(results: &[LayerQaResult], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for line in results.iter().flat_map(|r| r.issues().map(|i| i.issue_line())) {
        match counts.iter_mut().find(|(l, _)| *l == line) {
            Some((_, n)) => *n += 1,
            None => counts.push((line, 1)),
        }
    }
    // Tri stable : l'ordre d'apparition départage les ex-aequo
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn status_icon(status: QaStatus) -> &'static str {
    match status {
        QaStatus::Pass => "✅",
        QaStatus::Warn => "⚠️",
        QaStatus::Fail => "❌",
        QaStatus::Na => "❓",
    }
}

fn issues_table(out: &mut String, title: &str, layers: &[&LayerQaResult]) {
    if layers.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {}\n", title);
    out.push_str("| Layer Name | Service URL | Top Issues |\n");
    out.push_str("|------------|-------------|------------|\n");
    for r in layers {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            cell(&r.layer_name),
            cell(&ellipsize(&r.service_url, URL_MAX_CHARS)),
            cell(&ellipsize(&r.top_issues, ISSUES_MAX_CHARS))
        );
    }
    out.push('\n');
}

/// Rapport lisible : métadonnées du run, synthèse, problèmes fréquents, tableaux par statut.
pub fn render_markdown(results: &[LayerQaResult], summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("# Geospatial QA Report\n\n");

    out.push_str("## Run Metadata\n\n");
    let _ = writeln!(out, "- **Run ID:** {}", summary.run_id);
    let _ = writeln!(
        out,
        "- **Timestamp:** {}",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "- **Config File:** {}", summary.config_source);
    let _ = writeln!(out, "- **Total Layers:** {}\n", summary.total_layers);

    out.push_str("## Summary\n\n");
    let _ = writeln!(out, "- **PASS:** {}", summary.pass_count);
    let _ = writeln!(out, "- **WARN:** {}", summary.warn_count);
    let _ = writeln!(out, "- **FAIL:** {}\n", summary.fail_count);

    let common = most_common_issues(results, MOST_COMMON_LIMIT);
    if !common.is_empty() {
        out.push_str("## Most Common Issues\n\n");
        for (issue, n) in &common {
            let _ = writeln!(out, "- **{}x** {}", n, issue);
        }
        out.push('\n');
    }

    let by_status = |s: QaStatus| -> Vec<&LayerQaResult> {
        results.iter().filter(|r| r.overall_status == s).collect()
    };
    let failed = by_status(QaStatus::Fail);
    let warned = by_status(QaStatus::Warn);
    let passed = by_status(QaStatus::Pass);

    issues_table(&mut out, "Failed Layers", &failed);
    issues_table(&mut out, "Warning Layers", &warned);

    if !passed.is_empty() {
        out.push_str("## Passed Layers\n\n");
        for r in &passed {
            let count = r
                .count_estimate
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".into());
            let _ = writeln!(out, "- **{}** ({} features)", r.layer_name, count);
        }
        out.push('\n');
    }

    out.push_str("## Detailed Results\n\n");
    out.push_str("| Layer | Status | Reachable | Count | Geometry | Metadata Score | Issues |\n");
    out.push_str("|-------|--------|-----------|-------|----------|----------------|--------|\n");
    for r in failed.iter().chain(&warned).chain(&passed) {
        let _ = writeln!(
            out,
            "| {} | {} {} | {} | {} | {} | {}/100 | {} |",
            cell(&r.layer_name),
            status_icon(r.overall_status),
            r.overall_status,
            if r.reachable { "✅" } else { "❌" },
            r.count_estimate
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".into()),
            r.geometry_type_reported.as_deref().unwrap_or("N/A"),
            r.metadata_score,
            r.issues().count()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa_engine::evidence::Evidence;
    use crate::qa_engine::model::{ExpectedGeometry, LayerConfig, RuleName, RuleResult};

    fn layer(name: &str, status: QaStatus, issues: &[(RuleName, &str)]) -> LayerQaResult {
        let cfg = LayerConfig::new(name, &format!("https://example.test/{}", name), ExpectedGeometry::Unknown);
        let mut r = LayerQaResult::new(&cfg);
        r.reachable = status != QaStatus::Fail;
        r.overall_status = status;
        r.count_estimate = Some(10);
        for (rule, msg) in issues {
            r.rule_results
                .push(RuleResult::new(*rule, QaStatus::Warn, *msg, Evidence::empty()));
        }
        r.top_issues = r.compute_top_issues();
        r
    }

    fn sample() -> Vec<LayerQaResult> {
        vec![
            layer("passing", QaStatus::Pass, &[]),
            layer("stale", QaStatus::Warn, &[(RuleName::UpdateRecency, "old")]),
            layer("broken", QaStatus::Fail, &[(RuleName::SchemaSanity, "nulls"), (RuleName::UpdateRecency, "old")]),
        ]
    }

    #[test]
    fn test_most_common_issues_order() {
        let common = most_common_issues(&sample(), 10);
        assert_eq!(common[0], ("update_recency: old".to_string(), 2));
        assert_eq!(common[1], ("schema_sanity: nulls".to_string(), 1));
    }

    #[test]
    fn test_sections_and_detail_order() {
        let results = sample();
        let summary = RunSummary::from_results(&results, "layers.json");
        let md = render_markdown(&results, &summary);

        assert!(md.starts_with("# Geospatial QA Report"));
        assert!(md.contains("- **Config File:** layers.json"));
        assert!(md.contains("- **2x** update_recency: old"));
        assert!(md.contains("## Failed Layers"));
        assert!(md.contains("- **passing** (10 features)"));

        let detail = md.split("## Detailed Results").nth(1).unwrap();
        let broken = detail.find("| broken |").unwrap();
        let stale = detail.find("| stale |").unwrap();
        let passing = detail.find("| passing |").unwrap();
        assert!(broken < stale && stale < passing);
        assert!(detail.contains("❌ FAIL"));
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let mut r = layer("long", QaStatus::Warn, &[]);
        r.top_issues = "x".repeat(150);
        let summary = RunSummary::from_results(std::slice::from_ref(&r), "mem");
        let md = render_markdown(&[r], &summary);
        assert!(md.contains(&format!("{}...", "x".repeat(100))));
        assert!(!md.contains(&"x".repeat(101)));
    }
}
