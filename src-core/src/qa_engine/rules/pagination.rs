// FICHIER : src-core/src/qa_engine/rules/pagination.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::{Evidence, PaginationEvidence};
use crate::qa_engine::metadata::LayerMetadata;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::source::LayerSource;
use crate::utils::async_trait;
use crate::utils::prelude::*;

/// Taille de la page sondée après `maxRecordCount`.
pub const PROBE_PAGE_SIZE: usize = 10;

/// Ne teste la pagination que lorsque la couche dépasse une page serveur.
pub struct PaginationSupportRule;

impl PaginationSupportRule {
    pub async fn evaluate(
        metadata: Option<&Map<String, Value>>,
        count: Option<u64>,
        source: &dyn LayerSource,
        service_url: &str,
    ) -> RuleResult {
        let (Some(raw), Some(count)) = (metadata, count) else {
            return Self::result(
                QaStatus::Na,
                "Cannot test pagination without metadata/count".to_string(),
                PaginationEvidence::default(),
            );
        };

        let max = LayerMetadata::new(raw).max_record_count_or_default();
        if count <= max {
            return Self::result(
                QaStatus::Na,
                format!("Pagination not needed (count: {}, max: {})", count, max),
                PaginationEvidence {
                    tested: false,
                    count: Some(count),
                    max_record_count: Some(max),
                    ..Default::default()
                },
            );
        }

        debug!(offset = max, "Sondage de la deuxième page");
        let mut evidence = PaginationEvidence {
            tested: true,
            count: Some(count),
            max_record_count: Some(max),
            ..Default::default()
        };

        match source
            .fetch_page_at_offset(service_url, max, PROBE_PAGE_SIZE)
            .await
        {
            Ok(page) if !page.is_empty() => {
                evidence.second_page_features = Some(page.len());
                Self::result(QaStatus::Pass, "Pagination works correctly".into(), evidence)
            }
            Ok(_) => {
                evidence.second_page_features = Some(0);
                Self::result(
                    QaStatus::Warn,
                    "Pagination may not work (no features on second page)".into(),
                    evidence,
                )
            }
            Err(e) => {
                evidence.error = Some(e.to_string());
                Self::result(QaStatus::Fail, format!("Pagination failed: {}", e), evidence)
            }
        }
    }

    fn result(status: QaStatus, message: String, evidence: PaginationEvidence) -> RuleResult {
        RuleResult::new(
            RuleName::PaginationSupport,
            status,
            message,
            Evidence::Pagination(evidence),
        )
    }
}

#[async_trait]
impl QaRule for PaginationSupportRule {
    fn name(&self) -> RuleName {
        RuleName::PaginationSupport
    }

    fn describe(&self) -> &'static str {
        "NA unless count > maxRecordCount; then PASS/WARN/FAIL on fetching the second page"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Ok(Self::evaluate(ctx.metadata, ctx.count, ctx.source, &ctx.config.service_url).await)
    }
}
