// FICHIER : src-core/src/qa_engine/rules/queryability.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::Evidence;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::utils::async_trait;
use crate::utils::prelude::*;

pub struct QueryabilityRule;

impl QueryabilityRule {
    pub fn evaluate(count: Option<u64>, metadata: Option<&Map<String, Value>>) -> RuleResult {
        let (status, message) = match (count, metadata) {
            (Some(n), _) => (QaStatus::Pass, format!("Layer is queryable ({} features)", n)),
            (None, Some(_)) => (
                QaStatus::Warn,
                "Metadata exists but query endpoint failed".to_string(),
            ),
            (None, None) => (QaStatus::Fail, "Layer is not queryable".to_string()),
        };
        RuleResult::new(
            RuleName::Queryability,
            status,
            message,
            Evidence::Queryability {
                count,
                queryable: count.is_some(),
            },
        )
    }
}

#[async_trait]
impl QaRule for QueryabilityRule {
    fn name(&self) -> RuleName {
        RuleName::Queryability
    }

    fn describe(&self) -> &'static str {
        "PASS if the count query answers, WARN if only metadata is available, FAIL otherwise"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Ok(Self::evaluate(ctx.count, ctx.metadata))
    }
}
