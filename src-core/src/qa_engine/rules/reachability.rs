// FICHIER : src-core/src/qa_engine/rules/reachability.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::Evidence;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::utils::async_trait;
use crate::utils::prelude::*;

/// Règle-portail : une couche sans métadonnées n'est pas évaluée plus loin.
pub struct ReachabilityRule;

impl ReachabilityRule {
    pub fn evaluate(metadata: Option<&Map<String, Value>>) -> RuleResult {
        let exists = metadata.is_some();
        let (status, message) = if exists {
            (QaStatus::Pass, "Service is reachable and returns metadata")
        } else {
            (QaStatus::Fail, "Cannot fetch metadata from service")
        };
        RuleResult::new(
            RuleName::Reachability,
            status,
            message,
            Evidence::Reachability {
                metadata_exists: exists,
            },
        )
    }
}

#[async_trait]
impl QaRule for ReachabilityRule {
    fn name(&self) -> RuleName {
        RuleName::Reachability
    }

    fn describe(&self) -> &'static str {
        "PASS if layer metadata can be fetched, FAIL otherwise"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Ok(Self::evaluate(ctx.metadata))
    }
}
