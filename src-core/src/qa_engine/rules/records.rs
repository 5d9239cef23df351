// FICHIER : src-core/src/qa_engine/rules/records.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::Evidence;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::utils::async_trait;
use crate::utils::prelude::*;

/// Une couche vide n'est pas une erreur de service : au pire un avertissement.
pub struct RecordAvailabilityRule;

impl RecordAvailabilityRule {
    pub fn evaluate(count: Option<u64>) -> RuleResult {
        let (status, message) = match count {
            None => (QaStatus::Warn, "Cannot determine record count".to_string()),
            Some(0) => (QaStatus::Warn, "Layer contains no features".to_string()),
            Some(n) => (QaStatus::Pass, format!("Layer contains {} features", n)),
        };
        RuleResult::new(
            RuleName::RecordAvailability,
            status,
            message,
            Evidence::RecordAvailability { count },
        )
    }
}

#[async_trait]
impl QaRule for RecordAvailabilityRule {
    fn name(&self) -> RuleName {
        RuleName::RecordAvailability
    }

    fn describe(&self) -> &'static str {
        "WARN if the feature count is unknown or zero, PASS otherwise"
    }

    fn fault_status(&self) -> QaStatus {
        QaStatus::Warn
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Ok(Self::evaluate(ctx.count))
    }
}
