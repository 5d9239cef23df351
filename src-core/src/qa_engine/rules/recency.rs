// FICHIER : src-core/src/qa_engine/rules/recency.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::{Evidence, RecencyEvidence};
use crate::qa_engine::metadata::LayerMetadata;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::utils::async_trait;
use crate::utils::prelude::*;

/// Durée moyenne d'un mois en jours.
pub const DAYS_PER_MONTH: f64 = 30.44;

pub struct UpdateRecencyRule;

impl UpdateRecencyRule {
    /// `now` est injecté : deux évaluations avec la même horloge donnent le même verdict.
    pub fn evaluate(
        metadata: Option<&Map<String, Value>>,
        threshold_months: u32,
        now: DateTime<Utc>,
    ) -> AppResult<RuleResult> {
        let Some(raw) = metadata else {
            return Ok(Self::result(
                QaStatus::Na,
                "No metadata available".into(),
                RecencyEvidence::default(),
            ));
        };
        let meta = LayerMetadata::new(raw);
        let edit_field = meta.edit_date_field();

        let Some(last_edit_ms) = meta.last_edit_date_ms() else {
            return Ok(match edit_field {
                None => Self::result(
                    QaStatus::Na,
                    "No last edit date available in metadata".into(),
                    RecencyEvidence::default(),
                ),
                // Le champ seul ne suffit pas : il faudrait interroger les entités
                Some(field) => Self::result(
                    QaStatus::Na,
                    format!(
                        "Last edit date field '{}' found but no timestamp in metadata",
                        field
                    ),
                    RecencyEvidence {
                        edit_field: Some(field.to_string()),
                        ..Default::default()
                    },
                ),
            });
        };

        let last_edit = DateTime::<Utc>::from_timestamp_millis(last_edit_ms).ok_or_else(|| {
            AppError::Metadata(format!("lastEditDate hors plage : {}", last_edit_ms))
        })?;
        let age_days = (now - last_edit).num_days();
        let age_months = age_days as f64 / DAYS_PER_MONTH;

        let (status, message) = if age_months > f64::from(threshold_months) {
            (
                QaStatus::Warn,
                format!(
                    "Layer not updated in {:.0} months (threshold: {})",
                    age_months, threshold_months
                ),
            )
        } else {
            (
                QaStatus::Pass,
                format!("Layer recently updated ({:.0} months ago)", age_months),
            )
        };

        Ok(Self::result(
            status,
            message,
            RecencyEvidence {
                edit_field: edit_field.map(str::to_string),
                last_edit_date: Some(last_edit.to_rfc3339()),
                months_old: Some((age_months * 10.0).round() / 10.0),
                threshold_months: Some(threshold_months),
            },
        ))
    }

    fn result(status: QaStatus, message: String, evidence: RecencyEvidence) -> RuleResult {
        RuleResult::new(RuleName::UpdateRecency, status, message, Evidence::Recency(evidence))
    }
}

#[async_trait]
impl QaRule for UpdateRecencyRule {
    fn name(&self) -> RuleName {
        RuleName::UpdateRecency
    }

    fn describe(&self) -> &'static str {
        "WARN if the last edit is older than the staleness threshold (24 months by default)"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Self::evaluate(
            ctx.metadata,
            ctx.settings.staleness_threshold_months,
            ctx.now,
        )
    }
}
