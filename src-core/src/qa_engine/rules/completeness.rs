// FICHIER : src-core/src/qa_engine/rules/completeness.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::{CompletenessBreakdown, Evidence};
use crate::qa_engine::metadata::LayerMetadata;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::utils::async_trait;
use crate::utils::prelude::*;

pub const PASS_THRESHOLD: u8 = 70;
pub const WARN_THRESHOLD: u8 = 40;
const MIN_FIELDS: usize = 3;

/// Score additif (0-100) de la documentation de la couche.
pub struct MetadataCompletenessRule;

impl MetadataCompletenessRule {
    /// Calcule le score et son détail. `Err` si `fields` n'est pas un tableau.
    pub fn score(meta: &LayerMetadata<'_>) -> AppResult<(u8, CompletenessBreakdown)> {
        let fields = meta.fields()?.map(Vec::len).unwrap_or(0);

        let components = CompletenessBreakdown {
            description: meta.has("description"),
            geometry_type: meta.has("geometryType"),
            extent: meta.has("extent"),
            fields,
            capabilities: meta.has("capabilities"),
            max_record_count: meta.has("maxRecordCount"),
            pagination: meta.supports_pagination(),
        };

        let weighted: [(bool, u8); 7] = [
            (components.description, 10),
            (components.geometry_type, 20),
            (components.extent, 20),
            (components.fields >= MIN_FIELDS, 20),
            (components.capabilities, 10),
            (components.max_record_count, 10),
            (components.pagination, 10),
        ];
        let score = weighted
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, pts)| *pts)
            .sum();

        Ok((score, components))
    }

    pub fn evaluate(metadata: Option<&Map<String, Value>>) -> AppResult<RuleResult> {
        let Some(raw) = metadata else {
            return Ok(RuleResult::new(
                RuleName::MetadataCompleteness,
                QaStatus::Fail,
                "No metadata available",
                Evidence::MetadataCompleteness {
                    score: 0,
                    components: CompletenessBreakdown::default(),
                },
            ));
        };

        let (score, components) = Self::score(&LayerMetadata::new(raw))?;

        let (status, message) = if score >= PASS_THRESHOLD {
            (QaStatus::Pass, format!("Metadata is complete (score: {}/100)", score))
        } else if score >= WARN_THRESHOLD {
            (
                QaStatus::Warn,
                format!("Metadata is partially complete (score: {}/100)", score),
            )
        } else {
            (QaStatus::Fail, format!("Metadata is incomplete (score: {}/100)", score))
        };

        Ok(RuleResult::new(
            RuleName::MetadataCompleteness,
            status,
            message,
            Evidence::MetadataCompleteness { score, components },
        ))
    }
}

#[async_trait]
impl QaRule for MetadataCompletenessRule {
    fn name(&self) -> RuleName {
        RuleName::MetadataCompleteness
    }

    fn describe(&self) -> &'static str {
        "Scores 7 metadata components out of 100: PASS >= 70, WARN >= 40, FAIL below"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Self::evaluate(ctx.metadata)
    }
}
