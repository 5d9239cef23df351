// FICHIER : src-core/src/qa_engine/rules/spatial_ref.rs

use super::{QaRule, RuleContext};
use crate::qa_engine::evidence::Evidence;
use crate::qa_engine::metadata::LayerMetadata;
use crate::qa_engine::model::{RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::utils::async_trait;
use crate::utils::prelude::*;

/// WGS84, Web Mercator, State Plane NY (ft), UTM 18N/19N.
pub const COMMON_WKIDS: [i64; 6] = [4326, 3857, 2263, 2264, 26918, 26919];

pub struct SpatialReferenceRule;

impl SpatialReferenceRule {
    pub fn evaluate(metadata: Option<&Map<String, Value>>) -> RuleResult {
        let Some(raw) = metadata else {
            return RuleResult::new(
                RuleName::SpatialReference,
                QaStatus::Na,
                "No metadata available",
                Evidence::SpatialReference {
                    wkid: None,
                    wkt: None,
                },
            );
        };

        let meta = LayerMetadata::new(raw);
        let wkid = meta.wkid();
        let wkt = meta.wkt();

        let (status, message) = match (wkid, &wkt) {
            (None, None) => (
                QaStatus::Warn,
                "No spatial reference information found".to_string(),
            ),
            (Some(w), _) if !COMMON_WKIDS.contains(&w) => (
                QaStatus::Warn,
                format!("Unusual spatial reference (WKID: {})", w),
            ),
            (Some(w), _) => (
                QaStatus::Pass,
                format!("Spatial reference present (WKID: {})", w),
            ),
            // Un WKT seul est accepté tel quel
            (None, Some(_)) => (
                QaStatus::Pass,
                "Spatial reference present (WKID: None)".to_string(),
            ),
        };

        RuleResult::new(
            RuleName::SpatialReference,
            status,
            message,
            Evidence::SpatialReference { wkid, wkt },
        )
    }
}

#[async_trait]
impl QaRule for SpatialReferenceRule {
    fn name(&self) -> RuleName {
        RuleName::SpatialReference
    }

    fn describe(&self) -> &'static str {
        "WARN if the extent has no spatial reference or an unusual WKID"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Ok(Self::evaluate(ctx.metadata))
    }
}
