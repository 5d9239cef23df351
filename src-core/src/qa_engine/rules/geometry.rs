// FICHIER : src-core/src/qa_engine/rules/geometry.rs

use super::{percent, round2, QaRule, RuleContext};
use crate::qa_engine::evidence::{Evidence, GeometryEvidence};
use crate::qa_engine::geometry::{is_empty_geometry, parse_geometry};
use crate::qa_engine::model::{ExpectedGeometry, RuleName, RuleResult};
use crate::qa_engine::status::QaStatus;
use crate::source::Feature;
use crate::utils::async_trait;
use crate::utils::prelude::*;

pub const FAIL_PCT: f64 = 25.0;
pub const WARN_PCT: f64 = 5.0;
pub const MISMATCH_WARN_PCT: f64 = 10.0;

/// Vacuité, validité et type des géométries échantillonnées.
pub struct GeometrySanityRule;

impl GeometrySanityRule {
    pub fn evaluate(features: Option<&[Feature]>, expected: ExpectedGeometry) -> RuleResult {
        let features = match features {
            Some(f) if !f.is_empty() => f,
            _ => {
                return RuleResult::new(
                    RuleName::GeometrySanity,
                    QaStatus::Na,
                    "No features available for geometry check",
                    Evidence::Geometry(GeometryEvidence::default()),
                )
            }
        };

        let total = features.len();
        let (mut empty, mut invalid, mut mismatch) = (0usize, 0usize, 0usize);

        for feature in features {
            let geometry = feature.geometry.as_ref();
            if is_empty_geometry(geometry) {
                empty += 1;
                continue;
            }
            let Some(raw) = geometry else { continue };

            // Une géométrie illisible est invalide ; le type n'est alors pas comparé
            match parse_geometry(raw) {
                Ok(shape) => {
                    if let Err(e) = shape.validate() {
                        debug!("Géométrie invalide : {}", e);
                        invalid += 1;
                    }
                    if !expected.matches(shape.family()) {
                        mismatch += 1;
                    }
                }
                Err(e) => {
                    debug!("Géométrie illisible : {}", e);
                    invalid += 1;
                }
            }
        }

        let pct_empty = percent(empty, total);
        let pct_invalid = percent(invalid, total);
        let pct_mismatch = percent(mismatch, total);

        let (status, message) = if pct_empty > FAIL_PCT || pct_invalid > FAIL_PCT {
            (
                QaStatus::Fail,
                format!(
                    "Geometry issues: {:.1}% empty, {:.1}% invalid",
                    pct_empty, pct_invalid
                ),
            )
        } else if pct_empty > WARN_PCT || pct_invalid > WARN_PCT {
            (
                QaStatus::Warn,
                format!(
                    "Some geometry issues: {:.1}% empty, {:.1}% invalid",
                    pct_empty, pct_invalid
                ),
            )
        } else if pct_mismatch > MISMATCH_WARN_PCT {
            (
                QaStatus::Warn,
                format!("Geometry type mismatch: {:.1}%", pct_mismatch),
            )
        } else {
            (QaStatus::Pass, "Geometry appears healthy".to_string())
        };

        RuleResult::new(
            RuleName::GeometrySanity,
            status,
            message,
            Evidence::Geometry(GeometryEvidence {
                total_features: total,
                empty_count: empty,
                invalid_count: invalid,
                type_mismatch_count: mismatch,
                pct_empty: round2(pct_empty),
                pct_invalid: round2(pct_invalid),
                pct_mismatch: round2(pct_mismatch),
            }),
        )
    }
}

#[async_trait]
impl QaRule for GeometrySanityRule {
    fn name(&self) -> RuleName {
        RuleName::GeometrySanity
    }

    fn describe(&self) -> &'static str {
        "FAIL if > 25% empty or invalid, WARN if > 5% or > 10% type mismatch; NA without sample"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult> {
        Ok(Self::evaluate(ctx.features, ctx.config.expected_geometry))
    }
}
