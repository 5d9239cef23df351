// FICHIER : src-core/src/qa_engine/rules/mod.rs

pub mod completeness;
pub mod geometry;
pub mod pagination;
pub mod queryability;
pub mod reachability;
pub mod recency;
pub mod records;
pub mod schema;
pub mod spatial_ref;

// Re-exports
pub use completeness::MetadataCompletenessRule;
pub use geometry::GeometrySanityRule;
pub use pagination::PaginationSupportRule;
pub use queryability::QueryabilityRule;
pub use reachability::ReachabilityRule;
pub use recency::UpdateRecencyRule;
pub use records::RecordAvailabilityRule;
pub use schema::SchemaSanityRule;
pub use spatial_ref::SpatialReferenceRule;

use super::evidence::Evidence;
use super::model::{LayerConfig, RuleName, RuleResult};
use super::status::QaStatus;
use crate::source::{Feature, LayerSource};
use crate::utils::async_trait;
use crate::utils::config::QaSettings;
use crate::utils::prelude::*;

/// Entrées partagées par les neuf règles pour une couche.
/// Chaque règle n'en lit que la partie qu'elle déclare.
pub struct RuleContext<'a> {
    pub config: &'a LayerConfig,
    pub metadata: Option<&'a Map<String, Value>>,
    pub count: Option<u64>,
    pub features: Option<&'a [Feature]>,
    /// Seule la règle de pagination s'en sert (lecture d'une page à un offset)
    pub source: &'a dyn LayerSource,
    pub settings: &'a QaSettings,
    pub now: DateTime<Utc>,
}

/// Interface que toute règle QA doit implémenter.
#[async_trait]
pub trait QaRule: Send + Sync {
    fn name(&self) -> RuleName;

    /// Politique en une ligne (affichée par `geoqa-cli rules`).
    fn describe(&self) -> &'static str;

    /// Statut attribué quand la règle lève une faute interne.
    fn fault_status(&self) -> QaStatus {
        QaStatus::Fail
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> AppResult<RuleResult>;
}

/// Catalogue figé des règles, exécutées dans l'ordre.
pub struct RuleEngine {
    rules: Vec<Box<dyn QaRule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleEngine {
    pub fn standard() -> Self {
        let rules: Vec<Box<dyn QaRule>> = vec![
            Box::new(ReachabilityRule),
            Box::new(QueryabilityRule),
            Box::new(MetadataCompletenessRule),
            Box::new(RecordAvailabilityRule),
            Box::new(PaginationSupportRule),
            Box::new(SchemaSanityRule),
            Box::new(GeometrySanityRule),
            Box::new(UpdateRecencyRule),
            Box::new(SpatialReferenceRule),
        ];
        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn QaRule>] {
        &self.rules
    }

    /// Exécute toutes les règles. Une faute dans une règle devient un résultat,
    /// les suivantes sont quand même évaluées.
    pub async fn run_all(&self, ctx: &RuleContext<'_>) -> Vec<RuleResult> {
        let mut results = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            results.push(run_guarded(rule.as_ref(), ctx).await);
        }
        results
    }
}

/// Exécute une règle ; `Err` => résultat de faute (statut propre à la règle).
pub async fn run_guarded(rule: &dyn QaRule, ctx: &RuleContext<'_>) -> RuleResult {
    match rule.check(ctx).await {
        Ok(result) => {
            debug!(rule = %rule.name(), status = %result.status(), "Règle évaluée");
            result
        }
        Err(e) => {
            error!(rule = %rule.name(), layer = %ctx.config.layer_name, "Faute interne : {}", e);
            fault_result(rule.name(), rule.fault_status(), &e)
        }
    }
}

pub fn fault_result(rule: RuleName, status: QaStatus, err: &AppError) -> RuleResult {
    RuleResult::new(rule, status, format!("Exception: {}", err), Evidence::fault(err))
}

/// `x / total * 100`, 0 si `total == 0`.
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
