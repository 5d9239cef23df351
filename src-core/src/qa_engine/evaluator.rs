// FICHIER : src-core/src/qa_engine/evaluator.rs

use super::metadata::LayerMetadata;
use super::model::{LayerConfig, LayerQaResult, RuleName};
use super::rules::{ReachabilityRule, RuleContext, RuleEngine};
use super::status::QaStatus;
use crate::source::{Feature, LayerSource, SampleRequest, SourceError, WHERE_ALL};
use crate::utils::config::QaSettings;
use crate::utils::prelude::*;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

pub const UNREACHABLE_ERROR: &str = "Failed to fetch metadata";

const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Évaluateur d'une couche : métadonnées -> comptage -> échantillon -> 9 règles -> agrégat.
///
/// Une erreur de collaborateur (après relances) vaut "donnée absente" et laisse
/// les règles trancher. Seule une faute d'orchestration (panique) est consignée
/// dans `LayerQaResult::errors` et force le statut global à FAIL.
/// L'évaluation ne renvoie jamais d'erreur.
pub struct LayerEvaluator {
    source: Arc<dyn LayerSource>,
    settings: QaSettings,
    engine: RuleEngine,
    /// Horloge figée (tests, rejouabilité) ; `None` = horloge système
    fixed_now: Option<DateTime<Utc>>,
}

impl LayerEvaluator {
    pub fn new(source: Arc<dyn LayerSource>, settings: QaSettings) -> Self {
        Self {
            source,
            settings,
            engine: RuleEngine::standard(),
            fixed_now: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn settings(&self) -> &QaSettings {
        &self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    #[instrument(skip(self, config), fields(layer = %config.layer_name))]
    pub async fn evaluate(&self, config: &LayerConfig) -> LayerQaResult {
        info!(url = %config.service_url, "Début de l'évaluation QA");
        let mut result = LayerQaResult::new(config);

        let steps = AssertUnwindSafe(self.run_steps(config, &mut result)).catch_unwind();
        if let Err(payload) = steps.await {
            let reason = panic_message(payload.as_ref());
            error!("Évaluation interrompue : {}", reason);
            result.errors.push(format!("Unexpected error: {}", reason));
        }

        result.overall_status = result.aggregate_status();
        result.top_issues = result.compute_top_issues();

        info!(
            status = %result.overall_status,
            fails = result.count_with_status(QaStatus::Fail),
            warns = result.count_with_status(QaStatus::Warn),
            "Évaluation terminée"
        );
        result
    }

    async fn run_steps(&self, config: &LayerConfig, result: &mut LayerQaResult) {
        let url = config.service_url.as_str();

        // 1. Métadonnées (porte d'entrée)
        let Some(metadata) = self
            .fetch_or_absent("metadata", || self.source.fetch_metadata(url))
            .await
        else {
            error!("Couche injoignable : {}", url);
            result.reachable = false;
            result.rule_results.push(ReachabilityRule::evaluate(None));
            result.errors.push(UNREACHABLE_ERROR.to_string());
            return;
        };

        // 2. Champs de synthèse tirés des métadonnées
        result.reachable = true;
        let meta = LayerMetadata::new(&metadata);
        result.geometry_type_reported = meta.geometry_type_short();
        result.max_record_count = meta.max_record_count();
        result.spatial_reference_wkid = meta.wkid();
        debug!(
            geometry = ?result.geometry_type_reported,
            max_record_count = ?result.max_record_count,
            "Métadonnées récupérées"
        );

        // 3. Comptage
        let count = self
            .fetch_or_absent("count", || self.source.fetch_count(url, WHERE_ALL))
            .await;
        result.count_estimate = count;
        debug!(count = ?count, "Comptage");

        // 4. Échantillon (seulement si la couche a des entités)
        let features: Option<Vec<Feature>> = match count {
            Some(n) if n > 0 => {
                let request =
                    SampleRequest::all_fields(self.settings.sample_size, meta.max_record_count());
                let sample = self
                    .fetch_or_absent("sample", || self.source.fetch_sample(url, &request))
                    .await;
                debug!(sampled = ?sample.as_ref().map(Vec::len), "Échantillonnage");
                sample
            }
            _ => None,
        };

        // 5. Formats de sortie (informatif)
        result.format_supported = tokio::time::timeout(
            self.settings.request_timeout,
            self.source.probe_output_formats(url),
        )
        .await
        .unwrap_or_default();

        // 6. Règles
        let ctx = RuleContext {
            config,
            metadata: Some(&metadata),
            count,
            features: features.as_deref(),
            source: self.source.as_ref(),
            settings: &self.settings,
            now: self.now(),
        };
        result.rule_results = self.engine.run_all(&ctx).await;

        // 7. Recopie des preuves dans les champs de synthèse
        Self::mirror_evidence(result);
        result.raw_metadata = Some(metadata);
    }

    /// Une erreur qui persiste après les relances vaut "donnée absente".
    async fn fetch_or_absent<T, F, Fut>(&self, step: &str, call: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Option<T>, SourceError>>,
    {
        match self.fetch_with_retry(step, call).await {
            Ok(value) => value,
            Err(e) => {
                warn!(step, error = %e, "Appel en échec, donnée considérée absente");
                None
            }
        }
    }

    /// Applique le délai de requête et relance `retries` fois sur erreur transitoire.
    async fn fetch_with_retry<T, F, Fut>(
        &self,
        step: &str,
        call: F,
    ) -> Result<Option<T>, SourceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Option<T>, SourceError>>,
    {
        let timeout = self.settings.request_timeout;
        let mut attempt = 0u32;
        loop {
            let outcome = match tokio::time::timeout(timeout, call()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SourceError::Timeout(timeout.as_millis() as u64)),
            };
            match outcome {
                Err(e) if e.is_transient() && attempt < self.settings.retries => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    debug!(
                        step,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Nouvelle tentative"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.settings
            .retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_RETRY_BACKOFF)
    }

    fn mirror_evidence(result: &mut LayerQaResult) {
        let score = result
            .rule(RuleName::MetadataCompleteness)
            .and_then(|r| r.evidence().score());
        let pagination = result.rule(RuleName::PaginationSupport).map(|r| r.status());
        let high_nulls = result
            .rule(RuleName::SchemaSanity)
            .and_then(|r| r.evidence().as_schema())
            .map(|s| s.high_null_count);
        let geometry_pcts = result
            .rule(RuleName::GeometrySanity)
            .and_then(|r| r.evidence().as_geometry())
            .map(|g| (g.pct_invalid, g.pct_empty));
        let last_edit = result
            .rule(RuleName::UpdateRecency)
            .and_then(|r| r.evidence().as_recency())
            .and_then(|r| r.last_edit_date.clone());

        result.metadata_score = score.unwrap_or(0);
        result.pagination_ok = pagination.unwrap_or(QaStatus::Na);
        result.null_fields_over_80pct = high_nulls.unwrap_or(0);
        if let Some((invalid, empty)) = geometry_pcts {
            result.pct_invalid_geometry = invalid;
            result.pct_empty_geometry = empty;
        }
        result.last_edit_date = last_edit;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panique sans message".to_string()
    }
}
