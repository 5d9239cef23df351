// FICHIER : src-core/src/qa_engine/batch.rs

use super::evaluator::LayerEvaluator;
use super::model::{LayerConfig, LayerQaResult};
use super::status::QaStatus;
use crate::utils::prelude::*;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Bilan d'une exécution complète.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub config_source: String,
    pub total_layers: usize,
    pub pass_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
    pub na_count: usize,
}

impl RunSummary {
    pub fn from_results(results: &[LayerQaResult], config_source: &str) -> Self {
        let count = |s: QaStatus| results.iter().filter(|r| r.overall_status == s).count();
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            config_source: config_source.to_string(),
            total_layers: results.len(),
            pass_count: count(QaStatus::Pass),
            warn_count: count(QaStatus::Warn),
            fail_count: count(QaStatus::Fail),
            na_count: count(QaStatus::Na),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<LayerQaResult>,
    pub summary: RunSummary,
}

impl BatchOutcome {
    /// 1 si aucune couche n'a produit de résultat ou si toutes sont en FAIL, 0 sinon.
    pub fn exit_code(&self) -> i32 {
        let all_failed = self
            .results
            .iter()
            .all(|r| r.overall_status == QaStatus::Fail);
        if self.results.is_empty() || all_failed {
            1
        } else {
            0
        }
    }
}

/// Évalue un catalogue de couches avec un nombre borné de tâches simultanées.
pub struct BatchRunner {
    evaluator: Arc<LayerEvaluator>,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(evaluator: LayerEvaluator, concurrency: usize) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Les résultats sont rendus dans l'ordre du catalogue. Une tâche avortée
    /// est journalisée puis ignorée ; le reste du lot continue.
    #[instrument(skip(self, configs), fields(layers = configs.len(), concurrency = self.concurrency))]
    pub async fn run(&self, configs: &[LayerConfig], config_source: &str) -> BatchOutcome {
        info!("Démarrage du lot QA");
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(usize, LayerQaResult)> = JoinSet::new();

        for (idx, config) in configs.iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(e) => {
                    error!("Sémaphore fermé, arrêt du lot : {}", e);
                    break;
                }
            };
            let evaluator = Arc::clone(&self.evaluator);
            let config = config.clone();
            tasks.spawn(async move {
                let _permit = permit;
                (idx, evaluator.evaluate(&config).await)
            });
        }

        let mut slots: Vec<Option<LayerQaResult>> = vec![None; configs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => {
                    if let Some(slot) = slots.get_mut(idx) {
                        *slot = Some(result);
                    }
                }
                Err(e) => {
                    error!("Tâche de couche avortée, couche ignorée : {}", e);
                }
            }
        }

        let results: Vec<LayerQaResult> = slots.into_iter().flatten().collect();
        let summary = RunSummary::from_results(&results, config_source);

        if results.len() < configs.len() {
            warn!(
                missing = configs.len() - results.len(),
                "Des couches n'ont produit aucun résultat"
            );
        }
        info!(
            pass = summary.pass_count,
            warn = summary.warn_count,
            fail = summary.fail_count,
            "Lot QA terminé"
        );

        BatchOutcome { results, summary }
    }
}
