// FICHIER : src-core/src/qa_engine/mod.rs

// =========================================================================
//  MOTEUR QA : règles, preuves, évaluation par couche, lots
// =========================================================================

pub mod batch;
pub mod evaluator;
pub mod evidence;
pub mod geometry;
pub mod metadata;
pub mod model;
pub mod rules;
pub mod status;

pub use batch::{BatchOutcome, BatchRunner, RunSummary};
pub use evaluator::LayerEvaluator;
pub use evidence::Evidence;
pub use metadata::LayerMetadata;
pub use model::{
    load_catalog, parse_catalog, ExpectedGeometry, FormatSupport, LayerConfig, LayerQaResult,
    RuleName, RuleResult,
};
pub use rules::{QaRule, RuleContext, RuleEngine};
pub use status::QaStatus;
