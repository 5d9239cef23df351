// FICHIER : src-core/src/lib.rs

pub mod qa_engine;
pub mod report;
pub mod source;
pub mod utils;

pub use qa_engine::{
    BatchOutcome, BatchRunner, LayerConfig, LayerEvaluator, LayerQaResult, QaStatus, RuleName,
    RuleResult, RunSummary,
};
pub use source::{FixtureSource, LayerSource};
