// src/analyze/mod.rs
//! Ranking pipeline pieces: factor scoring, weights/experiment arms and the
//! diversity rerank. The orchestration lives in `crate::engine`.

pub mod rerank;
pub mod scoring;
pub mod weights;

// Re-export convenient types.
pub use crate::analyze::rerank::pick_diverse;
pub use crate::analyze::scoring::{
    score_candidate, FactorBreakdown, MatchReason, ScoredCandidate, ScoringContext,
};
pub use crate::analyze::weights::{
    AdaptiveMultipliers, ExperimentGroup, FactorWeights, SelectionSignals, WeightsConfig,
};
