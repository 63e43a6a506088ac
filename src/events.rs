//! Capped event log of ranking runs and selections, kept in the preference
//! store for offline inspection.
//!
//! Each entry is a JSON object tagged by `"type"` (`"ranking"` or
//! `"selection"`). Factor values are rounded to 2 decimals. Existing entries
//! are kept as opaque JSON so older shapes survive an append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyze::scoring::ScoredCandidate;
use crate::analyze::weights::{ExperimentGroup, FactorWeights};
use crate::menu::Category;
use crate::query::PriceRange;
use crate::store::{get_json, set_json, PreferenceStore, KEY_RANKING_LOG};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    Ranking(RankingRun),
    Selection(SelectionEvent),
}

/// One recommendation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRun {
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub profile: Vec<String>,
    pub budget: PriceRange,
    pub group: ExperimentGroup,
    pub weights: FactorWeights,
    pub selected: Vec<SelectedSnapshot>,
    pub top_ranking: Vec<RankedSnapshot>,
}

/// A shortlisted item with its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSnapshot {
    pub id: String,
    pub position: usize,
    pub score: f64,
    pub lexical_hits: usize,
    pub semantic_hits: usize,
    pub ratings_score: f64,
    pub reviews_count: usize,
    pub budget_fit: f64,
    pub occasion_adjustment: f64,
}

/// An entry of the top ranking (before the diversity pass).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSnapshot {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub score: f64,
    pub lexical_hits: usize,
    pub semantic_hits: usize,
    pub ratings_score: f64,
    pub reviews_count: usize,
    pub budget_fit: f64,
    pub occasion_adjustment: f64,
    pub recency_penalty: f64,
}

/// The user chose a recommended item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub timestamp: DateTime<Utc>,
    pub group: ExperimentGroup,
    pub selected_id: String,
    pub position: usize,
    pub score: f64,
    pub category: Category,
    pub profile: Vec<String>,
    pub budget: PriceRange,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl SelectedSnapshot {
    pub fn from_candidate(c: &ScoredCandidate<'_>, position: usize) -> Self {
        let b = &c.breakdown;
        Self {
            id: c.item.id.clone(),
            position,
            score: round2(c.score),
            lexical_hits: b.lexical_hits,
            semantic_hits: b.semantic_hits,
            ratings_score: round2(b.ratings_score),
            reviews_count: b.reviews_count,
            budget_fit: round2(b.budget_fit),
            occasion_adjustment: round2(b.occasion_adjustment),
        }
    }
}

impl RankedSnapshot {
    pub fn from_candidate(c: &ScoredCandidate<'_>, rank: usize) -> Self {
        let b = &c.breakdown;
        Self {
            rank,
            id: c.item.id.clone(),
            name: c.item.name.clone(),
            score: round2(c.score),
            lexical_hits: b.lexical_hits,
            semantic_hits: b.semantic_hits,
            ratings_score: round2(b.ratings_score),
            reviews_count: b.reviews_count,
            budget_fit: round2(b.budget_fit),
            occasion_adjustment: round2(b.occasion_adjustment),
            recency_penalty: round2(b.recency_penalty),
        }
    }
}

/// Append `event`, dropping the oldest entries beyond `cap`.
pub fn append_event(store: &dyn PreferenceStore, event: &LogEvent, cap: usize) {
    let mut log: Vec<serde_json::Value> = get_json(store, KEY_RANKING_LOG).unwrap_or_default();
    match serde_json::to_value(event) {
        Ok(v) => log.push(v),
        Err(e) => {
            debug!(target: "store", error = %e, "event not encodable, skipped");
            return;
        }
    }
    if log.len() > cap {
        let excess = log.len() - cap;
        log.drain(0..excess);
    }
    set_json(store, KEY_RANKING_LOG, &log);
}

/// Decoded log entries; entries of unknown shape are skipped.
pub fn read_events(store: &dyn PreferenceStore) -> Vec<LogEvent> {
    get_json::<Vec<serde_json::Value>>(store, KEY_RANKING_LOG)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}
