//! history.rs: recently recommended ids per query signature, used for the
//! recency penalty.
//!
//! Stored as a JSON object: `{ "<signature>": ["W3", "W1", ...], ... }`,
//! most recent first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::RecencyParams;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationHistory {
    entries: HashMap<String, Vec<String>>,
}

impl RecommendationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient decode: anything that is not a signature → id-list object
    /// yields an empty history.
    pub fn from_json_lossy(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Up to `cap` recent ids for `signature`, most recent first.
    pub fn recent(&self, signature: &str, cap: usize) -> &[String] {
        self.entries
            .get(signature)
            .map(|ids| &ids[..ids.len().min(cap)])
            .unwrap_or_default()
    }

    /// Put `picked` in front, keep older ids that were not picked again, cap.
    pub fn record(&mut self, signature: &str, picked: &[String], cap: usize) {
        let existing = self.entries.remove(signature).unwrap_or_default();
        let mut merged: Vec<String> = picked.to_vec();
        merged.extend(existing.into_iter().filter(|id| !picked.contains(id)));
        merged.truncate(cap);
        self.entries.insert(signature.to_string(), merged);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Penalty for `id` given the recent list: `max × (cap - idx) / cap`, so every
/// remembered id is penalized and the newest the most. Unknown id → 0.
pub fn recency_penalty(id: &str, recent: &[String], p: &RecencyParams) -> f64 {
    let cap = p.history_cap.max(1);
    match recent.iter().take(cap).position(|r| r == id) {
        Some(idx) => p.max_penalty * (cap - idx) as f64 / cap as f64,
        None => 0.0,
    }
}
