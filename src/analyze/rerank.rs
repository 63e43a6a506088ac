// src/analyze/rerank.rs
//! Diversity-aware final selection.
//!
//! - The head of the ranking (`pool` items) gets uniform jitter in `[0, jitter)`
//!   and is re-sorted; the tail keeps its order behind it.
//! - First pass picks greedily, skipping items whose appellation is already
//!   taken (a missing appellation is one shared group).
//! - Second pass fills remaining slots ignoring appellations.
//! - Ids are never picked twice.

use rand::Rng;
use std::collections::HashSet;

use crate::analyze::scoring::ScoredCandidate;

const NO_APPELLATION: &str = "SIN_DO";

/// Pick up to `target` candidates from a score-sorted list.
pub fn pick_diverse<'a, R: Rng + ?Sized>(
    candidates: &[ScoredCandidate<'a>],
    target: usize,
    pool: usize,
    jitter: f64,
    rng: &mut R,
) -> Vec<ScoredCandidate<'a>> {
    if candidates.is_empty() || target == 0 {
        return Vec::new();
    }

    let pool = pool.min(candidates.len());
    let mut head: Vec<(f64, &ScoredCandidate<'a>)> = candidates[..pool]
        .iter()
        .map(|c| {
            let noise = if jitter > 0.0 {
                rng.random::<f64>() * jitter
            } else {
                0.0
            };
            (c.score + noise, c)
        })
        .collect();
    head.sort_by(|a, b| b.0.total_cmp(&a.0));

    let ordered: Vec<&ScoredCandidate<'a>> = head
        .into_iter()
        .map(|(_, c)| c)
        .chain(candidates[pool..].iter())
        .collect();

    let mut picked: Vec<ScoredCandidate<'a>> = Vec::with_capacity(target);
    let mut ids: HashSet<&str> = HashSet::new();
    let mut appellations: HashSet<&str> = HashSet::new();

    for c in &ordered {
        if picked.len() >= target {
            break;
        }
        let app = c
            .item
            .appellation
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_APPELLATION);
        if ids.contains(c.item.id.as_str()) || appellations.contains(app) {
            continue;
        }
        ids.insert(c.item.id.as_str());
        appellations.insert(app);
        picked.push((*c).clone());
    }

    for c in &ordered {
        if picked.len() >= target {
            break;
        }
        if !ids.insert(c.item.id.as_str()) {
            continue;
        }
        picked.push((*c).clone());
    }

    picked
}
