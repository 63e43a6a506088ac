//! Advisor configuration.
//!
//! Resolution order for `SommelierConfig::load_default`:
//! 1) `$SOMMELIER_CONFIG_PATH` (must exist if set)
//! 2) `config/sommelier.toml` in the working directory
//! 3) built-in defaults
//!
//! Every section is optional; missing keys keep their defaults.

pub mod lexicon;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use crate::analyze::weights::WeightsConfig;
pub use lexicon::{Lexicon, OccasionPreset, PairingRules, ProfilePreset};

pub const DEFAULT_CONFIG_PATH: &str = "config/sommelier.toml";
pub const ENV_CONFIG_PATH: &str = "SOMMELIER_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SommelierConfig {
    pub scoring: ScoringParams,
    pub recency: RecencyParams,
    pub adaptive: AdaptiveParams,
    pub events: EventParams,
    pub weights: WeightsConfig,
    pub lexicon: Lexicon,
}

/// Knobs of the filter → score → select pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Number of recommendations returned.
    pub shortlist_size: usize,
    /// Candidates kept after sorting, before the diversity pass.
    pub top_pool: usize,
    /// Head of the ranking that gets random jitter.
    pub diversity_pool: usize,
    /// Upper bound of the uniform jitter added to pooled scores.
    pub diversity_jitter: f64,
    /// Margin added on both sides when the exact price range is empty.
    pub price_relax_margin: f64,
    pub review_points_per_review: f64,
    pub review_points_cap: f64,
    /// Ratings at or below this value are on a 5-point scale (×20).
    pub five_point_scale_max: f64,
    pub ratings_floor: f64,
    pub ratings_divisor: f64,
    pub ratings_cap: f64,
    pub budget_fit_scale: f64,
    pub occasion_scale: f64,
    pub special_budget_factor: f64,
    /// Upper bound (inclusive) of the everyday tier.
    pub everyday_max: f64,
    /// Upper bound (inclusive) of the special tier.
    pub special_max: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            shortlist_size: 2,
            top_pool: 20,
            diversity_pool: 12,
            diversity_jitter: 6.0,
            price_relax_margin: 15.0,
            review_points_per_review: 2.0,
            review_points_cap: 6.0,
            five_point_scale_max: 5.0,
            ratings_floor: 70.0,
            ratings_divisor: 1.5,
            ratings_cap: 20.0,
            budget_fit_scale: 10.0,
            occasion_scale: 5.0,
            special_budget_factor: 0.4,
            everyday_max: 30.0,
            special_max: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyParams {
    /// Ids remembered per query signature.
    pub history_cap: usize,
    /// Penalty for the most recent id; decays linearly to `max / cap`.
    pub max_penalty: f64,
}

impl Default for RecencyParams {
    fn default() -> Self {
        Self {
            history_cap: 12,
            max_penalty: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParams {
    pub min: f64,
    pub max: f64,
    pub step_up: f64,
    pub step_down: f64,
    /// Ratings score above this counts as a ratings signal.
    pub ratings_threshold: f64,
    /// Budget fit at or above this counts as a budget signal.
    pub budget_fit_threshold: f64,
    /// Occasion adjustment at or above this counts as an occasion signal.
    pub occasion_threshold: f64,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            min: 0.7,
            max: 1.8,
            step_up: 0.03,
            step_down: 0.01,
            ratings_threshold: 6.0,
            budget_fit_threshold: 6.0,
            occasion_threshold: 2.0,
        }
    }
}

impl AdaptiveParams {
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventParams {
    /// Max events kept in the ranking log.
    pub log_cap: usize,
}

impl Default for EventParams {
    fn default() -> Self {
        Self { log_cap: 200 }
    }
}

impl SommelierConfig {
    /// Parse from a TOML string and sanitize.
    pub fn from_toml_str(s: &str) -> crate::Result<Self> {
        let mut cfg: Self = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config at {}", path.display()))
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        debug!(target: "config", "no config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Repair values that would break the pipeline.
    fn sanitize(&mut self) {
        let a = &mut self.adaptive;
        if a.min > a.max {
            std::mem::swap(&mut a.min, &mut a.max);
        }
        let s = &mut self.scoring;
        if s.everyday_max > s.special_max {
            std::mem::swap(&mut s.everyday_max, &mut s.special_max);
        }
        s.shortlist_size = s.shortlist_size.max(1);
        s.top_pool = s.top_pool.max(s.shortlist_size);
        if !s.diversity_jitter.is_finite() || s.diversity_jitter < 0.0 {
            s.diversity_jitter = 0.0;
        }
        if !s.ratings_divisor.is_finite() || s.ratings_divisor <= 0.0 {
            s.ratings_divisor = ScoringParams::default().ratings_divisor;
        }
        self.recency.history_cap = self.recency.history_cap.max(1);
    }
}
