//! Factor weights, the A/B experiment arms and the adaptive multipliers.
//!
//! Arm B scores with `base × multiplier` per factor and nudges the multipliers
//! after every selection. Arm A scores with a fixed alternate vector and never
//! learns.
//!
//! Stored multiplier JSON shape:
//! {
//!   "lexical": 1.0, "semantic": 1.0, "ratings": 1.0,
//!   "reviews": 1.0, "budget": 1.0, "occasion": 1.0
//! }

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyze::scoring::FactorBreakdown;
use crate::config::AdaptiveParams;

/// One weight per scoring factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub lexical: f64,
    pub semantic: f64,
    pub ratings: f64,
    pub reviews: f64,
    pub budget: f64,
    pub occasion: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self::base()
    }
}

impl FactorWeights {
    /// Base vector used by arm B before multipliers.
    pub const fn base() -> Self {
        Self {
            lexical: 7.0,
            semantic: 3.0,
            ratings: 1.5,
            reviews: 1.0,
            budget: 1.0,
            occasion: 1.0,
        }
    }

    /// Fixed vector used by arm A.
    pub const fn arm_a() -> Self {
        Self {
            lexical: 7.0,
            semantic: 1.0,
            ratings: 1.1,
            reviews: 0.8,
            budget: 1.2,
            occasion: 0.8,
        }
    }

    /// Per-factor product with the adaptive multipliers.
    pub fn scaled(&self, m: &AdaptiveMultipliers) -> Self {
        Self {
            lexical: self.lexical * m.lexical,
            semantic: self.semantic * m.semantic,
            ratings: self.ratings * m.ratings,
            reviews: self.reviews * m.reviews,
            budget: self.budget * m.budget,
            occasion: self.occasion * m.occasion,
        }
    }
}

/// Experiment arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentGroup {
    A,
    B,
}

impl ExperimentGroup {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }

    /// Fair coin flip.
    pub fn assign<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Self::A
        } else {
            Self::B
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    pub fn learns(&self) -> bool {
        matches!(self, Self::B)
    }
}

impl fmt::Display for ExperimentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both weight vectors, configurable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub base: FactorWeights,
    pub arm_a: FactorWeights,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            base: FactorWeights::base(),
            arm_a: FactorWeights::arm_a(),
        }
    }
}

impl WeightsConfig {
    /// Weights actually used to score for `group`.
    pub fn effective(&self, group: ExperimentGroup, m: &AdaptiveMultipliers) -> FactorWeights {
        match group {
            ExperimentGroup::A => self.arm_a,
            ExperimentGroup::B => self.base.scaled(m),
        }
    }
}

/// Per-factor multipliers learned from selections.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveMultipliers {
    pub lexical: f64,
    pub semantic: f64,
    pub ratings: f64,
    pub reviews: f64,
    pub budget: f64,
    pub occasion: f64,
}

impl Default for AdaptiveMultipliers {
    fn default() -> Self {
        Self {
            lexical: 1.0,
            semantic: 1.0,
            ratings: 1.0,
            reviews: 1.0,
            budget: 1.0,
            occasion: 1.0,
        }
    }
}

impl AdaptiveMultipliers {
    /// Lenient decode of a stored vector: a missing, zero or non-numeric field
    /// falls back to 1.0; every value is clamped to the configured bounds.
    /// Unparsable input yields the neutral vector.
    pub fn from_json_lossy(raw: &str, params: &AdaptiveParams) -> Self {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(raw) else {
            return Self::default();
        };
        let field = |name: &str| -> f64 {
            let x = match v.get(name) {
                Some(serde_json::Value::Number(n)) => n.as_f64(),
                Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match x {
                Some(x) if x.is_finite() && x != 0.0 => params.clamp(x),
                _ => 1.0,
            }
        };
        Self {
            lexical: field("lexical"),
            semantic: field("semantic"),
            ratings: field("ratings"),
            reviews: field("reviews"),
            budget: field("budget"),
            occasion: field("occasion"),
        }
    }

    /// Nudge each multiplier: up by `step_up` when its signal fired, down by
    /// `step_down` otherwise, clamped to `[min, max]`.
    pub fn adapt(&mut self, s: &SelectionSignals, params: &AdaptiveParams) {
        let nudge = |current: f64, positive: bool| {
            let next = if positive {
                current + params.step_up
            } else {
                current - params.step_down
            };
            params.clamp(next)
        };
        self.lexical = nudge(self.lexical, s.lexical);
        self.semantic = nudge(self.semantic, s.semantic);
        self.ratings = nudge(self.ratings, s.ratings);
        self.reviews = nudge(self.reviews, s.reviews);
        self.budget = nudge(self.budget, s.budget);
        self.occasion = nudge(self.occasion, s.occasion);
    }

    pub fn values(&self) -> [f64; 6] {
        [
            self.lexical,
            self.semantic,
            self.ratings,
            self.reviews,
            self.budget,
            self.occasion,
        ]
    }
}

/// Which factors "explain" a chosen item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionSignals {
    pub lexical: bool,
    pub semantic: bool,
    pub ratings: bool,
    pub reviews: bool,
    pub budget: bool,
    pub occasion: bool,
}

impl SelectionSignals {
    pub fn from_breakdown(b: &FactorBreakdown, params: &AdaptiveParams) -> Self {
        Self {
            lexical: b.lexical_hits > 0,
            semantic: b.semantic_hits > 0,
            ratings: b.ratings_score > params.ratings_threshold,
            reviews: b.reviews_count > 0,
            budget: b.budget_fit >= params.budget_fit_threshold,
            occasion: b.occasion_adjustment >= params.occasion_threshold,
        }
    }
}
