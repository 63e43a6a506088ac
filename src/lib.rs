// Public library surface for the CLI and integration tests.

pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod menu;
pub mod query;
pub mod store;
pub mod text;

// Ranking pipeline (scoring, weights, diversity rerank) and its orchestration
pub mod analyze;
pub mod engine;

// Guest flow around the ranking
pub mod advisor;
pub mod pairing;
pub mod summary;
pub mod wizard;

// Menu sources
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::advisor::{SelectionOutcome, Sommelier};
pub use crate::config::SommelierConfig;
pub use crate::engine::{recommend, CandidatePool, RankingContext, Recommendation};
pub use crate::error::{Result, SommelierError};
pub use crate::menu::{format_price, parse_price, Category, MenuItem};
pub use crate::query::{PriceRange, RecommendationQuery};
pub use crate::store::{JsonFileStore, MemoryStore, NullStore, PreferenceStore};
pub use crate::wizard::{Step, Wizard};
