//! Retire Match - preference-to-town matching engine
//!
//! Scores retirement towns against a user's stated preferences across six
//! categories (region, climate, culture, hobbies, administration, cost),
//! combines them with configurable weights and ranks the results. Scores are
//! memoized per preference fingerprint in a versioned, time-limited cache.

pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Settings;
pub use core::{ScoringWeights, TownMatcher, Vocabulary};
pub use models::{RankRequest, TownHobbies, TownMatch, TownRecord, UserPreference};
pub use services::{MemoryScoreCache, MemoryStore, RankingService};
