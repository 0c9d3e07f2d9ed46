// Service exports
pub mod cache;
pub mod ranking;
pub mod store;

pub use cache::{
    preference_fingerprint, CacheKey, CacheStats, Clock, ManualClock, MemoryScoreCache, ScoreCache,
    SystemClock,
};
pub use ranking::{RankingError, RankingService};
pub use store::{MemoryStore, PreferenceStore, StoreError, TownHobbyLink, TownStore};
