// Scoring engine exports
pub mod admin;
pub mod climate;
pub mod cost;
pub mod culture;
pub mod hobbies;
pub mod insights;
pub mod matcher;
pub mod normalize;
pub mod region;
pub(crate) mod slice;

pub use admin::{score_admin, AdminLevel};
pub use climate::score_climate;
pub use cost::score_cost;
pub use culture::score_culture;
pub use hobbies::score_hobbies;
pub use insights::summarize;
pub use matcher::{preference_coverage, ScoringWeights, TownMatcher, WeightsError, SCORING_VERSION};
pub use normalize::{lookup_key, Dimension, Vocabulary, VocabularyError};
pub use region::score_region;
