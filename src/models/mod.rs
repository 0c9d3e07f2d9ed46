// Model exports
pub mod domain;
pub mod requests;
pub mod results;
pub mod tokens;

pub use domain::{CulturalImportance, TownHobbies, TownHobbyRow, TownRecord, UserPreference};
pub use requests::{RankRequest, TownFilter};
pub use results::{
    Category, CategoryBreakdown, Confidence, Factor, MatchQuality, MatchSummary, ScoreResult,
    TownMatch,
};
pub use tokens::{RawTokens, TokenSet};
