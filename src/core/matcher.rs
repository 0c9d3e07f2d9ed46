use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::core::{
    admin::score_admin, climate::score_climate, cost::score_cost, culture::score_culture,
    hobbies::score_hobbies, insights::summarize, normalize::Vocabulary, region::score_region,
};
use crate::models::{
    Category, CategoryBreakdown, TownHobbies, TownMatch, TownRecord, UserPreference,
};
use crate::services::cache::{preference_fingerprint, CacheKey, MemoryScoreCache, ScoreCache};

/// Bumped whenever scoring rules change, so cached results from older rules
/// are never served
pub const SCORING_VERSION: &str = "3";

/// Coverage below which a high score is flagged as weakly personalized
const LOW_COVERAGE: f64 = 0.4;
const HIGH_SCORE: u8 = 80;
const PERSONALIZATION_NOTE: &str =
    "Limited personalization: you provided very few preferences. Complete your profile for sharper matches.";

/// Allowed drift of the weight sum from 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Hex characters of the configuration digest in the version tag
const CONFIG_DIGEST_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum WeightsError {
    #[error("Invalid scoring weights: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Relative importance of each category in the total score
///
/// Weights are each within 0-1 and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_weight_sum"))]
pub struct ScoringWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_region_weight")]
    pub region: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_climate_weight")]
    pub climate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_culture_weight")]
    pub culture: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_hobbies_weight")]
    pub hobbies: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_admin_weight")]
    pub admin: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_cost_weight")]
    pub cost: f64,
}

fn default_region_weight() -> f64 { 0.30 }
fn default_climate_weight() -> f64 { 0.13 }
fn default_culture_weight() -> f64 { 0.12 }
fn default_hobbies_weight() -> f64 { 0.08 }
fn default_admin_weight() -> f64 { 0.18 }
fn default_cost_weight() -> f64 { 0.19 }

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            region: default_region_weight(),
            climate: default_climate_weight(),
            culture: default_culture_weight(),
            hobbies: default_hobbies_weight(),
            admin: default_admin_weight(),
            cost: default_cost_weight(),
        }
    }
}

fn validate_weight_sum(weights: &ScoringWeights) -> Result<(), ValidationError> {
    if (weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        let mut error = ValidationError::new("weight_sum");
        error.message = Some(format!("weights sum to {:.4}, expected 1.0", weights.sum()).into());
        return Err(error);
    }
    Ok(())
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.region + self.climate + self.culture + self.hobbies + self.admin + self.cost
    }

    pub fn check(&self) -> Result<(), WeightsError> {
        self.validate()?;
        Ok(())
    }

    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Region => self.region,
            Category::Climate => self.climate,
            Category::Culture => self.culture,
            Category::Hobbies => self.hobbies,
            Category::Admin => self.admin,
            Category::Cost => self.cost,
        }
    }

    /// Weighted total of a breakdown, rounded and clamped to 0-100
    pub fn combine(&self, breakdown: &CategoryBreakdown) -> u8 {
        let total: f64 = Category::ALL
            .iter()
            .map(|&category| self.weight(category) * breakdown.get(category).score as f64)
            .sum();
        total.round().clamp(0.0, 100.0) as u8
    }
}

/// Scores towns against a user's preferences
///
/// Holds the category weights and vocabulary; all scoring is pure, so one
/// matcher can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct TownMatcher {
    weights: ScoringWeights,
    vocabulary: Arc<Vocabulary>,
    version: String,
    cache_ttl: Duration,
}

impl TownMatcher {
    pub fn new(weights: ScoringWeights) -> Result<Self, WeightsError> {
        weights.check()?;
        Ok(Self::assemble(weights, Vocabulary::shared()))
    }

    pub fn with_default_weights() -> Self {
        Self::assemble(ScoringWeights::default(), Vocabulary::shared())
    }

    pub fn with_vocabulary(self, vocabulary: Vocabulary) -> Self {
        Self {
            cache_ttl: self.cache_ttl,
            ..Self::assemble(self.weights, Arc::new(vocabulary))
        }
    }

    fn assemble(weights: ScoringWeights, vocabulary: Arc<Vocabulary>) -> Self {
        let version = version_tag(&weights, &vocabulary);
        Self {
            weights,
            vocabulary,
            version,
            cache_ttl: MemoryScoreCache::DEFAULT_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Tag for cached results
    ///
    /// Scoring rules, vocabulary version and a digest of the weights and
    /// vocabulary content, e.g. `3+2025.3-1f0c9a2e`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Score one town across all six categories
    pub fn score_town(
        &self,
        prefs: &UserPreference,
        town: &TownRecord,
        hobbies: &TownHobbies,
    ) -> TownMatch {
        let vocab = self.vocabulary.as_ref();
        let breakdown = CategoryBreakdown {
            region: score_region(prefs, town, vocab),
            climate: score_climate(prefs, town, vocab),
            culture: score_culture(prefs, town, vocab),
            hobbies: score_hobbies(prefs, hobbies, vocab),
            admin: score_admin(prefs, town, vocab),
            cost: score_cost(prefs, town),
        };

        let total_score = self.weights.combine(&breakdown);
        let preference_coverage = preference_coverage(prefs);
        let personalization_note = (preference_coverage < LOW_COVERAGE && total_score >= HIGH_SCORE)
            .then(|| PERSONALIZATION_NOTE.to_string());
        let summary = summarize(town, &breakdown, total_score);

        TownMatch {
            town_id: town.id.clone(),
            town_name: town.name.clone(),
            total_score,
            breakdown,
            preference_coverage,
            personalization_note,
            summary,
        }
    }

    /// Score one town, serving from `cache` when a fresh result exists
    pub fn score_town_cached(
        &self,
        cache: &dyn ScoreCache,
        prefs: &UserPreference,
        town: &TownRecord,
        hobbies: &TownHobbies,
    ) -> TownMatch {
        let key = CacheKey::for_preferences(self.version(), prefs, &town.id);
        self.cached_or_score(cache, key, || (self.score_town(prefs, town, hobbies), true))
    }

    /// Score and rank towns, best first, keeping at most `limit`
    ///
    /// `hobby_lookup` supplies each town's hobby associations.
    pub fn rank_towns<F>(
        &self,
        prefs: &UserPreference,
        towns: &[TownRecord],
        mut hobby_lookup: F,
        limit: usize,
    ) -> Vec<TownMatch>
    where
        F: FnMut(&TownRecord) -> TownHobbies,
    {
        let mut matches: Vec<TownMatch> = towns
            .iter()
            .map(|town| self.score_town(prefs, town, &hobby_lookup(town)))
            .collect();

        tracing::debug!("Ranked {} towns for user {}", matches.len(), prefs.user_id);
        sort_and_truncate(&mut matches, limit);
        matches
    }

    /// Like [`rank_towns`](Self::rank_towns), reading and filling `cache`
    ///
    /// Hobby associations are only looked up for towns that miss the cache.
    /// A failed lookup scores that town as having no listed hobbies, and the
    /// degraded result is returned but never cached.
    pub fn rank_towns_cached<F, E>(
        &self,
        cache: &dyn ScoreCache,
        prefs: &UserPreference,
        towns: &[TownRecord],
        mut hobby_lookup: F,
        limit: usize,
    ) -> Vec<TownMatch>
    where
        F: FnMut(&TownRecord) -> Result<TownHobbies, E>,
        E: Display,
    {
        let fingerprint = preference_fingerprint(prefs);

        let mut matches: Vec<TownMatch> = towns
            .iter()
            .map(|town| {
                let key = CacheKey::new(self.version.as_str(), fingerprint.as_str(), town.id.as_str());
                self.cached_or_score(cache, key, || match hobby_lookup(town) {
                    Ok(hobbies) => (self.score_town(prefs, town, &hobbies), true),
                    Err(e) => {
                        tracing::warn!(
                            "Hobby lookup failed for town {}: {}; scoring without hobbies, result not cached",
                            town.id,
                            e
                        );
                        (self.score_town(prefs, town, &TownHobbies::empty()), false)
                    }
                })
            })
            .collect();

        tracing::debug!(
            "Ranked {} towns for user {} (fingerprint {})",
            matches.len(),
            prefs.user_id,
            fingerprint
        );
        sort_and_truncate(&mut matches, limit);
        matches
    }

    /// Drop cached results tagged with any other version
    ///
    /// That includes results from matchers with different weights or
    /// vocabulary sharing the same cache.
    pub fn begin_session(&self, cache: &dyn ScoreCache) -> usize {
        cache.purge(&self.version)
    }

    /// `score` returns the result and whether it may be cached
    fn cached_or_score<F>(&self, cache: &dyn ScoreCache, key: CacheKey, score: F) -> TownMatch
    where
        F: FnOnce() -> (TownMatch, bool),
    {
        if let Some(hit) = cache.get(&key) {
            return hit;
        }
        let (result, cacheable) = score();
        if cacheable {
            cache.set(key, result.clone(), self.cache_ttl);
        }
        result
    }
}

fn version_tag(weights: &ScoringWeights, vocabulary: &Vocabulary) -> String {
    let mut hasher = Sha256::new();
    for category in Category::ALL {
        hasher.update(weights.weight(category).to_le_bytes());
    }
    hasher.update(vocabulary.digest().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!(
        "{}+{}-{}",
        SCORING_VERSION,
        vocabulary.version(),
        &digest[..CONFIG_DIGEST_LEN]
    )
}

impl Default for TownMatcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Share of the six categories the user said anything about
pub fn preference_coverage(prefs: &UserPreference) -> f64 {
    let stated = [
        prefs.has_region_preferences(),
        prefs.has_climate_preferences(),
        prefs.has_culture_preferences(),
        prefs.has_hobby_preferences(),
        prefs.has_admin_preferences(),
        prefs.has_cost_preferences(),
    ]
    .iter()
    .filter(|&&stated| stated)
    .count();
    stated as f64 / Category::ALL.len() as f64
}

/// Sort by score (descending), then town name (ascending), and keep `limit`
fn sort_and_truncate(matches: &mut Vec<TownMatch>, limit: usize) {
    matches.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.town_name.cmp(&b.town_name))
            .then_with(|| a.town_id.cmp(&b.town_id))
    });
    matches.truncate(limit);
}
