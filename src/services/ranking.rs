use thiserror::Error;
use validator::Validate;

use crate::config::Settings;
use crate::core::matcher::{TownMatcher, WeightsError};
use crate::models::{RankRequest, TownHobbies, TownMatch, TownRecord};
use crate::services::cache::{MemoryScoreCache, ScoreCache};
use crate::services::store::{PreferenceStore, StoreError, TownStore};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ranks towns for a user, wiring the stores, matcher and score cache together
pub struct RankingService<P, T, C> {
    preferences: P,
    towns: T,
    cache: C,
    cache_enabled: bool,
    matcher: TownMatcher,
}

impl<P, T> RankingService<P, T, MemoryScoreCache>
where
    P: PreferenceStore,
    T: TownStore,
{
    /// Build a service with an in-memory cache sized and timed from settings
    pub fn from_settings(settings: &Settings, preferences: P, towns: T) -> Result<Self, WeightsError> {
        let cache = MemoryScoreCache::from_settings(&settings.cache);
        let matcher = TownMatcher::new(settings.scoring.weights)?.with_cache_ttl(cache.ttl());
        Ok(Self::new(preferences, towns, cache, matcher).with_cache_enabled(settings.cache.enabled))
    }
}

impl<P, T, C> RankingService<P, T, C>
where
    P: PreferenceStore,
    T: TownStore,
    C: ScoreCache,
{
    /// Create the service, discarding cached results from older versions
    pub fn new(preferences: P, towns: T, cache: C, matcher: TownMatcher) -> Self {
        let purged = matcher.begin_session(&cache);
        if purged > 0 {
            tracing::debug!("Dropped {} stale cached scores", purged);
        }
        Self {
            preferences,
            towns,
            cache,
            cache_enabled: true,
            matcher,
        }
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn matcher(&self) -> &TownMatcher {
        &self.matcher
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Best-matching towns for the requesting user
    ///
    /// A failed hobby lookup degrades that one town to "no hobbies listed"
    /// rather than failing the whole ranking. Degraded scores are not cached.
    pub fn personalized_towns(&self, request: &RankRequest) -> Result<Vec<TownMatch>, RankingError> {
        request.validate()?;

        let prefs = self.preferences.preferences(&request.user_id)?;
        let towns = self.towns.towns(&request.filter())?;
        let limit = request.limit as usize;

        tracing::debug!(
            "Scoring {} candidate towns for user {}",
            towns.len(),
            request.user_id
        );

        let matches = if self.cache_enabled {
            self.matcher.rank_towns_cached(
                &self.cache,
                &prefs,
                &towns,
                |town: &TownRecord| self.towns.town_hobbies(&town.id),
                limit,
            )
        } else {
            self.matcher
                .rank_towns(&prefs, &towns, |town: &TownRecord| self.hobbies_or_empty(town), limit)
        };

        Ok(matches)
    }

    fn hobbies_or_empty(&self, town: &TownRecord) -> TownHobbies {
        match self.towns.town_hobbies(&town.id) {
            Ok(hobbies) => hobbies,
            Err(e) => {
                tracing::warn!("Hobby lookup failed for town {}: {}", town.id, e);
                TownHobbies::empty()
            }
        }
    }
}
