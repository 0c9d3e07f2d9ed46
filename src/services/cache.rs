use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheSettings;
use crate::models::{TokenSet, TownMatch, UserPreference};

/// Hex characters kept from the preference digest
const FINGERPRINT_LEN: usize = 16;

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let step = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        *self.now.lock() += step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Pluggable store for aggregate match results
///
/// Implementations must tolerate concurrent callers; when two writers race on
/// the same key the last write wins.
pub trait ScoreCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<TownMatch>;

    fn set(&self, key: CacheKey, value: TownMatch, ttl: Duration);

    /// Drop every entry not tagged with `current_version`, returning how many
    /// were removed
    fn purge(&self, current_version: &str) -> usize;
}

/// Identifies one cached (preferences, town) result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub version: String,
    pub fingerprint: String,
    pub town_id: String,
}

impl CacheKey {
    pub fn new(version: impl Into<String>, fingerprint: impl Into<String>, town_id: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            fingerprint: fingerprint.into(),
            town_id: town_id.into(),
        }
    }

    /// Build a key for scoring `prefs` against one town
    pub fn for_preferences(version: &str, prefs: &UserPreference, town_id: &str) -> Self {
        Self::new(version, preference_fingerprint(prefs), town_id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "score:{}:{}:{}", self.version, self.fingerprint, self.town_id)
    }
}

#[derive(Serialize)]
struct BudgetSlice {
    total_monthly_budget: Option<f64>,
    max_monthly_rent: Option<f64>,
    monthly_healthcare_budget: Option<f64>,
    income_tax_sensitive: bool,
    property_tax_sensitive: bool,
    sales_tax_sensitive: bool,
}

#[derive(Serialize)]
struct ClimateSlice<'a> {
    summer: &'a TokenSet,
    winter: &'a TokenSet,
    humidity: &'a TokenSet,
    sunshine: &'a TokenSet,
    precipitation: &'a TokenSet,
}

#[derive(Serialize)]
struct LifestyleSlice<'a> {
    urban_rural: &'a TokenSet,
    pace_of_life: &'a TokenSet,
    social_atmosphere: &'a TokenSet,
    expat_community: &'a TokenSet,
    language_preferences: &'a TokenSet,
    languages_spoken: &'a TokenSet,
    dining_nightlife: Option<u8>,
    cultural_events: Option<u8>,
    museums: Option<u8>,
    activities: &'a TokenSet,
    interests: &'a TokenSet,
    custom_activities: &'a TokenSet,
    countries: &'a TokenSet,
    regions: &'a TokenSet,
    geographic_features: &'a TokenSet,
    vegetation_types: &'a TokenSet,
}

#[derive(Serialize)]
struct AdminSlice<'a> {
    healthcare_quality: &'a TokenSet,
    safety_importance: &'a TokenSet,
    government_efficiency: &'a TokenSet,
    political_stability: &'a TokenSet,
    visa_preference: &'a TokenSet,
    citizenship: Option<&'a str>,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    budget: BudgetSlice,
    climate: ClimateSlice<'a>,
    lifestyle: LifestyleSlice<'a>,
    admin: AdminSlice<'a>,
}

/// Short stable digest of everything in `prefs` that affects a score
///
/// Identity fields are left out, and token sets serialize in sorted order, so
/// two users with the same answers share a fingerprint.
pub fn preference_fingerprint(prefs: &UserPreference) -> String {
    let input = FingerprintInput {
        budget: BudgetSlice {
            total_monthly_budget: prefs.total_monthly_budget,
            max_monthly_rent: prefs.max_monthly_rent,
            monthly_healthcare_budget: prefs.monthly_healthcare_budget,
            income_tax_sensitive: prefs.income_tax_sensitive,
            property_tax_sensitive: prefs.property_tax_sensitive,
            sales_tax_sensitive: prefs.sales_tax_sensitive,
        },
        climate: ClimateSlice {
            summer: &prefs.summer_climate_preference,
            winter: &prefs.winter_climate_preference,
            humidity: &prefs.humidity_level,
            sunshine: &prefs.sunshine,
            precipitation: &prefs.precipitation,
        },
        lifestyle: LifestyleSlice {
            urban_rural: &prefs.urban_rural_preference,
            pace_of_life: &prefs.pace_of_life_preference,
            social_atmosphere: &prefs.social_atmosphere_preference,
            expat_community: &prefs.expat_community_preference,
            language_preferences: &prefs.language_preferences,
            languages_spoken: &prefs.languages_spoken,
            dining_nightlife: prefs.cultural_importance.dining_nightlife,
            cultural_events: prefs.cultural_importance.cultural_events,
            museums: prefs.cultural_importance.museums,
            activities: &prefs.activities,
            interests: &prefs.interests,
            custom_activities: &prefs.custom_activities,
            countries: &prefs.countries,
            regions: &prefs.regions,
            geographic_features: &prefs.geographic_features,
            vegetation_types: &prefs.vegetation_types,
        },
        admin: AdminSlice {
            healthcare_quality: &prefs.healthcare_quality,
            safety_importance: &prefs.safety_importance,
            government_efficiency: &prefs.government_efficiency,
            political_stability: &prefs.political_stability,
            visa_preference: &prefs.visa_preference,
            citizenship: prefs.citizenship.as_deref(),
        },
    };

    // Serializing plain structs of strings, numbers and bools cannot fail
    let json = serde_json::to_vec(&input).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&json);
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

struct CacheEntry {
    value: TownMatch,
    expires_at: DateTime<Utc>,
}

/// In-process score cache
///
/// Bounded by entry count. Reads do not refresh recency, so at capacity the
/// oldest insertion is evicted first. Expired entries are dropped when read.
pub struct MemoryScoreCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryScoreCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
    pub const DEFAULT_CAPACITY: usize = 5000;

    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            clock,
            ttl: Self::DEFAULT_TTL,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_entries).with_ttl(Duration::from_secs(settings.ttl_secs))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Lifetime applied by callers that don't pick their own
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        tracing::debug!("Score cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}

impl Default for MemoryScoreCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl ScoreCache for MemoryScoreCache {
    fn get(&self, key: &CacheKey) -> Option<TownMatch> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let cached = entries
            .peek(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()));
        let fresh = match cached {
            Some(Some(value)) => Some(value),
            Some(None) => {
                entries.pop(key);
                tracing::trace!("Score cache expired: {}", key);
                None
            }
            None => None,
        };
        drop(entries);

        if fresh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Score cache hit: {}", key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Score cache miss: {}", key);
        }
        fresh
    }

    fn set(&self, key: CacheKey, value: TownMatch, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        tracing::trace!("Score cache set: {}", key);
        self.entries.lock().put(key, CacheEntry { value, expires_at });
    }

    fn purge(&self, current_version: &str) -> usize {
        let mut entries = self.entries.lock();
        let stale: Vec<CacheKey> = entries
            .iter()
            .filter(|(key, _)| key.version != current_version)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }

        if !stale.is_empty() {
            tracing::debug!(
                "Purged {} score cache entries from versions other than {}",
                stale.len(),
                current_version
            );
        }
        stale.len()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::insights::summarize;
    use crate::models::{Category, CategoryBreakdown, ScoreResult, TownRecord};
    use chrono::TimeZone;

    fn town_match(town_id: &str, score: u8) -> TownMatch {
        let open = |category| ScoreResult::open(category, "Open");
        let breakdown = CategoryBreakdown {
            region: open(Category::Region),
            climate: open(Category::Climate),
            culture: open(Category::Culture),
            hobbies: open(Category::Hobbies),
            admin: open(Category::Admin),
            cost: open(Category::Cost),
        };
        TownMatch {
            town_id: town_id.to_string(),
            town_name: town_id.to_string(),
            total_score: score,
            summary: summarize(&TownRecord::default(), &breakdown, score),
            breakdown,
            preference_coverage: 0.0,
            personalization_note: None,
        }
    }

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_cache_key_display() {
        let key = CacheKey::new("v1", "abcd", "town-1");
        assert_eq!(key.to_string(), "score:v1:abcd:town-1");
    }

    #[test]
    fn test_fingerprint_ignores_identity_and_order() {
        let a = UserPreference {
            user_id: "alice".into(),
            summer_climate_preference: TokenSet::from_iter(["warm", "hot"]),
            ..Default::default()
        };
        let b = UserPreference {
            user_id: "bob".into(),
            summer_climate_preference: TokenSet::from_iter(["hot", "warm"]),
            ..Default::default()
        };
        assert_eq!(preference_fingerprint(&a), preference_fingerprint(&b));
        assert_eq!(preference_fingerprint(&a).len(), 16);

        let c = UserPreference {
            activities: TokenSet::from_iter(["golf"]),
            ..a.clone()
        };
        assert_ne!(preference_fingerprint(&a), preference_fingerprint(&c));
    }

    #[test]
    fn test_set_then_get() {
        let cache = MemoryScoreCache::new(10);
        let key = CacheKey::new("v1", "fp", "t1");
        cache.set(key.clone(), town_match("t1", 80), cache.ttl());

        assert_eq!(cache.get(&key).map(|m| m.total_score), Some(80));
        assert!(cache.get(&CacheKey::new("v1", "fp", "t2")).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_expired_entries_removed_on_read() {
        let clock = manual_clock();
        let cache = MemoryScoreCache::with_clock(10, clock.clone());
        let key = CacheKey::new("v1", "fp", "t1");
        cache.set(key.clone(), town_match("t1", 70), Duration::from_secs(60));

        clock.advance(Duration::from_secs(59));
        assert!(cache.get(&key).is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_insert_evicted_despite_reads() {
        let cache = MemoryScoreCache::new(2);
        let first = CacheKey::new("v1", "fp", "t1");
        let second = CacheKey::new("v1", "fp", "t2");
        let third = CacheKey::new("v1", "fp", "t3");

        cache.set(first.clone(), town_match("t1", 10), cache.ttl());
        cache.set(second.clone(), town_match("t2", 20), cache.ttl());
        // Reading does not protect the oldest entry
        assert!(cache.get(&first).is_some());
        cache.set(third.clone(), town_match("t3", 30), cache.ttl());

        assert!(cache.get(&first).is_none());
        assert!(cache.get(&second).is_some());
        assert!(cache.get(&third).is_some());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MemoryScoreCache::new(4);
        let key = CacheKey::new("v1", "fp", "t1");
        cache.set(key.clone(), town_match("t1", 10), cache.ttl());
        cache.set(key.clone(), town_match("t1", 90), cache.ttl());
        assert_eq!(cache.get(&key).map(|m| m.total_score), Some(90));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_other_versions() {
        let cache = MemoryScoreCache::new(10);
        cache.set(CacheKey::new("v1", "fp", "t1"), town_match("t1", 10), cache.ttl());
        cache.set(CacheKey::new("v1", "fp", "t2"), town_match("t2", 20), cache.ttl());
        cache.set(CacheKey::new("v2", "fp", "t1"), town_match("t1", 30), cache.ttl());

        assert_eq!(cache.purge("v2"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge("v2"), 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(MemoryScoreCache::new(100));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let key = CacheKey::new("v1", "fp", format!("t{}", i));
                    cache.set(key.clone(), town_match(&key.town_id, i as u8), cache.ttl());
                    cache.get(&key).is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 4);
    }
}
