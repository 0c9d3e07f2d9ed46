//! Property-based tests for the scoring engine.
//!
//! # Invariants tested
//!
//! - Every category score and every total stays within 0-100.
//! - Scoring the same inputs twice gives the same result.
//! - Normalizing an already normalized token changes nothing.
//! - A scalar preference scores exactly like the one-element list.
//! - Ranking is sorted and never longer than the limit.

use proptest::prelude::*;
use retire_match::core::{Dimension, TownMatcher, Vocabulary};
use retire_match::models::{
    Category, CulturalImportance, TokenSet, TownHobbies, TownRecord, UserPreference,
};

const CLIMATE_WORDS: &[&str] = &[
    "hot", "warm", "mild", "cool", "cold", "Humid", "dry", "balanced", "often_cloudy",
    "less_sunny", "often sunny", "mostly_dry", "Optional", "volcanic",
];
const CULTURE_WORDS: &[&str] = &[
    "urban", "suburban", "rural", "fast", "relaxed", "moderate", "large", "small",
    "english_only", "willing_to_learn", "friendly",
];
const HOBBY_WORDS: &[&str] = &[
    "golf", "tennis", "Sailing", "water_crafts", "winter_sports", "reading", "skiing",
    "bird watching", "pottery",
];
const LEVEL_WORDS: &[&str] = &["basic", "functional", "good", "excellent", "whatever"];
const COUNTRIES: &[&str] = &["Portugal", "Spain", "France", "United States", "Mexico"];

fn token_set(words: &'static [&'static str]) -> impl Strategy<Value = TokenSet> {
    prop::collection::vec(prop::sample::select(words), 0..4)
        .prop_map(|items| items.into_iter().collect())
}

fn optional_word(words: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(words).prop_map(str::to_string))
}

fn rating(max: f64) -> impl Strategy<Value = Option<f64>> {
    prop::option::of(0.0..=max)
}

fn preferences_strategy() -> impl Strategy<Value = UserPreference> {
    (
        (
            token_set(COUNTRIES),
            token_set(CLIMATE_WORDS),
            token_set(CLIMATE_WORDS),
            token_set(CLIMATE_WORDS),
        ),
        (
            token_set(CULTURE_WORDS),
            token_set(CULTURE_WORDS),
            token_set(CULTURE_WORDS),
            prop::option::of(1u8..=5),
            prop::option::of(1u8..=5),
        ),
        (token_set(HOBBY_WORDS), token_set(HOBBY_WORDS)),
        (token_set(LEVEL_WORDS), token_set(LEVEL_WORDS), token_set(LEVEL_WORDS)),
        (
            prop::option::of(500.0..8000.0f64),
            prop::option::of(200.0..3000.0f64),
            any::<bool>(),
            any::<bool>(),
        ),
    )
        .prop_map(|(region, culture, hobbies, admin, cost)| UserPreference {
            user_id: "prop".into(),
            citizenship: Some("USA".into()),
            countries: region.0,
            summer_climate_preference: region.1,
            winter_climate_preference: region.2,
            sunshine: region.3,
            urban_rural_preference: culture.0,
            pace_of_life_preference: culture.1,
            language_preferences: culture.2,
            cultural_importance: CulturalImportance {
                dining_nightlife: culture.3,
                cultural_events: culture.4,
                museums: None,
            },
            activities: hobbies.0,
            custom_activities: hobbies.1,
            healthcare_quality: admin.0,
            safety_importance: admin.1,
            visa_preference: admin.2,
            total_monthly_budget: cost.0,
            max_monthly_rent: cost.1,
            income_tax_sensitive: cost.2,
            sales_tax_sensitive: cost.3,
            ..Default::default()
        })
}

fn town_strategy() -> impl Strategy<Value = TownRecord> {
    (
        (
            "[a-z]{3,8}",
            optional_word(COUNTRIES),
            optional_word(CLIMATE_WORDS),
            optional_word(CLIMATE_WORDS),
            prop::option::of(-5.0..40.0f64),
            prop::option::of(0.0..3500.0f64),
        ),
        (
            optional_word(CULTURE_WORDS),
            optional_word(CULTURE_WORDS),
            rating(5.0),
            rating(5.0),
        ),
        (rating(10.0), rating(10.0), rating(100.0), prop::option::of(any::<bool>())),
        (
            prop::option::of(300.0..6000.0f64),
            prop::option::of(150.0..3000.0f64),
            rating(60.0),
            rating(30.0),
            prop::option::of(any::<bool>()),
        ),
    )
        .prop_map(|(base, culture, admin, cost)| TownRecord {
            id: format!("t-{}", base.0),
            name: base.0,
            country: base.1,
            summer_climate_actual: base.2,
            sunshine_level_actual: base.3,
            avg_temp_winter: base.4,
            sunshine_hours: base.5,
            urban_rural_character: culture.0,
            pace_of_life_actual: culture.1,
            restaurants_rating: culture.2,
            cultural_events_rating: culture.3,
            healthcare_score: admin.0,
            safety_score: admin.1,
            political_stability_rating: admin.2,
            retirement_visa_available: admin.3,
            cost_of_living_usd: cost.0,
            typical_rent_1bed: cost.1,
            income_tax_rate_pct: cost.2,
            sales_tax_rate_pct: cost.3,
            tax_haven_status: cost.4,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: all scores stay within 0-100.
    #[test]
    fn scores_stay_in_range(prefs in preferences_strategy(), town in town_strategy()) {
        let matcher = TownMatcher::with_default_weights();
        let result = matcher.score_town(&prefs, &town, &TownHobbies::empty());

        prop_assert!(result.total_score <= 100);
        prop_assert!((0.0..=1.0).contains(&result.preference_coverage));
        for category in Category::ALL {
            let score = result.breakdown.get(category);
            prop_assert!(score.score <= 100, "{} scored {}", category, score.score);
            prop_assert!(!score.factors.is_empty());
        }
    }

    /// Property: scoring is deterministic.
    #[test]
    fn scoring_is_deterministic(prefs in preferences_strategy(), town in town_strategy()) {
        let matcher = TownMatcher::with_default_weights();
        let first = matcher.score_town(&prefs, &town, &TownHobbies::empty());
        let second = matcher.score_town(&prefs, &town, &TownHobbies::empty());
        prop_assert_eq!(first, second);
    }

    /// Property: normalization is idempotent in every dimension.
    #[test]
    fn normalize_is_idempotent(raw in "[ A-Za-z_-]{0,16}", index in 0usize..Dimension::ALL.len()) {
        let vocab = Vocabulary::builtin();
        let dimension = Dimension::ALL[index];
        let once = vocab.normalize(dimension, &raw);
        let twice = vocab.normalize(dimension, &once);
        prop_assert_eq!(once, twice);
    }

    /// Property: a scalar preference behaves like the one-element list.
    #[test]
    fn scalar_equals_singleton(word in prop::sample::select(CLIMATE_WORDS), town in town_strategy()) {
        let scalar: UserPreference =
            serde_json::from_value(serde_json::json!({ "summer_climate_preference": word })).unwrap();
        let list: UserPreference =
            serde_json::from_value(serde_json::json!({ "summer_climate_preference": [word] })).unwrap();

        let matcher = TownMatcher::with_default_weights();
        prop_assert_eq!(
            matcher.score_town(&scalar, &town, &TownHobbies::empty()),
            matcher.score_town(&list, &town, &TownHobbies::empty())
        );
    }

    /// Property: rankings are sorted best first and respect the limit.
    #[test]
    fn ranking_sorted_and_limited(
        prefs in preferences_strategy(),
        towns in prop::collection::vec(town_strategy(), 0..12),
        limit in 1usize..8,
    ) {
        let matcher = TownMatcher::with_default_weights();
        let ranked = matcher.rank_towns(&prefs, &towns, |_| TownHobbies::empty(), limit);

        prop_assert!(ranked.len() <= limit);
        prop_assert_eq!(ranked.len(), towns.len().min(limit));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].total_score >= pair[1].total_score);
        }
    }
}
