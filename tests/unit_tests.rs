// Unit tests for the category scorers through the public API

use retire_match::core::{
    admin::quality_factor,
    hobbies::{hobby_points, MATCH_THRESHOLD},
    score_admin, score_climate, score_cost, score_hobbies, score_region, AdminLevel, Dimension,
    Vocabulary,
};
use retire_match::models::{
    Category, ScoreResult, TokenSet, TownHobbies, TownHobbyRow, TownRecord, UserPreference,
};

fn tokens(items: &[&str]) -> TokenSet {
    items.iter().copied().collect()
}

fn factor_points(result: &ScoreResult, prefix: &str) -> i32 {
    result
        .factors
        .iter()
        .find(|f| f.label.starts_with(prefix))
        .map(|f| f.points)
        .unwrap_or_else(|| panic!("no factor starting with {:?} in {:?}", prefix, result.factors))
}

#[test]
fn test_climate_scenario() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        summer_climate_preference: tokens(&["warm", "hot"]),
        winter_climate_preference: tokens(&["mild"]),
        humidity_level: tokens(&["balanced", "dry"]),
        ..Default::default()
    };
    let town = TownRecord {
        summer_climate_actual: Some("hot".into()),
        winter_climate_actual: Some("cool".into()),
        humidity_level_actual: Some("balanced".into()),
        ..Default::default()
    };

    let result = score_climate(&prefs, &town, &vocab);
    assert_eq!(result.category, Category::Climate);
    assert_eq!(factor_points(&result, "Summer climate"), 25);
    assert_eq!(factor_points(&result, "Winter climate"), 0);
    assert_eq!(factor_points(&result, "Humidity"), 20);
    // sunshine and precipitation left open
    assert_eq!(result.score, 75);
}

#[test]
fn test_often_cloudy_is_less_sunny() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        sunshine: tokens(&["often_cloudy"]),
        ..Default::default()
    };
    let town = TownRecord {
        sunshine_level_actual: Some("less_sunny".into()),
        ..Default::default()
    };
    assert_eq!(score_climate(&prefs, &town, &vocab).score, 100);
}

#[test]
fn test_climate_labels_normalized() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        summer_climate_preference: tokens(&["Hot"]),
        ..Default::default()
    };
    let town = TownRecord {
        summer_climate_actual: Some(" HOT ".into()),
        ..Default::default()
    };
    assert_eq!(score_climate(&prefs, &town, &vocab).score, 100);
}

#[test]
fn test_healthcare_seven_meets_good() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        healthcare_quality: tokens(&["good"]),
        ..Default::default()
    };
    let town = TownRecord {
        healthcare_score: Some(7.0),
        ..Default::default()
    };

    let result = score_admin(&prefs, &town, &vocab);
    assert_eq!(result.score, 100);
    assert!(result
        .factors
        .iter()
        .any(|f| f.label.contains("meets good standard")));

    let below = TownRecord {
        healthcare_score: Some(6.9),
        ..Default::default()
    };
    assert!(score_admin(&prefs, &below, &vocab).score < 100);
}

#[test]
fn test_admin_levels_ordered() {
    assert!(AdminLevel::Good > AdminLevel::Functional);
    assert!(AdminLevel::Functional > AdminLevel::Basic);
    assert_eq!(AdminLevel::Good.minimum(), 7.0);

    let functional = quality_factor(Some(AdminLevel::Functional), Some(5.0), 25, "Safety");
    assert_eq!(functional.points, 25);
}

#[test]
fn test_rent_ceiling_power_user() {
    let town = TownRecord {
        cost_of_living_usd: Some(2000.0),
        typical_rent_1bed: Some(800.0),
        ..Default::default()
    };
    let budget_only = UserPreference {
        total_monthly_budget: Some(3000.0),
        ..Default::default()
    };

    let baseline = score_cost(&budget_only, &town).score;
    for ceiling in [200.0, 500.0, 700.0, 800.0, 5000.0] {
        let power = UserPreference {
            max_monthly_rent: Some(ceiling),
            ..budget_only.clone()
        };
        assert!(
            score_cost(&power, &town).score >= baseline,
            "rent ceiling {} lowered the score",
            ceiling
        );
    }

    let generous = UserPreference {
        max_monthly_rent: Some(1000.0),
        ..budget_only
    };
    assert_eq!(score_cost(&generous, &town).score, baseline + 20);
}

#[test]
fn test_cost_open_without_preferences() {
    let result = score_cost(&UserPreference::default(), &TownRecord::default());
    assert_eq!(result.score, 100);
    assert_eq!(result.factors.len(), 1);
}

#[test]
fn test_hobby_threshold() {
    assert_eq!(MATCH_THRESHOLD, 0.3);
    assert_eq!(hobby_points(0.29), 6);
    assert_eq!(hobby_points(0.3), 30);
    assert_eq!(hobby_points(0.31), 31);
    assert_eq!(hobby_points(1.0), 100);
    assert_eq!(hobby_points(0.0), 0);
}

#[test]
fn test_hobby_ratio_exactly_at_threshold() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        activities: tokens(&[
            "golf", "tennis", "sailing", "kayaking", "fishing", "snorkeling", "pickleball",
            "boating", "canoeing", "petanque",
        ]),
        ..Default::default()
    };
    let rows = [
        TownHobbyRow {
            hobby: "Golf".into(),
            is_excluded: false,
        },
        TownHobbyRow {
            hobby: "Tennis".into(),
            is_excluded: false,
        },
        TownHobbyRow {
            hobby: "Sailing".into(),
            is_excluded: false,
        },
    ];

    let result = score_hobbies(&prefs, &TownHobbies::from_rows(&rows), &vocab);
    assert_eq!(result.score, 30);
    assert_eq!(result.factors[0].label, "3 of 10 hobbies available");
}

#[test]
fn test_universal_hobbies_need_no_rows() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        interests: tokens(&["Reading", "cooking"]),
        ..Default::default()
    };
    assert_eq!(score_hobbies(&prefs, &TownHobbies::empty(), &vocab).score, 100);
}

#[test]
fn test_region_country_match() {
    let vocab = Vocabulary::builtin();
    let prefs = UserPreference {
        countries: tokens(&["portugal"]),
        ..Default::default()
    };
    let porto = TownRecord {
        country: Some("Portugal".into()),
        ..Default::default()
    };
    let lyon = TownRecord {
        country: Some("France".into()),
        ..Default::default()
    };

    let matched = score_region(&prefs, &porto, &vocab);
    let missed = score_region(&prefs, &lyon, &vocab);
    assert!(matched.score > missed.score);
    assert_eq!(factor_points(&matched, "Country"), 45);
}

#[test]
fn test_normalize_aliases_and_unknowns() {
    let vocab = Vocabulary::builtin();
    assert_eq!(vocab.normalize(Dimension::Sunshine, "often_cloudy"), "less_sunny");
    assert_eq!(vocab.normalize(Dimension::Hobby, "Skiing"), "downhill_skiing");
    assert_eq!(vocab.normalize(Dimension::Summer, "Hot"), "hot");
    assert_eq!(vocab.normalize(Dimension::Summer, "Volcanic"), "Volcanic");
}

#[test]
fn test_scalar_and_singleton_score_alike() {
    let vocab = Vocabulary::builtin();
    let scalar: UserPreference =
        serde_json::from_value(serde_json::json!({ "summer_climate_preference": "hot" })).unwrap();
    let list: UserPreference =
        serde_json::from_value(serde_json::json!({ "summer_climate_preference": ["hot"] }))
            .unwrap();
    let town = TownRecord {
        summer_climate_actual: Some("warm".into()),
        ..Default::default()
    };

    assert_eq!(scalar.summer_climate_preference, list.summer_climate_preference);
    assert_eq!(
        score_climate(&scalar, &town, &vocab),
        score_climate(&list, &town, &vocab)
    );
}
