use crate::core::normalize::{lookup_key, Dimension, Vocabulary};
use crate::core::slice::{half, share};
use crate::models::{Category, Factor, ScoreResult, TokenSet, TownRecord, UserPreference};

const LOCATION_POINTS: i32 = 45;
const REGION_ONLY_POINTS: i32 = 34;
const FEATURE_POINTS: i32 = 30;
const VEGETATION_POINTS: i32 = 25;

const UNITED_STATES: &str = "United States";

/// US states users may pick in the country list
const US_STATES: [&str; 50] = [
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa",
    "Kansas", "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan",
    "Minnesota", "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire",
    "New Jersey", "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio",
    "Oklahoma", "Oregon", "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota",
    "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington", "West Virginia",
    "Wisconsin", "Wyoming",
];

/// Score location, landscape and vegetation fit
pub fn score_region(prefs: &UserPreference, town: &TownRecord, vocab: &Vocabulary) -> ScoreResult {
    if !prefs.has_region_preferences() {
        return ScoreResult::open(Category::Region, "Open to any location");
    }

    let factors = vec![
        location_factor(prefs, town),
        overlap_factor(
            vocab,
            Dimension::GeographicFeature,
            &prefs.geographic_features,
            &town.geographic_features_actual,
            FEATURE_POINTS,
            "Geographic features",
        ),
        overlap_factor(
            vocab,
            Dimension::Vegetation,
            &prefs.vegetation_types,
            &town.vegetation_type_actual,
            VEGETATION_POINTS,
            "Vegetation",
        ),
    ];

    ScoreResult::from_factors(Category::Region, factors)
}

fn location_factor(prefs: &UserPreference, town: &TownRecord) -> Factor {
    if prefs.countries.is_empty() && prefs.regions.is_empty() {
        return Factor::new("Flexible on country/region", LOCATION_POINTS);
    }

    let same = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());
    let country = town.country.as_deref().unwrap_or_default();
    let is_us = same(country, UNITED_STATES);

    for wanted in prefs.countries.iter() {
        if is_us && is_us_state(wanted) && town.region.as_deref().is_some_and(|r| same(r, wanted)) {
            return Factor::new(format!("State match ({})", wanted.trim()), LOCATION_POINTS);
        }
        if !country.is_empty() && same(country, wanted) {
            return Factor::new(format!("Country match ({})", country), LOCATION_POINTS);
        }
    }

    let geo_regions: TokenSet = town
        .geo_region
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .collect();

    if !prefs.regions.is_empty() {
        let wanted: Vec<String> = prefs.regions.iter().map(lookup_key).collect();
        let matches = |candidate: &str| wanted.contains(&lookup_key(candidate));

        if let Some(region) = town.regions.iter().find(|r| matches(*r)) {
            return Factor::new(format!("Region match only ({})", region), REGION_ONLY_POINTS);
        }
        if let Some(region) = geo_regions.iter().find(|r| matches(*r)) {
            return Factor::new(format!("Region match only ({})", region), REGION_ONLY_POINTS);
        }
    }

    if country.is_empty() && town.regions.is_empty() && geo_regions.is_empty() {
        return Factor::new("Location data unavailable", half(LOCATION_POINTS));
    }
    Factor::new("Outside preferred countries and regions", 0)
}

fn is_us_state(name: &str) -> bool {
    US_STATES.iter().any(|s| s.eq_ignore_ascii_case(name.trim()))
}

/// Share of the user's picks the town has, times the slice
fn overlap_factor(
    vocab: &Vocabulary,
    dimension: Dimension,
    preferred: &TokenSet,
    actual: &TokenSet,
    slice: i32,
    label: &str,
) -> Factor {
    if preferred.is_empty() {
        return Factor::new(format!("Flexible on {}", label.to_lowercase()), slice);
    }
    if actual.is_empty() {
        return Factor::new(format!("{} data unavailable", label), half(slice));
    }

    let wanted = vocab.key_set(dimension, preferred);
    let present = vocab.key_set(dimension, actual);
    let matched = wanted.intersection_count(&present);
    let ratio = matched as f64 / wanted.len() as f64;

    Factor::new(
        format!("{} match {}/{}", label, matched, wanted.len()),
        share(slice, ratio),
    )
}
