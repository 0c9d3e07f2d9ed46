use crate::core::normalize::{lookup_key, Dimension, Vocabulary};
use crate::core::slice::{half, match_slice, share};
use crate::models::{Category, Factor, ScoreResult, TownRecord, UserPreference};

const LIVING_ENVIRONMENT_POINTS: i32 = 20;
const PACE_POINTS: i32 = 20;
const LANGUAGE_POINTS: i32 = 15;
const EXPAT_POINTS: i32 = 15;
const SOCIAL_POINTS: i32 = 10;
const AMENITY_POINTS: i32 = 20;

/// Score lifestyle and cultural fit
pub fn score_culture(prefs: &UserPreference, town: &TownRecord, vocab: &Vocabulary) -> ScoreResult {
    if !prefs.has_culture_preferences() {
        return ScoreResult::open(Category::Culture, "Open to any culture");
    }

    let factors = vec![
        match_slice(
            vocab,
            Dimension::UrbanRural,
            &prefs.urban_rural_preference,
            town.urban_rural_character.as_deref(),
            LIVING_ENVIRONMENT_POINTS,
            "Living environment",
        ),
        match_slice(
            vocab,
            Dimension::PaceOfLife,
            &prefs.pace_of_life_preference,
            town.pace_of_life_actual.as_deref(),
            PACE_POINTS,
            "Pace of life",
        ),
        language_factor(prefs, town),
        match_slice(
            vocab,
            Dimension::ExpatCommunity,
            &prefs.expat_community_preference,
            town.expat_community_size.as_deref(),
            EXPAT_POINTS,
            "Expat community",
        ),
        match_slice(
            vocab,
            Dimension::SocialAtmosphere,
            &prefs.social_atmosphere_preference,
            town.social_atmosphere.as_deref(),
            SOCIAL_POINTS,
            "Social atmosphere",
        ),
        amenities_factor(prefs, town),
    ];

    ScoreResult::from_factors(Category::Culture, factors)
}

fn language_factor(prefs: &UserPreference, town: &TownRecord) -> Factor {
    if prefs.language_preferences.is_empty() && prefs.languages_spoken.is_empty() {
        return Factor::new("Flexible on language", LANGUAGE_POINTS);
    }

    let primary = town
        .primary_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let speaks_local = prefs.languages_spoken.iter().any(|spoken| {
        primary.is_some_and(|p| p.eq_ignore_ascii_case(spoken.trim()))
            || town.languages_spoken.contains_ignore_case(spoken)
    });
    if speaks_local {
        return Factor::new("Speaks the local language", LANGUAGE_POINTS);
    }

    let wanted: Vec<String> = prefs.language_preferences.iter().map(lookup_key).collect();
    let wants = |token: &str| wanted.iter().any(|w| w == token);

    if wants("english_only") {
        if primary.is_some_and(|p| p.eq_ignore_ascii_case("english")) {
            return Factor::new("English is the primary language", LANGUAGE_POINTS);
        }
        match town.english_proficiency_level.as_deref().map(lookup_key) {
            Some(level) => {
                let fraction = english_proficiency(&level);
                return Factor::new(
                    format!("English proficiency {}", level),
                    share(LANGUAGE_POINTS, fraction),
                );
            }
            None if primary.is_none() => {
                return Factor::new("Language data unavailable", half(LANGUAGE_POINTS));
            }
            None => {
                return Factor::new("English proficiency unknown", half(LANGUAGE_POINTS));
            }
        }
    }

    if wants("willing_to_learn") || wants("comfortable") {
        return Factor::new("Willing to learn the local language", half(LANGUAGE_POINTS));
    }

    if primary.is_none() && town.languages_spoken.is_empty() {
        return Factor::new("Language data unavailable", half(LANGUAGE_POINTS));
    }
    Factor::new("Does not speak the local language", 0)
}

fn english_proficiency(level: &str) -> f64 {
    match level {
        "native" | "fluent" => 1.0,
        "very_high" | "high" => 0.75,
        "moderate" | "medium" => 0.5,
        "low" | "basic" => 0.25,
        _ => 0.0,
    }
}

/// One amenity: how much the user cares against how well the town rates
struct Amenity<'a> {
    label: &'a str,
    importance: Option<u8>,
    rating: Option<f64>,
}

fn amenities_factor(prefs: &UserPreference, town: &TownRecord) -> Factor {
    let importance = prefs.cultural_importance;
    let dining = match (town.restaurants_rating, town.nightlife_rating) {
        (Some(r), Some(n)) => Some((r + n) / 2.0),
        (r, n) => r.or(n),
    };

    let amenities = [
        Amenity {
            label: "dining & nightlife",
            importance: importance.dining_nightlife,
            rating: dining,
        },
        Amenity {
            label: "cultural events",
            importance: importance.cultural_events,
            rating: town.cultural_events_rating,
        },
        Amenity {
            label: "museums & arts",
            importance: importance.museums,
            rating: town.museums_rating,
        },
    ];

    if !importance.has_any() {
        return Factor::new("Flexible on cultural amenities", AMENITY_POINTS);
    }

    let mut notes = Vec::with_capacity(amenities.len());
    let mut total = 0.0;
    for amenity in &amenities {
        let (fraction, note) = amenity_credit(amenity);
        total += fraction;
        notes.push(format!("{} {}", amenity.label, note));
    }
    let average = total / amenities.len() as f64;

    Factor::new(
        format!("Cultural amenities: {}", notes.join(", ")),
        share(AMENITY_POINTS, average),
    )
}

fn amenity_credit(amenity: &Amenity<'_>) -> (f64, &'static str) {
    let importance = match amenity.importance {
        Some(level) if level > 1 => level as f64,
        _ => return (1.0, "flexible"),
    };
    let rating = match amenity.rating {
        Some(rating) => rating,
        None => return (0.5, "data unavailable"),
    };

    match (importance - rating).abs().round() as i64 {
        0 => (1.0, "perfectly matched"),
        1 => (0.7, "good match"),
        2 => (0.4, "acceptable"),
        _ => (0.0, "mismatch"),
    }
}
