use crate::core::normalize::{Dimension, Vocabulary};
use crate::core::slice::match_slice;
use crate::models::{Category, Factor, ScoreResult, TownRecord, UserPreference};

const SUMMER_POINTS: i32 = 25;
const WINTER_POINTS: i32 = 25;
const HUMIDITY_POINTS: i32 = 20;
const SUNSHINE_POINTS: i32 = 20;
const PRECIPITATION_POINTS: i32 = 10;

/// Score how well a town's climate fits the user's climate preferences
///
/// Each slice is all-or-nothing: the town's (normalized) label must be one of
/// the preferred tokens. Missing town labels are inferred from temperature,
/// rainfall and sunshine-hour data where possible.
pub fn score_climate(prefs: &UserPreference, town: &TownRecord, vocab: &Vocabulary) -> ScoreResult {
    if !prefs.has_climate_preferences() {
        return ScoreResult::open(Category::Climate, "Open to any climate");
    }

    let slices = [
        (Dimension::Summer, &prefs.summer_climate_preference, SUMMER_POINTS, "Summer climate"),
        (Dimension::Winter, &prefs.winter_climate_preference, WINTER_POINTS, "Winter climate"),
        (Dimension::Humidity, &prefs.humidity_level, HUMIDITY_POINTS, "Humidity"),
        (Dimension::Sunshine, &prefs.sunshine, SUNSHINE_POINTS, "Sunshine"),
        (
            Dimension::Precipitation,
            &prefs.precipitation,
            PRECIPITATION_POINTS,
            "Precipitation",
        ),
    ];

    let factors: Vec<Factor> = slices
        .into_iter()
        .map(|(dimension, preferred, points, label)| {
            let town_value = effective_climate(town, dimension);
            match_slice(vocab, dimension, preferred, town_value.as_deref(), points, label)
        })
        .collect();

    ScoreResult::from_factors(Category::Climate, factors)
}

/// The town's climate label for a dimension, falling back to inference
pub fn effective_climate(town: &TownRecord, dimension: Dimension) -> Option<String> {
    let label = match dimension {
        Dimension::Summer => &town.summer_climate_actual,
        Dimension::Winter => &town.winter_climate_actual,
        Dimension::Humidity => &town.humidity_level_actual,
        Dimension::Sunshine => &town.sunshine_level_actual,
        Dimension::Precipitation => &town.precipitation_level_actual,
        _ => return None,
    };

    if let Some(label) = label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        return Some(label.to_string());
    }

    let inferred = match dimension {
        Dimension::Summer => town.avg_temp_summer.map(infer_summer),
        Dimension::Winter => town.avg_temp_winter.map(infer_winter),
        Dimension::Humidity => town.annual_rainfall.map(infer_humidity),
        Dimension::Sunshine => town.sunshine_hours.map(infer_sunshine),
        Dimension::Precipitation => town.annual_rainfall.map(infer_precipitation),
        _ => None,
    };
    inferred.map(str::to_string)
}

/// Average summer temperature in °C to a summer label
pub fn infer_summer(avg_temp: f64) -> &'static str {
    if avg_temp < 22.0 {
        "mild"
    } else if avg_temp < 27.0 {
        "warm"
    } else {
        "hot"
    }
}

/// Average winter temperature in °C to a winter label
pub fn infer_winter(avg_temp: f64) -> &'static str {
    if avg_temp <= 5.0 {
        "cold"
    } else if avg_temp <= 14.0 {
        "cool"
    } else {
        "mild"
    }
}

/// Annual rainfall in mm to a humidity label
pub fn infer_humidity(rainfall_mm: f64) -> &'static str {
    if rainfall_mm < 400.0 {
        "dry"
    } else if rainfall_mm > 1200.0 {
        "humid"
    } else {
        "balanced"
    }
}

/// Annual rainfall in mm to a precipitation label
pub fn infer_precipitation(rainfall_mm: f64) -> &'static str {
    if rainfall_mm < 400.0 {
        "mostly_dry"
    } else if rainfall_mm < 1000.0 {
        "balanced"
    } else {
        "less_dry"
    }
}

/// Annual sunshine hours to a sunshine label
pub fn infer_sunshine(hours: f64) -> &'static str {
    if hours > 2800.0 {
        "often_sunny"
    } else if hours > 2200.0 {
        "balanced"
    } else {
        "less_sunny"
    }
}
