use crate::core::normalize::{Dimension, Vocabulary};
use crate::models::{Category, Factor, ScoreResult, TokenSet, TownHobbies, UserPreference};

/// Match ratio at or above which a town counts as a real hobby fit
pub const MATCH_THRESHOLD: f64 = 0.3;

/// Ceiling for towns below the threshold
const LOW_MATCH_CEILING: f64 = 20.0;

/// Score how many of the user's hobbies a town supports
///
/// The user's activities, interests and custom entries are pooled, normalized
/// and expanded; the town supports the universal hobbies plus its own
/// association rows, minus anything it explicitly excludes.
pub fn score_hobbies(
    prefs: &UserPreference,
    town_hobbies: &TownHobbies,
    vocab: &Vocabulary,
) -> ScoreResult {
    if !prefs.has_hobby_preferences() {
        return ScoreResult::open(Category::Hobbies, "Open to any activities");
    }

    let pooled = prefs
        .activities
        .union(&prefs.interests)
        .union(&prefs.custom_activities);
    let wanted = vocab.expand_hobbies(&pooled);
    if wanted.is_empty() {
        return ScoreResult::open(Category::Hobbies, "Open to any activities");
    }

    let available = available_hobbies(town_hobbies, vocab);
    let matched = wanted.intersection_count(&available);
    let ratio = matched as f64 / wanted.len() as f64;
    let points = hobby_points(ratio);

    let label = if ratio >= MATCH_THRESHOLD {
        format!("{} of {} hobbies available", matched, wanted.len())
    } else {
        format!("Only {} of {} hobbies available", matched, wanted.len())
    };

    ScoreResult::from_factors(Category::Hobbies, vec![Factor::new(label, points)])
}

/// Universal hobbies plus the town's own, with excluded ones removed
pub fn available_hobbies(town_hobbies: &TownHobbies, vocab: &Vocabulary) -> TokenSet {
    let excluded = vocab.key_set(Dimension::Hobby, &town_hobbies.excluded);
    vocab
        .universal_hobbies()
        .union(&vocab.key_set(Dimension::Hobby, &town_hobbies.available))
        .iter()
        .filter(|h| !excluded.contains(h))
        .collect()
}

/// Points for a match ratio; ratios under the threshold are scaled down hard
pub fn hobby_points(ratio: f64) -> i32 {
    if ratio >= MATCH_THRESHOLD {
        (100.0 * ratio).round() as i32
    } else {
        (LOW_MATCH_CEILING * ratio).round() as i32
    }
}
