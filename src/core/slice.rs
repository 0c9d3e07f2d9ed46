//! Point arithmetic shared by the category scorers

use crate::core::normalize::{Dimension, Vocabulary};
use crate::models::{Factor, TokenSet};

/// Half a slice, rounded half up; credit for an opinion the town can't answer
#[inline]
pub(crate) fn half(slice: i32) -> i32 {
    (slice + 1) / 2
}

#[inline]
pub(crate) fn share(slice: i32, fraction: f64) -> i32 {
    (slice as f64 * fraction.clamp(0.0, 1.0)).round() as i32
}

/// Score an exact-match slice: the town token must be among the preferred ones
pub(crate) fn match_slice(
    vocab: &Vocabulary,
    dimension: Dimension,
    preferred: &TokenSet,
    town_value: Option<&str>,
    slice: i32,
    label: &str,
) -> Factor {
    if preferred.is_empty() {
        return Factor::new(format!("Flexible on {}", label.to_lowercase()), slice);
    }

    let town_value = match town_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => return Factor::new(format!("{} data unavailable", label), half(slice)),
    };

    let wanted = vocab.key_set(dimension, preferred);
    if wanted.contains(&vocab.key(dimension, town_value)) {
        Factor::new(format!("{} matches ({})", label, town_value), slice)
    } else {
        Factor::new(format!("{} mismatch ({})", label, town_value), 0)
    }
}
