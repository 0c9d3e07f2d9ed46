use crate::core::normalize::{Dimension, Vocabulary};
use crate::core::slice::{half, share};
use crate::models::{Category, Factor, ScoreResult, TokenSet, TownRecord, UserPreference};

const HEALTHCARE_POINTS: i32 = 30;
const SAFETY_POINTS: i32 = 25;
const GOVERNMENT_POINTS: i32 = 15;
const STABILITY_POINTS: i32 = 15;
const VISA_POINTS: i32 = 15;

/// Share of the visa slice a retirement visa earns
const RETIREMENT_VISA_SHARE: f64 = 0.8;

/// Quality tier a user asks for in an administrative dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdminLevel {
    Basic,
    Functional,
    Good,
}

impl AdminLevel {
    /// Lowest acceptable rating on a 0-10 scale
    pub fn minimum(&self) -> f64 {
        match self {
            AdminLevel::Basic => 4.0,
            AdminLevel::Functional => 5.0,
            AdminLevel::Good => 7.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::Basic => "basic",
            AdminLevel::Functional => "functional",
            AdminLevel::Good => "good",
        }
    }

    fn parse(canonical: &str) -> Option<Self> {
        match canonical {
            "basic" => Some(AdminLevel::Basic),
            "functional" => Some(AdminLevel::Functional),
            "good" => Some(AdminLevel::Good),
            _ => None,
        }
    }

    /// The strictest recognised level in a preference set
    pub fn strictest(vocab: &Vocabulary, tokens: &TokenSet) -> Option<Self> {
        tokens
            .iter()
            .filter_map(|t| Self::parse(&vocab.key(Dimension::AdminLevel, t)))
            .max()
    }
}

/// Score healthcare, safety, governance, stability and visa access
pub fn score_admin(prefs: &UserPreference, town: &TownRecord, vocab: &Vocabulary) -> ScoreResult {
    if !prefs.has_admin_preferences() {
        return ScoreResult::open(Category::Admin, "Open to any administrative standard");
    }

    let factors = vec![
        quality_factor(
            AdminLevel::strictest(vocab, &prefs.healthcare_quality),
            town.healthcare_score,
            HEALTHCARE_POINTS,
            "Healthcare",
        ),
        quality_factor(
            AdminLevel::strictest(vocab, &prefs.safety_importance),
            town.safety_score,
            SAFETY_POINTS,
            "Safety",
        ),
        quality_factor(
            AdminLevel::strictest(vocab, &prefs.government_efficiency),
            town.government_efficiency_rating.map(|r| r / 10.0),
            GOVERNMENT_POINTS,
            "Government efficiency",
        ),
        quality_factor(
            AdminLevel::strictest(vocab, &prefs.political_stability),
            town.political_stability_rating.map(|r| r / 10.0),
            STABILITY_POINTS,
            "Political stability",
        ),
        visa_factor(AdminLevel::strictest(vocab, &prefs.visa_preference), prefs, town),
    ];

    ScoreResult::from_factors(Category::Admin, factors)
}

/// Score one rated dimension against the requested tier
///
/// A rating at or above the tier minimum earns the whole slice; below it,
/// credit steps down with the size of the shortfall.
pub fn quality_factor(level: Option<AdminLevel>, actual: Option<f64>, slice: i32, label: &str) -> Factor {
    let level = match level {
        Some(level) => level,
        None => return Factor::new(format!("Flexible on {}", label.to_lowercase()), slice),
    };
    let actual = match actual.filter(|a| a.is_finite()) {
        Some(actual) => actual,
        None => return Factor::new(format!("{} data unavailable", label), half(slice)),
    };

    let shortfall = level.minimum() - actual;
    if shortfall <= 0.0 {
        return Factor::new(
            format!("{} meets {} standard ({:.1})", label, level.as_str(), actual),
            slice,
        );
    }

    let (fraction, note) = if shortfall <= 1.0 {
        (0.85, "slightly below")
    } else if shortfall <= 2.0 {
        (0.65, "below")
    } else if shortfall <= 3.0 {
        (0.40, "well below")
    } else {
        (0.15, "far below")
    };

    Factor::new(
        format!("{} {} {} standard ({:.1})", label, note, level.as_str(), actual),
        share(slice, fraction),
    )
}

fn visa_factor(level: Option<AdminLevel>, prefs: &UserPreference, town: &TownRecord) -> Factor {
    match level {
        None => return Factor::new("Flexible on visa access", VISA_POINTS),
        Some(AdminLevel::Basic) => return Factor::new("Basic visa access acceptable", VISA_POINTS),
        Some(_) => {}
    }

    let easy_access = prefs.citizenship.as_deref().is_some_and(|citizenship| {
        town.visa_on_arrival_countries.contains_ignore_case(citizenship)
            || town.easy_residency_countries.contains_ignore_case(citizenship)
    });
    if easy_access {
        return Factor::new("Easy visa/residency access", VISA_POINTS);
    }

    match town.retirement_visa_available {
        Some(true) => Factor::new(
            "Retirement visa available",
            share(VISA_POINTS, RETIREMENT_VISA_SHARE),
        ),
        None if town.visa_on_arrival_countries.is_empty()
            && town.easy_residency_countries.is_empty() =>
        {
            Factor::new("Visa data unavailable", half(VISA_POINTS))
        }
        _ => Factor::new("No easy visa route", 0),
    }
}
