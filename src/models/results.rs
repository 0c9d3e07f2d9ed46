use serde::{Deserialize, Serialize};
use std::fmt;

/// The six scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Region,
    Climate,
    Culture,
    Hobbies,
    Admin,
    Cost,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Region,
        Category::Climate,
        Category::Culture,
        Category::Hobbies,
        Category::Admin,
        Category::Cost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Region => "region",
            Category::Climate => "climate",
            Category::Culture => "culture",
            Category::Hobbies => "hobbies",
            Category::Admin => "admin",
            Category::Cost => "cost",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a score explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    pub label: String,
    pub points: i32,
}

impl Factor {
    pub fn new(label: impl Into<String>, points: i32) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// A category score with the factors that produced it
///
/// `score` is always the factor points summed and clamped to 0-100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub category: Category,
    pub score: u8,
    pub factors: Vec<Factor>,
}

impl ScoreResult {
    pub fn from_factors(category: Category, factors: Vec<Factor>) -> Self {
        let total: i32 = factors.iter().map(|f| f.points).sum();
        Self {
            category,
            score: total.clamp(0, 100) as u8,
            factors,
        }
    }

    /// A category the user expressed nothing about
    pub fn open(category: Category, label: impl Into<String>) -> Self {
        Self::from_factors(category, vec![Factor::new(label, 100)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub region: ScoreResult,
    pub climate: ScoreResult,
    pub culture: ScoreResult,
    pub hobbies: ScoreResult,
    pub admin: ScoreResult,
    pub cost: ScoreResult,
}

impl CategoryBreakdown {
    pub fn get(&self, category: Category) -> &ScoreResult {
        match category {
            Category::Region => &self.region,
            Category::Climate => &self.climate,
            Category::Culture => &self.culture,
            Category::Hobbies => &self.hobbies,
            Category::Admin => &self.admin,
            Category::Cost => &self.cost,
        }
    }
}

/// Overall verdict on a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Excellent,
    Good,
    Partial,
    Poor,
}

impl MatchQuality {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => MatchQuality::Excellent,
            60..=79 => MatchQuality::Good,
            40..=59 => MatchQuality::Partial,
            _ => MatchQuality::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchQuality::Excellent => "Excellent match",
            MatchQuality::Good => "Good match",
            MatchQuality::Partial => "Partial match",
            MatchQuality::Poor => "Poor match",
        }
    }
}

/// How consistently the town scores across all categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Human-readable explanation of a match, derived from the breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub quality: MatchQuality,
    pub confidence: Confidence,
    /// 2 (pricey) to 5 (very affordable)
    pub value_rating: u8,
    /// Best category, e.g. "Climate Match: 92%"
    pub appeal: String,
    pub insights: Vec<String>,
    pub warnings: Vec<String>,
    pub highlights: Vec<String>,
    pub match_reasons: Vec<String>,
}

/// Aggregate match of one town against one user's preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownMatch {
    pub town_id: String,
    pub town_name: String,
    pub total_score: u8,
    pub breakdown: CategoryBreakdown,
    /// Share of categories the user expressed any preference in, 0.0-1.0
    pub preference_coverage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_note: Option<String>,
    pub summary: MatchSummary,
}
